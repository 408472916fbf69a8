pub mod patterns;
pub mod safe_browsing;
pub mod scanner;
pub mod urlert;
pub mod virus_total;

pub use patterns::{PatternReport, Severity, detect_suspicious_patterns};
pub use safe_browsing::SafeBrowsingScanner;
pub use scanner::UrlScanner;
pub use urlert::UrlertScanner;
pub use virus_total::VirusTotalScanner;
