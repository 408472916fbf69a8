//! Core business entities.

pub mod api_key;
pub mod ban;
pub mod click;
pub mod health;
pub mod report;
pub mod rotation;
pub mod scan;
pub mod short_link;

pub use api_key::{ApiKey, ApiKeyIdentity, NewApiKey};
pub use ban::{BannedDomain, BannedIp};
pub use click::{Analytics, ClickRow};
pub use health::{HealthCheck, HealthStatus, NewHealthCheck};
pub use report::{Report, ReportStatus};
pub use rotation::{NewRotationDestination, RotationDestination, RotationDestinationPatch};
pub use scan::{ScanRecord, ValidationResult, Verdict};
pub use short_link::{NewShortLink, RotationType, ShortLink};
