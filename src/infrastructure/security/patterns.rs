//! Local heuristic pre-filter for suspicious URLs.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::utils::url_normalizer::extract_domain;

const SUSPICIOUS_TLDS: &[&str] = &[
    ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".work", ".date", ".stream", ".download",
    ".loan", ".win", ".bid", ".racing",
];

const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login", "signin", "secure", "account", "verify", "update", "confirm", "banking", "paypal",
    "amazon", "facebook", "google", "microsoft", "apple",
];

// Cyrillic, Greek, and Arabic ranges cover the common homograph scripts.
static HOMOGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ѐ-ӿͰ-Ͽ؀-ۿ]").expect("homograph regex")
});

static RAW_IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("ipv4 regex"));

const MAX_URL_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Outcome of the heuristic pass. `High` severity rejects the URL without
/// consulting any external provider.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub is_suspicious: bool,
    pub reasons: Vec<String>,
    pub severity: Severity,
}

/// Host portion of the raw URL text, before any punycode conversion.
fn raw_authority(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', '?', '#']).next().unwrap_or(rest)
}

/// Scores a normalized URL against the local heuristics.
pub fn detect_suspicious_patterns(url: &str) -> PatternReport {
    let mut reasons = Vec::new();
    let mut severity = Severity::Low;

    let Some(domain) = extract_domain(url) else {
        return PatternReport {
            is_suspicious: true,
            reasons: vec!["Invalid domain".to_string()],
            severity: Severity::High,
        };
    };

    if SUSPICIOUS_TLDS.iter().any(|tld| domain.ends_with(tld)) {
        reasons.push("Suspicious TLD detected".to_string());
        severity = severity.max(Severity::Medium);
    }

    // The URL parser punycodes non-ASCII hosts, so check both the raw
    // authority text and the xn-- labels it turns into.
    let raw_host = raw_authority(url);
    if HOMOGRAPH.is_match(raw_host) || domain.split('.').any(|label| label.starts_with("xn--")) {
        reasons.push("Potential homograph attack (non-Latin characters)".to_string());
        severity = Severity::High;
    }

    let has_suspicious_keyword = SUSPICIOUS_KEYWORDS
        .iter()
        .any(|kw| domain.contains(kw) && !domain.ends_with(".com"));
    if has_suspicious_keyword {
        reasons.push("Domain contains suspicious keywords".to_string());
        severity = severity.max(Severity::Medium);
    }

    let subdomain_count = domain.split('.').count().saturating_sub(2);
    if subdomain_count > 3 {
        reasons.push("Excessive subdomain levels".to_string());
        severity = severity.max(Severity::Medium);
    }

    if RAW_IPV4.is_match(&domain) {
        reasons.push("IP address used instead of domain".to_string());
        severity = severity.max(Severity::Medium);
    }

    if url.len() > MAX_URL_LENGTH {
        reasons.push("Unusually long URL".to_string());
    }

    PatternReport {
        is_suspicious: !reasons.is_empty(),
        reasons,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url_is_not_suspicious() {
        let report = detect_suspicious_patterns("https://example.com/docs");
        assert!(!report.is_suspicious);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn test_suspicious_tld_is_medium() {
        let report = detect_suspicious_patterns("https://free-stuff.tk/offer");
        assert!(report.is_suspicious);
        assert_eq!(report.severity, Severity::Medium);
    }

    #[test]
    fn test_homograph_domain_is_high() {
        let report = detect_suspicious_patterns("https://аpple.com/login");
        assert_eq!(report.severity, Severity::High);
    }

    #[test]
    fn test_keyword_outside_com_is_flagged() {
        let report = detect_suspicious_patterns("https://paypal-verify.net/auth");
        assert!(report.is_suspicious);
        assert_eq!(report.severity, Severity::Medium);
    }

    #[test]
    fn test_keyword_on_com_is_allowed() {
        let report = detect_suspicious_patterns("https://login.example.com/");
        assert!(!report.reasons.iter().any(|r| r.contains("keywords")));
    }

    #[test]
    fn test_raw_ip_host_is_flagged() {
        let report = detect_suspicious_patterns("http://203.0.113.9/payload");
        assert!(report.reasons.iter().any(|r| r.contains("IP address")));
    }

    #[test]
    fn test_deep_subdomains_are_flagged() {
        let report = detect_suspicious_patterns("https://a.b.c.d.e.example.org/");
        assert!(
            report
                .reasons
                .iter()
                .any(|r| r.contains("subdomain"))
        );
    }

    #[test]
    fn test_overlong_url_is_low_severity() {
        let url = format!("https://example.com/{}", "a".repeat(600));
        let report = detect_suspicious_patterns(&url);
        assert!(report.is_suspicious);
        assert_eq!(report.severity, Severity::Low);
    }
}
