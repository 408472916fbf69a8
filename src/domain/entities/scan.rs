//! Threat-scan verdicts and validation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tri-state outcome of one threat-scan provider.
///
/// Only `Safe` and `Unsafe` are confident verdicts; `Uncertain` lets the
/// scanner chain continue to the next provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scan_verdict", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Unsafe,
    Uncertain,
}

impl Verdict {
    /// True for verdicts that short-circuit the scanner chain.
    pub fn is_confident(self) -> bool {
        !matches!(self, Verdict::Uncertain)
    }
}

/// Immutable record of one provider scan. Appended to the audit log once a
/// terminal verdict for the validation pass is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub service: String,
    pub result: Verdict,
    pub details: Value,
    pub scanned_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(service: impl Into<String>, result: Verdict, details: Value) -> Self {
        Self {
            service: service.into(),
            result,
            details,
            scanned_at: Utc::now(),
        }
    }
}

/// Aggregate outcome of one validation pass over the scanner chain.
///
/// Cached under the URL's content hash; `scans` holds every provider outcome
/// recorded before the terminal verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub scans: Vec<ScanRecord>,
}

impl ValidationResult {
    pub fn safe(scans: Vec<ScanRecord>) -> Self {
        Self {
            is_safe: true,
            reason: None,
            scans,
        }
    }

    pub fn unsafe_with_reason(reason: impl Into<String>, scans: Vec<ScanRecord>) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
            scans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncertain_is_not_confident() {
        assert!(Verdict::Safe.is_confident());
        assert!(Verdict::Unsafe.is_confident());
        assert!(!Verdict::Uncertain.is_confident());
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Verdict::Uncertain).unwrap(),
            "\"uncertain\""
        );
    }
}
