//! URL validation pipeline: deny-list, heuristics, then the provider chain.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{ScanRecord, ValidationResult, Verdict};
use crate::domain::repositories::{BanRepository, ScanRepository};
use crate::error::AppError;
use crate::infrastructure::cache::ScanCache;
use crate::infrastructure::security::{Severity, UrlScanner, detect_suspicious_patterns};
use crate::utils::hashing::hash_url;
use crate::utils::url_normalizer::extract_domain;

/// Orchestrates the threat scanner chain.
///
/// Evaluation order, each step short-circuiting on a confident verdict:
/// cached result, domain deny-list, local heuristics, then each external
/// provider in configured order. The final provider is authoritative - its
/// `uncertain` is treated as not-safe rather than falling through to an
/// implicit accept.
pub struct ValidationService {
    bans: Arc<dyn BanRepository>,
    scans: Arc<dyn ScanRepository>,
    cache: Arc<dyn ScanCache>,
    scanners: Vec<Arc<dyn UrlScanner>>,
}

impl ValidationService {
    pub fn new(
        bans: Arc<dyn BanRepository>,
        scans: Arc<dyn ScanRepository>,
        cache: Arc<dyn ScanCache>,
        scanners: Vec<Arc<dyn UrlScanner>>,
    ) -> Self {
        Self {
            bans,
            scans,
            cache,
            scanners,
        }
    }

    /// Validates a normalized URL against the full chain.
    ///
    /// # Errors
    ///
    /// Only deny-list lookups propagate errors; provider failures degrade to
    /// `uncertain` scans inside the chain.
    pub async fn validate(&self, url: &str) -> Result<ValidationResult, AppError> {
        let content_hash = hash_url(url);

        if let Some(cached) = self.cache.get(&content_hash).await {
            debug!(%content_hash, "validation served from scan cache");
            return Ok(cached);
        }

        if let Some(domain) = extract_domain(url) {
            if let Some(banned) = self.bans.find_banned_domain(&domain).await? {
                // Deny-listed domains are rejected outright, no scans recorded.
                return Ok(ValidationResult::unsafe_with_reason(
                    format!(
                        "Domain is banned: {}",
                        banned.reason.as_deref().unwrap_or("No reason provided")
                    ),
                    Vec::new(),
                ));
            }
        }

        let pattern = detect_suspicious_patterns(url);
        if pattern.is_suspicious && pattern.severity == Severity::High {
            let result = ValidationResult::unsafe_with_reason(
                format!("Suspicious pattern detected: {}", pattern.reasons.join(", ")),
                Vec::new(),
            );
            self.cache.set(&content_hash, &result).await;
            return Ok(result);
        }

        let result = self.run_provider_chain(url).await;

        self.scans.save_scans(&content_hash, &result.scans).await?;
        self.cache.set(&content_hash, &result).await;

        if !result.is_safe {
            info!(%content_hash, reason = ?result.reason, "URL rejected by scanner chain");
        }
        Ok(result)
    }

    async fn run_provider_chain(&self, url: &str) -> ValidationResult {
        let mut scans: Vec<ScanRecord> = Vec::with_capacity(self.scanners.len());
        let last_index = self.scanners.len().saturating_sub(1);

        for (index, scanner) in self.scanners.iter().enumerate() {
            let scan = scanner.scan(url).await;
            let verdict = scan.result;
            let service = scanner.name();
            scans.push(scan);

            match verdict {
                Verdict::Unsafe => {
                    return ValidationResult::unsafe_with_reason(
                        format!("URL flagged as unsafe by {}", service),
                        scans,
                    );
                }
                Verdict::Safe => return ValidationResult::safe(scans),
                Verdict::Uncertain if index == last_index => {
                    // The last provider decides; uncertain is not an accept.
                    return ValidationResult::unsafe_with_reason(
                        "URL flagged as potentially unsafe",
                        scans,
                    );
                }
                Verdict::Uncertain => {}
            }
        }

        // No providers configured at all; nothing voted against the URL.
        ValidationResult::safe(scans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockBanRepository, MockScanRepository};
    use crate::infrastructure::cache::NullScanCache;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubScanner {
        name: &'static str,
        verdict: Verdict,
        calls: Mutex<usize>,
    }

    impl StubScanner {
        fn new(name: &'static str, verdict: Verdict) -> Arc<Self> {
            Arc::new(Self {
                name,
                verdict,
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl UrlScanner for StubScanner {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn scan(&self, _url: &str) -> ScanRecord {
            *self.calls.lock().unwrap() += 1;
            ScanRecord::new(self.name, self.verdict, json!({}))
        }
    }

    fn service_with(
        bans: MockBanRepository,
        scanners: Vec<Arc<dyn UrlScanner>>,
    ) -> ValidationService {
        let mut scans = MockScanRepository::new();
        scans.expect_save_scans().returning(|_, _| Ok(()));
        ValidationService::new(
            Arc::new(bans),
            Arc::new(scans),
            Arc::new(NullScanCache),
            scanners,
        )
    }

    fn no_bans() -> MockBanRepository {
        let mut bans = MockBanRepository::new();
        bans.expect_find_banned_domain().returning(|_| Ok(None));
        bans
    }

    #[tokio::test]
    async fn test_banned_domain_skips_all_providers() {
        let mut bans = MockBanRepository::new();
        bans.expect_find_banned_domain().returning(|_| {
            Ok(Some(crate::domain::entities::BannedDomain {
                domain: "evil.example".to_string(),
                reason: Some("malware host".to_string()),
                created_at: chrono::Utc::now(),
            }))
        });

        let scanner = StubScanner::new("provider-a", Verdict::Safe);
        let service = service_with(bans, vec![scanner.clone() as Arc<dyn UrlScanner>]);

        let result = service.validate("https://evil.example/x").await.unwrap();

        assert!(!result.is_safe);
        assert!(result.scans.is_empty());
        assert_eq!(scanner.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_confident_verdict_short_circuits() {
        let first = StubScanner::new("provider-a", Verdict::Safe);
        let second = StubScanner::new("provider-b", Verdict::Unsafe);
        let service = service_with(no_bans(), vec![
                first.clone() as Arc<dyn UrlScanner>,
                second.clone() as Arc<dyn UrlScanner>,
            ]);

        let result = service.validate("https://example.com/ok").await.unwrap();

        assert!(result.is_safe);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_uncertain_falls_through_to_next_provider() {
        let first = StubScanner::new("provider-a", Verdict::Uncertain);
        let second = StubScanner::new("provider-b", Verdict::Safe);
        let service = service_with(no_bans(), vec![
                first.clone() as Arc<dyn UrlScanner>,
                second.clone() as Arc<dyn UrlScanner>,
            ]);

        let result = service.validate("https://example.com/ok").await.unwrap();

        assert!(result.is_safe);
        assert_eq!(result.scans.len(), 2);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_final_provider_uncertain_is_not_safe() {
        let first = StubScanner::new("provider-a", Verdict::Uncertain);
        let last = StubScanner::new("provider-c", Verdict::Uncertain);
        let service = service_with(no_bans(), vec![first as Arc<dyn UrlScanner>, last as Arc<dyn UrlScanner>]);

        let result = service.validate("https://example.com/ok").await.unwrap();

        assert!(!result.is_safe);
        assert_eq!(
            result.reason.as_deref(),
            Some("URL flagged as potentially unsafe")
        );
    }

    #[tokio::test]
    async fn test_high_severity_pattern_rejects_without_providers() {
        let scanner = StubScanner::new("provider-a", Verdict::Safe);
        let service = service_with(no_bans(), vec![scanner.clone() as Arc<dyn UrlScanner>]);

        // Cyrillic homograph domain trips the high-severity heuristic.
        let result = service.validate("https://аpple.com/login").await.unwrap();

        assert!(!result.is_safe);
        assert_eq!(scanner.calls(), 0);
    }
}
