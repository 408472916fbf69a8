//! VirusTotal multi-engine aggregate scanner.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::scanner::UrlScanner;
use crate::domain::entities::{ScanRecord, Verdict};

const SERVICE_NAME: &str = "virustotal";
const SUBMIT_ENDPOINT: &str = "https://www.virustotal.com/api/v3/urls";
/// VirusTotal analyses are asynchronous; give the engines a moment before
/// fetching the verdict.
const ANALYSIS_DELAY: Duration = Duration::from_secs(2);

const UNSAFE_THREAT_PERCENTAGE: f64 = 10.0;
const UNCERTAIN_THREAT_PERCENTAGE: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    data: SubmitData,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    data: AnalysisData,
}

#[derive(Debug, Deserialize)]
struct AnalysisData {
    attributes: AnalysisAttributes,
}

#[derive(Debug, Deserialize)]
struct AnalysisAttributes {
    stats: EngineStats,
}

#[derive(Debug, Default, Deserialize, serde::Serialize)]
struct EngineStats {
    #[serde(default)]
    malicious: u32,
    #[serde(default)]
    suspicious: u32,
    #[serde(default)]
    undetected: u32,
    #[serde(default)]
    harmless: u32,
}

/// Aggregates engine votes into a threat ratio: above 10% is `unsafe`,
/// above 5% is `uncertain`, anything else is `safe`.
pub struct VirusTotalScanner {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl VirusTotalScanner {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    async fn analyze(&self, api_key: &str, url: &str) -> Result<EngineStats, reqwest::Error> {
        let submit: SubmitResponse = self
            .http
            .post(SUBMIT_ENDPOINT)
            .header("x-apikey", api_key)
            .form(&[("url", url)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tokio::time::sleep(ANALYSIS_DELAY).await;

        let analysis: AnalysisResponse = self
            .http
            .get(format!(
                "https://www.virustotal.com/api/v3/analyses/{}",
                submit.data.id
            ))
            .header("x-apikey", api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(analysis.data.attributes.stats)
    }
}

fn classify(stats: &EngineStats) -> (Verdict, f64, u32) {
    let total = stats.malicious + stats.suspicious + stats.undetected + stats.harmless;
    let threats = stats.malicious + stats.suspicious;
    let percentage = if total > 0 {
        f64::from(threats) / f64::from(total) * 100.0
    } else {
        0.0
    };

    let verdict = if percentage > UNSAFE_THREAT_PERCENTAGE {
        Verdict::Unsafe
    } else if percentage > UNCERTAIN_THREAT_PERCENTAGE {
        Verdict::Uncertain
    } else {
        Verdict::Safe
    };
    (verdict, percentage, total)
}

#[async_trait]
impl UrlScanner for VirusTotalScanner {
    fn name(&self) -> &'static str {
        SERVICE_NAME
    }

    async fn scan(&self, url: &str) -> ScanRecord {
        let Some(api_key) = self.api_key.as_deref() else {
            return ScanRecord::new(
                SERVICE_NAME,
                Verdict::Uncertain,
                json!({ "error": "API key not configured" }),
            );
        };

        match self.analyze(api_key, url).await {
            Ok(stats) => {
                let (verdict, percentage, engines) = classify(&stats);
                ScanRecord::new(
                    SERVICE_NAME,
                    verdict,
                    json!({
                        "stats": stats,
                        "threatPercentage": (percentage * 100.0).round() / 100.0,
                        "engines": engines,
                    }),
                )
            }
            Err(e) => {
                warn!(service = SERVICE_NAME, error = %e, "provider scan failed");
                ScanRecord::new(
                    SERVICE_NAME,
                    Verdict::Uncertain,
                    json!({ "error": e.to_string() }),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_threat_ratio_is_unsafe() {
        let stats = EngineStats {
            malicious: 10,
            suspicious: 5,
            undetected: 50,
            harmless: 35,
        };
        assert_eq!(classify(&stats).0, Verdict::Unsafe);
    }

    #[test]
    fn test_moderate_threat_ratio_is_uncertain() {
        let stats = EngineStats {
            malicious: 4,
            suspicious: 4,
            undetected: 50,
            harmless: 42,
        };
        assert_eq!(classify(&stats).0, Verdict::Uncertain);
    }

    #[test]
    fn test_low_threat_ratio_is_safe() {
        let stats = EngineStats {
            malicious: 1,
            suspicious: 0,
            undetected: 50,
            harmless: 49,
        };
        assert_eq!(classify(&stats).0, Verdict::Safe);
    }

    #[test]
    fn test_zero_engines_is_safe() {
        let (verdict, percentage, _) = classify(&EngineStats::default());
        assert_eq!(verdict, Verdict::Safe);
        assert_eq!(percentage, 0.0);
    }

    #[test]
    fn test_exact_ten_percent_is_not_unsafe() {
        let stats = EngineStats {
            malicious: 10,
            suspicious: 0,
            undetected: 90,
            harmless: 0,
        };
        assert_eq!(classify(&stats).0, Verdict::Uncertain);
    }
}
