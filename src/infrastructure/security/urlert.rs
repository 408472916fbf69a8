//! URLert phishing classifier, the chain's final arbiter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::scanner::UrlScanner;
use crate::domain::entities::{ScanRecord, Verdict};

const SERVICE_NAME: &str = "urlert";
const ENDPOINT: &str = "https://api.urlert.io/v1/scan";

#[derive(Debug, Deserialize)]
struct UrlertResponse {
    status: String,
    confidence: f64,
    #[serde(default)]
    details: Option<Value>,
}

/// Heuristic/ML classifier. `safe` accepts, `phishing`/`malicious` reject,
/// everything else stays `uncertain`.
pub struct UrlertScanner {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl UrlertScanner {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    async fn classify(&self, api_key: &str, url: &str) -> Result<UrlertResponse, reqwest::Error> {
        self.http
            .post(ENDPOINT)
            .bearer_auth(api_key)
            .json(&json!({ "url": url }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl UrlScanner for UrlertScanner {
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

        match self.classify(api_key, url).await {
            Ok(response) => {
                let verdict = match response.status.as_str() {
                    "safe" => Verdict::Safe,
                    "phishing" | "malicious" => Verdict::Unsafe,
                    _ => Verdict::Uncertain,
                };
                ScanRecord::new(
                    SERVICE_NAME,
                    verdict,
                    json!({
                        "status": response.status,
                        "confidence": response.confidence,
                        "details": response.details,
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
