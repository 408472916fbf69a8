//! Google Safe Browsing v4 threat-list lookup.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::scanner::UrlScanner;
use crate::domain::entities::{ScanRecord, Verdict};

const SERVICE_NAME: &str = "google-safe-browsing";
const ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    matches: Vec<Value>,
}

/// Threat-intelligence blocklist provider. A listed URL is `unsafe`, an
/// unlisted one is `safe`; only transport problems produce `uncertain`.
pub struct SafeBrowsingScanner {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl SafeBrowsingScanner {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    async fn lookup(&self, api_key: &str, url: &str) -> Result<LookupResponse, reqwest::Error> {
        let body = json!({
            "client": {
                "clientId": "shortguard",
                "clientVersion": env!("CARGO_PKG_VERSION"),
            },
            "threatInfo": {
                "threatTypes": [
                    "MALWARE",
                    "SOCIAL_ENGINEERING",
                    "UNWANTED_SOFTWARE",
                    "POTENTIALLY_HARMFUL_APPLICATION",
                ],
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }],
            },
        });

        self.http
            .post(format!("{}?key={}", ENDPOINT, api_key))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl UrlScanner for SafeBrowsingScanner {
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

        match self.lookup(api_key, url).await {
            Ok(response) if !response.matches.is_empty() => ScanRecord::new(
                SERVICE_NAME,
                Verdict::Unsafe,
                json!({ "threats": response.matches }),
            ),
            Ok(_) => ScanRecord::new(
                SERVICE_NAME,
                Verdict::Safe,
                json!({ "message": "No threats detected" }),
            ),
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
