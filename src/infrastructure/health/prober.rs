//! Outbound destination probing for the health monitor.

use std::time::Instant;

use async_trait::async_trait;

use crate::domain::entities::HealthStatus;

/// Result of probing one destination.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub status: HealthStatus,
    pub status_code: Option<i32>,
    pub response_time_ms: i32,
    pub error_message: Option<String>,
}

/// Issues a bounded probe against a destination URL and classifies the
/// outcome. Abstracted behind a trait so the health service can be tested
/// without outbound traffic.
#[async_trait]
pub trait DestinationProber: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// HEAD-request prober following redirects, with the client's timeout
/// bounding each probe.
pub struct HttpProber {
    http: reqwest::Client,
}

impl HttpProber {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn classify_status(code: u16) -> HealthStatus {
    match code {
        200..=399 => HealthStatus::Healthy,
        429 | 503 => HealthStatus::Warning,
        _ => HealthStatus::Broken,
    }
}

#[async_trait]
impl DestinationProber for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();
        let result = self.http.head(url).send().await;
        let response_time_ms = started.elapsed().as_millis().min(i32::MAX as u128) as i32;

        match result {
            Ok(response) => {
                let code = response.status().as_u16();
                ProbeOutcome {
                    status: classify_status(code),
                    status_code: Some(i32::from(code)),
                    response_time_ms,
                    error_message: None,
                }
            }
            Err(e) if e.is_timeout() => ProbeOutcome {
                status: HealthStatus::Warning,
                status_code: None,
                response_time_ms,
                error_message: Some("Request timeout".to_string()),
            },
            Err(e) => ProbeOutcome {
                status: HealthStatus::Broken,
                status_code: None,
                response_time_ms,
                error_message: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes_are_healthy() {
        assert_eq!(classify_status(200), HealthStatus::Healthy);
        assert_eq!(classify_status(204), HealthStatus::Healthy);
        assert_eq!(classify_status(301), HealthStatus::Healthy);
    }

    #[test]
    fn test_pressure_codes_are_warning() {
        assert_eq!(classify_status(429), HealthStatus::Warning);
        assert_eq!(classify_status(503), HealthStatus::Warning);
    }

    #[test]
    fn test_failures_are_broken() {
        assert_eq!(classify_status(404), HealthStatus::Broken);
        assert_eq!(classify_status(500), HealthStatus::Broken);
        assert_eq!(classify_status(403), HealthStatus::Broken);
    }
}
