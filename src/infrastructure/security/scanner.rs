//! Common interface for external threat-scan providers.

use async_trait::async_trait;

use crate::domain::entities::ScanRecord;

/// One provider in the scanner chain.
///
/// Providers never fail the validation pass: a missing API key, transport
/// error, or timeout produces an `uncertain` record so the chain falls
/// through to the next provider.
#[async_trait]
pub trait UrlScanner: Send + Sync {
    /// Provider identifier recorded in the scan audit log.
    fn name(&self) -> &'static str;

    async fn scan(&self, url: &str) -> ScanRecord;
}
