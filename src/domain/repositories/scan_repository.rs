//! Repository trait for the append-only scan audit log.

use crate::domain::entities::ScanRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for persisted scan records.
///
/// Scans are written only after a validation pass reaches a terminal
/// verdict, never mid-chain; a crash mid-validation loses at most the audit
/// trail, never link consistency.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Appends the scan records of one validation pass to the link whose
    /// content hash matches. A missing link (URL rejected before creation)
    /// is not an error; the records are simply not attached.
    async fn save_scans(&self, content_hash: &str, scans: &[ScanRecord]) -> Result<(), AppError>;

    /// Scan history for a link, newest first.
    async fn list_for_link(&self, link_id: i64) -> Result<Vec<ScanRecord>, AppError>;
}
