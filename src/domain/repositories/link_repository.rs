//! Repository trait for short link data access.

use crate::domain::entities::{HealthStatus, NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Outcome of detaching an owner from a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The account did not own the link; nothing changed.
    NotOwner,
    /// Ownership removed; this many owners remain and the row survives.
    Remaining(i64),
    /// Ownership removed and the last owner detached; the row and all
    /// dependent data were destroyed.
    Deleted,
}

/// Repository interface for short links and their ownership.
///
/// All cross-cutting invariants (short-code uniqueness, content-hash dedup,
/// ownership reference counts, atomic counters) are enforced here, never in
/// application memory.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link row plus its zeroed analytics record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the short code or content hash
    /// collides with an existing row (callers treat a code collision as a
    /// benign race and regenerate).
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code, regardless of lifecycle state.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds an active, unflagged link with the given content hash.
    ///
    /// Used for global dedup: a hit means the submission attaches an owner
    /// instead of creating a duplicate row.
    async fn find_active_by_hash(&self, content_hash: &str) -> Result<Option<ShortLink>, AppError>;

    /// Flips `is_active` off. Used by the lazy expiry check on read.
    async fn deactivate(&self, link_id: i64) -> Result<(), AppError>;

    /// Flags a link: `is_flagged = true`, `is_active = false`, records the
    /// reason. Returns false if the link does not exist.
    async fn flag(&self, link_id: i64, reason: &str) -> Result<bool, AppError>;

    /// Clears the flag and reactivates the link (admin moderation reversal).
    async fn unflag(&self, link_id: i64) -> Result<bool, AppError>;

    /// Attaches an account as an owner. Idempotent: attaching an existing
    /// owner is a no-op.
    async fn attach_owner(&self, account_id: &str, link_id: i64) -> Result<(), AppError>;

    /// Returns true when the account owns the link.
    async fn is_owner(&self, account_id: &str, link_id: i64) -> Result<bool, AppError>;

    /// Detaches an owner and destroys the row when the last owner leaves.
    ///
    /// The count-then-delete runs inside one transaction so two concurrent
    /// detaches cannot both observe a single remaining owner.
    async fn detach_owner(&self, account_id: &str, link_id: i64)
    -> Result<DetachOutcome, AppError>;

    /// Destroys the row and all dependent data regardless of remaining
    /// owners. Administrator force-delete. Returns false if absent.
    async fn force_delete(&self, link_id: i64) -> Result<bool, AppError>;

    /// Deactivates every expired-but-still-active row. Periodic sweep
    /// keeping listings accurate; correctness relies on the lazy read check.
    async fn deactivate_expired(&self) -> Result<u64, AppError>;

    /// Atomically advances `current_rotation`, returning the pre-increment
    /// value. Single conditional update at the store; never read-modify-write.
    async fn advance_rotation(&self, link_id: i64) -> Result<i32, AppError>;

    /// Updates the denormalized last-known health columns.
    async fn update_health(
        &self,
        link_id: i64,
        status: HealthStatus,
        status_code: Option<i32>,
        error: Option<String>,
    ) -> Result<(), AppError>;

    /// Active, unflagged links whose last probe is older than `stale_before`
    /// (or never probed), oldest-checked-first, at most `limit` rows.
    async fn stale_for_health_check(
        &self,
        stale_before: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError>;

    /// Links owned by an account, newest first.
    async fn list_for_account(&self, account_id: &str) -> Result<Vec<ShortLink>, AppError>;

    /// Aggregate counts for the admin dashboard: (active, flagged).
    async fn admin_counts(&self) -> Result<(i64, i64), AppError>;
}
