//! Cache trait and error types.

use async_trait::async_trait;

use crate::domain::entities::ShortLink;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching resolved link records by short code.
///
/// Caching is a performance optimization, never a correctness dependency:
/// implementations must be thread-safe and degrade to misses on backend
/// failure rather than disrupting resolution. The one strict requirement is
/// [`LinkCache::invalidate`] - it must clear every tier synchronously before
/// returning, so a flag/delete/update never races a stale read.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::TieredCache`] - bounded local map over a shared backend
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed shared tier
/// - [`crate::infrastructure::cache::NullCache`] - no-op for cache-less deployments
#[async_trait]
pub trait LinkCache: Send + Sync {
    /// Retrieves a cached link record. Backend errors are logged and read
    /// as misses.
    async fn get(&self, code: &str) -> CacheResult<Option<ShortLink>>;

    /// Stores a link record. Backend errors are logged and swallowed.
    async fn set(&self, code: &str, link: &ShortLink) -> CacheResult<()>;

    /// Removes a cached record from every tier before returning.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Reports backend liveness for the health endpoint.
    async fn health_check(&self) -> bool;
}
