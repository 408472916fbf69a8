//! Repository trait for IP and domain deny-lists.

use crate::domain::entities::{BannedDomain, BannedIp};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for ban entries.
///
/// Lookups sit in front of the rate limiter and the scanner chain, so they
/// run on hot paths and fail closed: a banned identifier is rejected before
/// any paid provider call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BanRepository: Send + Sync {
    async fn is_ip_banned(&self, ip: &str) -> Result<bool, AppError>;

    /// Returns the ban reason when the domain is deny-listed.
    async fn find_banned_domain(&self, domain: &str) -> Result<Option<BannedDomain>, AppError>;

    /// Upserts an IP ban (re-banning refreshes the reason).
    async fn ban_ip(&self, ip: &str, reason: Option<String>) -> Result<(), AppError>;

    async fn unban_ip(&self, ip: &str) -> Result<bool, AppError>;

    async fn ban_domain(&self, domain: &str, reason: Option<String>) -> Result<(), AppError>;

    async fn unban_domain(&self, domain: &str) -> Result<bool, AppError>;

    async fn list_banned_ips(&self) -> Result<Vec<BannedIp>, AppError>;

    async fn list_banned_domains(&self) -> Result<Vec<BannedDomain>, AppError>;
}
