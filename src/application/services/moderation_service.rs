//! Admin deny-list management.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::{BannedDomain, BannedIp};
use crate::domain::repositories::BanRepository;
use crate::error::AppError;

/// Maintains the IP and domain deny lists consulted by the rate limiter and
/// the validation chain.
pub struct ModerationService {
    bans: Arc<dyn BanRepository>,
}

impl ModerationService {
    pub fn new(bans: Arc<dyn BanRepository>) -> Self {
        Self { bans }
    }

    pub async fn ban_ip(&self, ip: &str, reason: Option<String>) -> Result<(), AppError> {
        self.bans.ban_ip(ip, reason).await?;
        info!(ip, "IP banned");
        Ok(())
    }

    pub async fn unban_ip(&self, ip: &str) -> Result<bool, AppError> {
        self.bans.unban_ip(ip).await
    }

    pub async fn ban_domain(&self, domain: &str, reason: Option<String>) -> Result<(), AppError> {
        self.bans.ban_domain(domain, reason).await?;
        info!(domain, "domain banned");
        Ok(())
    }

    pub async fn unban_domain(&self, domain: &str) -> Result<bool, AppError> {
        self.bans.unban_domain(domain).await
    }

    pub async fn list_bans(&self) -> Result<(Vec<BannedIp>, Vec<BannedDomain>), AppError> {
        let ips = self.bans.list_banned_ips().await?;
        let domains = self.bans.list_banned_domains().await?;
        Ok((ips, domains))
    }
}
