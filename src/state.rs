//! Shared application state injected into every handler.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{
    ApiKeyService, HealthService, ModerationService, RateLimitService, ReportService,
    RotationService, ShortenerService, StatsService,
};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::LinkCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: PgPool,
    pub cache: Arc<dyn LinkCache>,
    pub click_tx: mpsc::Sender<ClickEvent>,
    pub shortener: Arc<ShortenerService>,
    pub rotation: Arc<RotationService>,
    pub rate_limiter: Arc<RateLimitService>,
    pub api_keys: Arc<ApiKeyService>,
    pub reports: Arc<ReportService>,
    pub moderation: Arc<ModerationService>,
    pub health: Arc<HealthService>,
    pub stats: Arc<StatsService>,
}
