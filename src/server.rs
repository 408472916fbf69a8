//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and store setup, worker and sweep
//! spawning, and the Axum server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use chrono::Utc;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::services::{
    ApiKeyService, HealthService, ModerationService, RateLimitService, ReportService,
    RotationService, ShortenerService, StatsService, ValidationService,
};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::ClickRepository;
use crate::infrastructure::cache::{
    LinkCache, NullCache, NullScanCache, RedisCache, RedisScanCache, ScanCache, TieredCache,
};
use crate::infrastructure::health::HttpProber;
use crate::infrastructure::persistence::{
    PgApiKeyRepository, PgBanRepository, PgClickRepository, PgHealthRepository, PgLinkRepository,
    PgReportRepository, PgRotationRepository, PgScanRepository,
};
use crate::infrastructure::ratelimit::{MemoryRateLimitStore, RateLimitStore, RedisRateLimitStore};
use crate::infrastructure::security::{
    SafeBrowsingScanner, UrlScanner, UrlertScanner, VirusTotalScanner,
};
use crate::routes::app_router;
use crate::state::AppState;

const HEALTH_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const CLICK_PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis-backed shared cache tier and rate-limit store, degrading to the
///   local tier and an in-memory store when Redis is absent
/// - The threat scanner chain and the destination health prober
/// - Background click worker and the periodic sweeps
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migrations, or the server
/// bind fails. A missing or unreachable Redis is degraded, not fatal.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis = match &config.redis_url {
        Some(redis_url) => match connect_redis(redis_url).await {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Failed to connect to Redis: {}. Running degraded.", e);
                None
            }
        },
        None => None,
    };

    let shared_cache: Arc<dyn LinkCache> = match (&config.redis_url, &redis) {
        (Some(redis_url), Some(_)) => {
            match RedisCache::connect(redis_url, config.shared_cache_ttl_seconds).await {
                Ok(cache) => {
                    info!("Shared cache tier enabled (Redis)");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!("Shared cache unavailable: {}. Local tier only.", e);
                    Arc::new(NullCache)
                }
            }
        }
        _ => {
            info!("Shared cache tier disabled");
            Arc::new(NullCache)
        }
    };
    let cache: Arc<dyn LinkCache> = Arc::new(TieredCache::new(
        config.local_cache_capacity,
        Duration::from_secs(config.local_cache_ttl_seconds),
        shared_cache,
    ));

    let scan_cache: Arc<dyn ScanCache> = match &redis {
        Some(manager) => Arc::new(RedisScanCache::new(
            manager.clone(),
            config.shared_cache_ttl_seconds,
        )),
        None => Arc::new(NullScanCache),
    };

    let rate_limit_store: Arc<dyn RateLimitStore> = match &redis {
        Some(manager) => Arc::new(RedisRateLimitStore::new(manager.clone())),
        None => {
            info!("Rate limiting on in-memory store (single instance only)");
            Arc::new(MemoryRateLimitStore::new())
        }
    };

    let pool_arc = Arc::new(pool.clone());
    let links = Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let rotations = Arc::new(PgRotationRepository::new(pool_arc.clone()));
    let clicks: Arc<dyn ClickRepository> = Arc::new(PgClickRepository::new(pool_arc.clone()));
    let scans = Arc::new(PgScanRepository::new(pool_arc.clone()));
    let api_key_repo = Arc::new(PgApiKeyRepository::new(pool_arc.clone()));
    let bans = Arc::new(PgBanRepository::new(pool_arc.clone()));
    let report_repo = Arc::new(PgReportRepository::new(pool_arc.clone()));
    let health_repo = Arc::new(PgHealthRepository::new(pool_arc.clone()));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_seconds))
        .build()?;
    let scanners: Vec<Arc<dyn UrlScanner>> = vec![
        Arc::new(SafeBrowsingScanner::new(
            http.clone(),
            config.safe_browsing_api_key.clone(),
        )),
        Arc::new(VirusTotalScanner::new(
            http.clone(),
            config.virustotal_api_key.clone(),
        )),
        Arc::new(UrlertScanner::new(
            http.clone(),
            config.urlert_api_key.clone(),
        )),
    ];

    let validation = Arc::new(ValidationService::new(
        bans.clone(),
        scans.clone(),
        scan_cache,
        scanners,
    ));
    let shortener = Arc::new(ShortenerService::new(
        links.clone(),
        rotations.clone(),
        cache.clone(),
        validation,
        config.non_auth_expiry_days,
    ));
    let rotation = Arc::new(RotationService::new(links.clone(), rotations.clone()));
    let rate_limiter = Arc::new(RateLimitService::new(
        rate_limit_store,
        bans.clone(),
        config.rate_limit_max_requests as u32,
        Duration::from_millis(config.rate_limit_window_ms),
    ));
    let api_keys = Arc::new(ApiKeyService::new(api_key_repo));
    let reports = Arc::new(ReportService::new(
        report_repo.clone(),
        shortener.clone(),
        config.report_auto_flag_threshold,
    ));
    let moderation = Arc::new(ModerationService::new(bans));
    let health = Arc::new(HealthService::new(
        links.clone(),
        rotations,
        health_repo,
        Arc::new(HttpProber::new(http)),
        shortener.clone(),
    ));
    let stats = Arc::new(StatsService::new(
        links,
        clicks.clone(),
        scans,
        report_repo,
    ));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(click_rx, clicks.clone()));
    info!("Click worker started");

    spawn_sweeps(&config, shortener.clone(), health.clone(), clicks);

    let state = AppState {
        config: Arc::new(config.clone()),
        db: pool,
        cache,
        click_tx,
        shortener,
        rotation,
        rate_limiter,
        api_keys,
        reports,
        moderation,
        health,
        stats,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

async fn connect_redis(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url)?;
    Ok(ConnectionManager::new(client).await?)
}

/// Spawns the periodic maintenance tasks. None of them run on the request
/// path; failures are logged and retried next tick.
fn spawn_sweeps(
    config: &Config,
    shortener: Arc<ShortenerService>,
    health: Arc<HealthService>,
    clicks: Arc<dyn ClickRepository>,
) {
    let stale_hours = config.health_stale_hours;
    let batch_limit = config.health_batch_limit;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEALTH_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let stale_before = Utc::now() - chrono::Duration::hours(stale_hours);
            match health.run_batch(stale_before, batch_limit).await {
                Ok(checked) if checked > 0 => info!(checked, "health sweep finished"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "health sweep failed"),
            }
        }
    });

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match shortener.sweep_expired().await {
                Ok(swept) if swept > 0 => info!(swept, "expired links deactivated"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "expiry sweep failed"),
            }
        }
    });

    let retention_days = config.click_retention_days;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLICK_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(retention_days);
            match clicks.prune_older_than(cutoff).await {
                Ok(pruned) if pruned > 0 => info!(pruned, "old click events pruned"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "click prune failed"),
            }
        }
    });
}
