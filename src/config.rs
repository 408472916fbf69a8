//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server
//! starts.
//!
//! ## Required Variables
//!
//! Either `DATABASE_URL` or all of (`DB_HOST`, `DB_USER`, `DB_PASSWORD`,
//! `DB_NAME`), plus `IP_HASH_SALT` and `GATE_SIGNING_SECRET`.
//!
//! ## Optional Variables
//!
//! - `REDIS_URL` / `REDIS_HOST` - Redis connection (enables the shared cache
//!   tier and the shared rate-limit store if set)
//! - `BASE_URL` - Public base used when building short URLs
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` / `LOG_FORMAT` - Log level and format (`text` or `json`)
//! - `RATE_LIMIT_MAX_REQUESTS` / `RATE_LIMIT_WINDOW_MS` - Sliding window
//!   limiter tuning (authenticated identities get 5x the base limit)
//! - `NON_AUTH_EXPIRY_DAYS` - Fixed TTL for anonymously created links
//! - `REPORT_AUTO_FLAG_THRESHOLD` - Report count that auto-flags a link
//! - `ADMIN_ACCOUNT_IDS` - Comma-separated privileged account ids
//! - `SAFE_BROWSING_API_KEY` / `VIRUSTOTAL_API_KEY` / `URLERT_API_KEY` -
//!   Threat-intel provider credentials; a missing key degrades that provider
//!   to `uncertain` instead of failing the scan chain

use anyhow::{Context, Result};
use std::env;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub base_url: String,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,

    /// Click event queue capacity (bounded mpsc channel).
    pub click_queue_capacity: usize,
    /// Days of click-event history kept by the retention sweep.
    pub click_retention_days: i64,

    /// Salt mixed into IP hashes before persistence. Raw IPs are never stored.
    pub ip_hash_salt: String,
    /// HMAC secret signing password-gate cookies.
    pub gate_signing_secret: String,

    /// Base request limit per sliding window for anonymous identifiers.
    pub rate_limit_max_requests: usize,
    /// Sliding window length in milliseconds.
    pub rate_limit_window_ms: u64,

    /// Fixed link TTL in days for anonymous creators.
    pub non_auth_expiry_days: i64,
    /// Pending report count at which a link is auto-flagged.
    pub report_auto_flag_threshold: i64,
    /// Account ids treated as administrators.
    pub admin_account_ids: Vec<String>,

    /// Local cache tier capacity (insertion-order eviction).
    pub local_cache_capacity: usize,
    /// Local cache tier TTL in seconds.
    pub local_cache_ttl_seconds: u64,
    /// Shared (Redis) cache tier TTL in seconds.
    pub shared_cache_ttl_seconds: u64,

    /// Threat-intel provider credentials. `None` degrades the provider to
    /// an `uncertain` verdict rather than erroring the pipeline.
    pub safe_browsing_api_key: Option<String>,
    pub virustotal_api_key: Option<String>,
    pub urlert_api_key: Option<String>,
    /// Per-call timeout for scan providers and health probes, in seconds.
    pub provider_timeout_seconds: u64,

    /// Max links examined per health sweep.
    pub health_batch_limit: i64,
    /// Links re-checked only when last probe is older than this many hours.
    pub health_stale_hours: i64,

    // ── PgPool settings ─────────────────────────────────────────────────────
    pub db_max_connections: u32,
    pub db_connect_timeout: u64,
    pub db_idle_timeout: u64,
    pub db_max_lifetime: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required database configuration or either of the
    /// signing secrets is missing.
    pub fn from_env() -> Result<Self> {
        let database_url =
            Self::load_database_url().context("Failed to load database configuration")?;
        let redis_url = Self::load_redis_url();

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let ip_hash_salt = env::var("IP_HASH_SALT").context("IP_HASH_SALT must be set")?;
        let gate_signing_secret =
            env::var("GATE_SIGNING_SECRET").context("GATE_SIGNING_SECRET must be set")?;

        let admin_account_ids = env::var("ADMIN_ACCOUNT_IDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            redis_url,
            base_url,
            listen_addr,
            log_level,
            log_format,
            click_queue_capacity: parse_env("CLICK_QUEUE_CAPACITY", 10_000),
            click_retention_days: parse_env("CLICK_RETENTION_DAYS", 90),
            ip_hash_salt,
            gate_signing_secret,
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 10),
            rate_limit_window_ms: parse_env("RATE_LIMIT_WINDOW_MS", 60_000),
            non_auth_expiry_days: parse_env("NON_AUTH_EXPIRY_DAYS", 7),
            report_auto_flag_threshold: parse_env("REPORT_AUTO_FLAG_THRESHOLD", 5),
            admin_account_ids,
            local_cache_capacity: parse_env("LOCAL_CACHE_CAPACITY", 1000),
            local_cache_ttl_seconds: parse_env("LOCAL_CACHE_TTL_SECONDS", 300),
            shared_cache_ttl_seconds: parse_env("SHARED_CACHE_TTL_SECONDS", 86_400),
            safe_browsing_api_key: env::var("SAFE_BROWSING_API_KEY").ok(),
            virustotal_api_key: env::var("VIRUSTOTAL_API_KEY").ok(),
            urlert_api_key: env::var("URLERT_API_KEY").ok(),
            provider_timeout_seconds: parse_env("PROVIDER_TIMEOUT_SECONDS", 10),
            health_batch_limit: parse_env("HEALTH_BATCH_LIMIT", 100),
            health_stale_hours: parse_env("HEALTH_STALE_HOURS", 6),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10),
            db_connect_timeout: parse_env("DB_CONNECT_TIMEOUT", 30),
            db_idle_timeout: parse_env("DB_IDLE_TIMEOUT", 600),
            db_max_lifetime: parse_env("DB_MAX_LIFETIME", 1800),
        })
    }

    /// Loads database URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `DATABASE_URL` environment variable
    /// 2. Constructed from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
    fn load_database_url() -> Result<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(url);
        }

        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let user =
            env::var("DB_USER").context("DB_USER must be set when DATABASE_URL is not provided")?;
        let password = env::var("DB_PASSWORD")
            .context("DB_PASSWORD must be set when DATABASE_URL is not provided")?;
        let name =
            env::var("DB_NAME").context("DB_NAME must be set when DATABASE_URL is not provided")?;

        Ok(format!(
            "postgres://{}:{}@{}:{}/{}",
            user, password, host, port, name
        ))
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Returns `None` if Redis is not configured; the service then runs with
    /// the local cache tier only and an in-memory rate-limit store.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").unwrap_or_default();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        if password.is_empty() {
            Some(format!("redis://{}:{}/{}", host, port, db))
        } else {
            Some(format!("redis://:{}@{}:{}/{}", password, host, port, db))
        }
    }

    /// Returns true when the account id is on the admin allow-list.
    pub fn is_admin(&self, account_id: &str) -> bool {
        self.admin_account_ids.iter().any(|id| id == account_id)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin_checks_allow_list() {
        let mut config = test_config();
        config.admin_account_ids = vec!["acct_1".to_string(), "acct_2".to_string()];

        assert!(config.is_admin("acct_1"));
        assert!(!config.is_admin("acct_3"));
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            redis_url: None,
            base_url: "http://localhost:3000".to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            click_queue_capacity: 100,
            click_retention_days: 90,
            ip_hash_salt: "salt".to_string(),
            gate_signing_secret: "secret".to_string(),
            rate_limit_max_requests: 10,
            rate_limit_window_ms: 60_000,
            non_auth_expiry_days: 7,
            report_auto_flag_threshold: 5,
            admin_account_ids: vec![],
            local_cache_capacity: 1000,
            local_cache_ttl_seconds: 300,
            shared_cache_ttl_seconds: 86_400,
            safe_browsing_api_key: None,
            virustotal_api_key: None,
            urlert_api_key: None,
            provider_timeout_seconds: 10,
            health_batch_limit: 100,
            health_stale_hours: 6,
            db_max_connections: 10,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 1800,
        }
    }
}
