//! Business logic services for the application layer.

pub mod api_key_service;
pub mod health_service;
pub mod moderation_service;
pub mod rate_limit_service;
pub mod report_service;
pub mod rotation_service;
pub mod shortener_service;
pub mod stats_service;
pub mod validation_service;

pub use api_key_service::{ApiKeyService, IssuedKey};
pub use health_service::HealthService;
pub use moderation_service::ModerationService;
pub use rate_limit_service::{RateLimitDecision, RateLimitService};
pub use report_service::ReportService;
pub use rotation_service::RotationService;
pub use shortener_service::{CreateLinkInput, CreatedLink, ShortenerService};
pub use stats_service::{AdminOverview, LinkStats, StatsService};
pub use validation_service::ValidationService;
