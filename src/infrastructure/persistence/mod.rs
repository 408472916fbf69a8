//! PostgreSQL repository implementations.

pub mod pg_api_key_repository;
pub mod pg_ban_repository;
pub mod pg_click_repository;
pub mod pg_health_repository;
pub mod pg_link_repository;
pub mod pg_report_repository;
pub mod pg_rotation_repository;
pub mod pg_scan_repository;

pub use pg_api_key_repository::PgApiKeyRepository;
pub use pg_ban_repository::PgBanRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_health_repository::PgHealthRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_report_repository::PgReportRepository;
pub use pg_rotation_repository::PgRotationRepository;
pub use pg_scan_repository::PgScanRepository;
