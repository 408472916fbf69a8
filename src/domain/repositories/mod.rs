//! Repository traits decoupling the domain from the persistence layer.

pub mod api_key_repository;
pub mod ban_repository;
pub mod click_repository;
pub mod health_repository;
pub mod link_repository;
pub mod report_repository;
pub mod rotation_repository;
pub mod scan_repository;

pub use api_key_repository::ApiKeyRepository;
pub use ban_repository::BanRepository;
pub use click_repository::ClickRepository;
pub use health_repository::HealthRepository;
pub use link_repository::{DetachOutcome, LinkRepository};
pub use report_repository::ReportRepository;
pub use rotation_repository::RotationRepository;
pub use scan_repository::ScanRepository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
#[cfg(test)]
pub use ban_repository::MockBanRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use health_repository::MockHealthRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use report_repository::MockReportRepository;
#[cfg(test)]
pub use rotation_repository::MockRotationRepository;
#[cfg(test)]
pub use scan_repository::MockScanRepository;
