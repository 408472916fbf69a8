//! DTOs for abuse reporting.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: String,

    #[validate(length(min = 3, max = 500))]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report_id: i64,
    pub status: &'static str,
}
