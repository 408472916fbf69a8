//! Middleware for the HTTP layer.

pub mod api_key;
pub mod identity;
pub mod rate_limit;
pub mod tracing;
