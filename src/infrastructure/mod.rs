//! Infrastructure layer: persistence, caching, rate limiting, outbound scanners and probes.

pub mod cache;
pub mod health;
pub mod persistence;
pub mod ratelimit;
pub mod security;
