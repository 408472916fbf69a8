//! HTTP request handlers.

pub mod admin;
pub mod analytics;
pub mod health;
pub mod keys;
pub mod password;
pub mod redirect;
pub mod report;
pub mod rotation;
pub mod shorten;
pub mod v1_shorten;
