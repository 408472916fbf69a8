//! Request/response DTOs for the REST surface.

pub mod admin;
pub mod health;
pub mod keys;
pub mod links;
pub mod report;
pub mod rotation;
pub mod shorten;
