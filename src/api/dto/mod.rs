//! Request and response DTOs for the REST API.

pub mod health;
pub mod shorten;
pub mod stats;
