//! Application services orchestrating the domain contracts.

pub mod click_service;
pub mod link_service;
pub mod stats_service;

pub use click_service::{ClickOutcome, ClickService};
pub use link_service::{LinkService, ShortenOutcome};
pub use stats_service::{LinkListing, LinkStats, StatsService};
