//! Geolocation: external provider plus the in-process LRU cache.

pub mod cache;
pub mod provider;

pub use cache::GeoCache;
pub use provider::{GeoError, GeoInfo, GeoProvider, HttpGeoProvider};
