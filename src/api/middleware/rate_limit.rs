//! Rate limiting middleware using a per-IP token bucket.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Requests per second replenished into each client's bucket.
const PER_SECOND: u64 = 2;
/// Burst size before clients start seeing `429 Too Many Requests`.
const BURST: u32 = 100;

/// Rate limiter keyed by the socket peer address.
///
/// Use when the service terminates client connections directly; forwarded
/// headers are ignored because clients can forge them.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(PER_SECOND)
            .burst_size(BURST)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}

/// Rate limiter keyed by the forwarded client address.
///
/// Use behind a trusted reverse proxy, where the peer address is the proxy
/// itself and the real client is in X-Forwarded-For / X-Real-IP.
pub fn proxied_layer()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(PER_SECOND)
            .burst_size(BURST)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(governor_conf)
}
