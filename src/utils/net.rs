//! Client address helpers shared by the HTTP layer and the geo cache.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Returns true for addresses that never have a public geolocation and must
/// not be probed through the shortener: loopback, RFC 1918 ranges,
/// link-local, and their IPv6 equivalents.
pub fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                // fe80::/10 link local
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Extracts the client IP address for a request.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` (or
/// `X-Real-IP`) wins; otherwise the socket peer address is authoritative,
/// since forwarded headers are trivially spoofed on direct connections.
pub fn extract_client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}
