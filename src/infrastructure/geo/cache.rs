//! Bounded LRU cache in front of the geolocation provider.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::provider::{GeoInfo, GeoProvider};
use crate::utils::net::is_private_ip;

/// Process-wide geolocation cache with least-recently-used eviction.
///
/// Lookups for private or unparsable addresses short-circuit to `None`.
/// Cache misses call the provider under a timeout; failures and timeouts
/// return `None` without being cached, so a transient provider outage does
/// not poison the cache. Concurrent misses for the same key may race; the
/// last write wins and the cache stays consistent either way.
pub struct GeoCache {
    provider: Arc<dyn GeoProvider>,
    capacity: usize,
    timeout: Duration,
    inner: Mutex<LruInner>,
}

/// Hash map plus access-order queue; front is least recently used.
struct LruInner {
    map: HashMap<String, GeoInfo>,
    order: VecDeque<String>,
}

impl LruInner {
    fn get(&mut self, ip: &str) -> Option<GeoInfo> {
        let info = self.map.get(ip).cloned()?;
        self.touch(ip);
        Some(info)
    }

    fn insert(&mut self, ip: String, info: GeoInfo, capacity: usize) {
        if self.map.insert(ip.clone(), info).is_some() {
            self.touch(&ip);
            return;
        }

        if self.map.len() > capacity
            && let Some(evicted) = self.order.pop_front()
        {
            self.map.remove(&evicted);
        }

        self.order.push_back(ip);
    }

    fn touch(&mut self, ip: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == ip)
            && let Some(key) = self.order.remove(pos)
        {
            self.order.push_back(key);
        }
    }
}

impl GeoCache {
    pub fn new(provider: Arc<dyn GeoProvider>, capacity: usize, timeout: Duration) -> Self {
        Self {
            provider,
            capacity: capacity.max(1),
            timeout,
            inner: Mutex::new(LruInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Resolves geolocation for an IP address, best-effort.
    ///
    /// Returns `None` for private/unparsable addresses and on provider
    /// failure or timeout. Never errors: geo data is advisory and must not
    /// block or fail click recording.
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = match ip.parse() {
            Ok(addr) => addr,
            Err(_) => {
                debug!(ip, "Skipping geo lookup for unparsable address");
                return None;
            }
        };

        if is_private_ip(&addr) {
            return None;
        }

        if let Some(info) = self.inner.lock().await.get(ip) {
            return Some(info);
        }

        match tokio::time::timeout(self.timeout, self.provider.lookup(ip)).await {
            Ok(Ok(info)) => {
                let mut inner = self.inner.lock().await;
                inner.insert(ip.to_string(), info.clone(), self.capacity);
                Some(info)
            }
            Ok(Err(e)) => {
                warn!(ip, "Geo lookup failed: {}", e);
                None
            }
            Err(_) => {
                warn!(ip, timeout_ms = self.timeout.as_millis() as u64, "Geo lookup timed out");
                None
            }
        }
    }
}
