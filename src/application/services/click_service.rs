//! Click recorder: analytics for the redirect path.

use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::infrastructure::geo::GeoCache;
use crate::utils::fingerprint::visitor_fingerprint;

/// Result of recording a single click.
#[derive(Debug, Clone)]
pub struct ClickOutcome {
    pub click: Click,
    /// True when this was the first click from the visitor fingerprint.
    pub is_unique: bool,
}

/// Service recording click events and maintaining link counters.
///
/// Geo enrichment is best-effort: a provider failure or timeout leaves the
/// geo fields empty and never fails the recording. Counter increments are
/// delegated to the repository as atomic updates so concurrent redirects of
/// the same code never lose counts.
pub struct ClickService {
    clicks: Arc<dyn ClickRepository>,
    geo: Arc<GeoCache>,
}

impl ClickService {
    pub fn new(clicks: Arc<dyn ClickRepository>, geo: Arc<GeoCache>) -> Self {
        Self { clicks, geo }
    }

    /// Records one redirect: visitor uniqueness, geo lookup, click row,
    /// counter increments.
    ///
    /// Uniqueness is decided by inserting the (link, fingerprint) marker;
    /// the insert is atomic, so two concurrent first visits from the same
    /// visitor count as one unique click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on persistence failures. Geo lookup
    /// errors are absorbed before this point.
    pub async fn record(&self, event: &ClickEvent) -> Result<ClickOutcome, AppError> {
        let fingerprint = visitor_fingerprint(
            event.ip.as_deref().unwrap_or(""),
            event.user_agent.as_deref().unwrap_or(""),
        );

        let is_unique = self
            .clicks
            .insert_visitor_marker(event.link_id, &fingerprint)
            .await?;

        let geo = match event.ip.as_deref() {
            Some(ip) => self.geo.lookup(ip).await,
            None => None,
        };
        let geo = geo.unwrap_or_default();

        let click = self
            .clicks
            .record_click(NewClick {
                link_id: event.link_id,
                ip: event.ip.clone(),
                user_agent: event.user_agent.clone(),
                referer: event.referer.clone(),
                country_code: geo.country_code,
                country_name: geo.country_name,
                city: geo.city,
                is_unique,
            })
            .await?;

        self.clicks
            .increment_counters(event.link_id, is_unique)
            .await?;

        Ok(ClickOutcome { click, is_unique })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickRepository;
    use crate::infrastructure::geo::provider::{GeoError, GeoInfo, MockGeoProvider};
    use chrono::Utc;
    use std::time::Duration;

    fn event(link_id: i64, ip: &str, ua: &str) -> ClickEvent {
        ClickEvent::new(link_id, Some(ip.to_string()), Some(ua), None)
    }

    fn stored_click(new_click: &NewClick) -> Click {
        Click {
            id: 1,
            link_id: new_click.link_id,
            clicked_at: Utc::now(),
            ip: new_click.ip.clone(),
            user_agent: new_click.user_agent.clone(),
            referer: new_click.referer.clone(),
            country_code: new_click.country_code.clone(),
            country_name: new_click.country_name.clone(),
            city: new_click.city.clone(),
            is_unique: new_click.is_unique,
        }
    }

    fn geo_cache(provider: MockGeoProvider) -> Arc<GeoCache> {
        Arc::new(GeoCache::new(
            Arc::new(provider),
            100,
            Duration::from_millis(100),
        ))
    }

    fn geo_with_country(country: &'static str) -> Arc<GeoCache> {
        let mut provider = MockGeoProvider::new();
        provider.expect_lookup().returning(move |_| {
            Ok(GeoInfo {
                country_code: Some(country.to_string()),
                country_name: None,
                city: Some("Berlin".to_string()),
            })
        });
        geo_cache(provider)
    }

    #[tokio::test]
    async fn test_first_visit_is_unique() {
        let mut clicks = MockClickRepository::new();

        clicks
            .expect_insert_visitor_marker()
            .withf(|link_id, fp| *link_id == 42 && fp.len() == 64)
            .times(1)
            .returning(|_, _| Ok(true));
        clicks
            .expect_record_click()
            .withf(|c| c.is_unique)
            .times(1)
            .returning(|c| Ok(stored_click(&c)));
        clicks
            .expect_increment_counters()
            .withf(|link_id, unique| *link_id == 42 && *unique)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ClickService::new(Arc::new(clicks), geo_with_country("DE"));

        let outcome = service
            .record(&event(42, "80.0.0.1", "Mozilla/5.0"))
            .await
            .unwrap();

        assert!(outcome.is_unique);
        assert_eq!(outcome.click.country_code.as_deref(), Some("DE"));
    }

    #[tokio::test]
    async fn test_repeat_visit_is_not_unique() {
        let mut clicks = MockClickRepository::new();

        clicks
            .expect_insert_visitor_marker()
            .times(1)
            .returning(|_, _| Ok(false));
        clicks
            .expect_record_click()
            .withf(|c| !c.is_unique)
            .times(1)
            .returning(|c| Ok(stored_click(&c)));
        clicks
            .expect_increment_counters()
            .withf(|_, unique| !*unique)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ClickService::new(Arc::new(clicks), geo_with_country("DE"));

        let outcome = service
            .record(&event(42, "80.0.0.1", "Mozilla/5.0"))
            .await
            .unwrap();

        assert!(!outcome.is_unique);
    }

    #[tokio::test]
    async fn test_geo_failure_does_not_fail_recording() {
        let mut clicks = MockClickRepository::new();

        clicks
            .expect_insert_visitor_marker()
            .times(1)
            .returning(|_, _| Ok(true));
        clicks
            .expect_record_click()
            .withf(|c| c.country_code.is_none() && c.city.is_none())
            .times(1)
            .returning(|c| Ok(stored_click(&c)));
        clicks
            .expect_increment_counters()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut provider = MockGeoProvider::new();
        provider
            .expect_lookup()
            .returning(|_| Err(GeoError::Failure));

        let service = ClickService::new(Arc::new(clicks), geo_cache(provider));

        let outcome = service
            .record(&event(42, "80.0.0.1", "Mozilla/5.0"))
            .await
            .unwrap();

        assert!(outcome.click.country_code.is_none());
    }

    #[tokio::test]
    async fn test_missing_ip_skips_geo_lookup() {
        let mut clicks = MockClickRepository::new();

        clicks
            .expect_insert_visitor_marker()
            .times(1)
            .returning(|_, _| Ok(true));
        clicks
            .expect_record_click()
            .times(1)
            .returning(|c| Ok(stored_click(&c)));
        clicks
            .expect_increment_counters()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut provider = MockGeoProvider::new();
        provider.expect_lookup().times(0);

        let service = ClickService::new(Arc::new(clicks), geo_cache(provider));

        let outcome = service
            .record(&ClickEvent::new(42, None, Some("Mozilla/5.0"), None))
            .await
            .unwrap();

        assert!(outcome.click.ip.is_none());
    }

    #[tokio::test]
    async fn test_marker_failure_propagates() {
        let mut clicks = MockClickRepository::new();

        clicks
            .expect_insert_visitor_marker()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", serde_json::json!({}))));
        clicks.expect_record_click().times(0);

        let mut provider = MockGeoProvider::new();
        provider.expect_lookup().times(0);

        let service = ClickService::new(Arc::new(clicks), geo_cache(provider));

        let err = service
            .record(&event(42, "80.0.0.1", "Mozilla/5.0"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }
}
