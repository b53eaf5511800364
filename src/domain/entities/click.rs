//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click recorded when a shortened link is accessed.
///
/// Immutable once written. Geo fields are best-effort and stay `None` when
/// the geolocation lookup fails or times out.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    /// True when this was the first click from the visitor fingerprint.
    pub is_unique: bool,
}

/// Input data for recording a new click event.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub is_unique: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_click_minimal() {
        let new_click = NewClick {
            link_id: 10,
            ip: None,
            user_agent: None,
            referer: None,
            country_code: None,
            country_name: None,
            city: None,
            is_unique: false,
        };

        assert_eq!(new_click.link_id, 10);
        assert!(new_click.ip.is_none());
        assert!(!new_click.is_unique);
    }

    #[test]
    fn test_click_carries_geo_fields() {
        let click = Click {
            id: 1,
            link_id: 42,
            clicked_at: Utc::now(),
            ip: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: Some("https://news.example".to_string()),
            country_code: Some("DE".to_string()),
            country_name: Some("Germany".to_string()),
            city: Some("Berlin".to_string()),
            is_unique: true,
        };

        assert_eq!(click.country_code.as_deref(), Some("DE"));
        assert_eq!(click.city.as_deref(), Some("Berlin"));
        assert!(click.is_unique);
    }
}
