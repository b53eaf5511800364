//! External geolocation provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

/// Geolocation data for an IP address. All fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code (e.g., "DE", "US").
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
}

/// Errors from the external geolocation provider.
///
/// These never propagate past the geo cache; callers observe `Unknown`.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("geo provider request failed: {0}")]
    Request(String),

    #[error("geo provider response could not be parsed: {0}")]
    Parse(String),

    #[error("geo provider reported a failed lookup")]
    Failure,
}

/// Geolocation lookup interface.
///
/// # Implementations
///
/// - [`HttpGeoProvider`] - ip-api.com-compatible HTTP endpoint
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolves country and city for an IP address.
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoError>;

    /// Provider name, for logs.
    fn name(&self) -> &'static str;
}

/// HTTP geolocation provider for ip-api.com-style JSON endpoints.
///
/// The endpoint template uses `{ip}` as a placeholder, e.g.
/// `http://ip-api.com/json/{ip}?fields=status,country,countryCode,city`.
/// Responses report failures via `{"status": "fail"}`.
pub struct HttpGeoProvider {
    http: reqwest::Client,
    url_template: String,
}

impl HttpGeoProvider {
    /// Builds the provider with a hard timeout on every request.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Request`] if the HTTP client cannot be constructed.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::Request(e.to_string()))?;

        Ok(Self {
            http,
            url_template: url_template.to_string(),
        })
    }
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoError> {
        let url = self.url_template.replace("{ip}", ip);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        if json["status"].as_str() == Some("fail") {
            return Err(GeoError::Failure);
        }

        // ip-api.com uses countryCode/country/city; accept snake_case
        // variants from compatible providers.
        let country_code = json["countryCode"]
            .as_str()
            .or_else(|| json["country_code"].as_str())
            .map(String::from);
        let country_name = json["country"].as_str().map(String::from);
        let city = json["city"].as_str().map(String::from);

        trace!(ip, ?country_code, ?city, "Geo provider lookup");

        Ok(GeoInfo {
            country_code,
            country_name,
            city,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
