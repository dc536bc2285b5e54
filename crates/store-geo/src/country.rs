//! # Country Resolver
//!
//! Process-wide, single-flight resolution of the viewer's country code.
//! The first caller triggers exactly one outbound geolocation request;
//! concurrent callers share the in-flight resolution, and once settled
//! the value is immutable for the rest of the process lifetime.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use store_core::shopping_supported;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Fallback when geolocation fails or is unreachable
pub const DEFAULT_COUNTRY: &str = "US";

/// The settled resolution shared by all consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryResolution {
    /// Resolved (or fallback) ISO country code
    pub country_code: String,
    /// Whether shopping is enabled for this country
    pub supported: bool,
}

impl CountryResolution {
    fn from_code(country_code: String) -> Self {
        let supported = shopping_supported(&country_code);
        Self {
            country_code,
            supported,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    country_code: String,
}

/// Single-flight geolocation resolver
pub struct CountryResolver {
    client: Client,
    endpoint: String,
    resolved: OnceCell<CountryResolution>,
}

impl CountryResolver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            resolved: OnceCell::new(),
        }
    }

    /// Resolve the viewer's country.
    ///
    /// Never fails: on any fetch or parse error the resolver settles on
    /// [`DEFAULT_COUNTRY`]. Subsequent calls return the settled value
    /// without a network round trip.
    pub async fn resolve(&self) -> CountryResolution {
        self.resolved
            .get_or_init(|| async {
                let resolution = self.fetch().await;
                info!(
                    country = %resolution.country_code,
                    supported = resolution.supported,
                    "country resolved"
                );
                resolution
            })
            .await
            .clone()
    }

    /// The settled value, if resolution has completed
    pub fn peek(&self) -> Option<&CountryResolution> {
        self.resolved.get()
    }

    /// Kick off resolution proactively (startup latency hiding).
    /// Consumers still call [`resolve`](Self::resolve); they join the same flight.
    pub fn spawn_prefetch(self: Arc<Self>) {
        tokio::spawn(async move {
            self.resolve().await;
        });
    }

    async fn fetch(&self) -> CountryResolution {
        let response = match self.client.get(&self.endpoint).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "geolocation fetch failed, defaulting to {DEFAULT_COUNTRY}");
                return CountryResolution::from_code(DEFAULT_COUNTRY.to_string());
            }
        };

        match response.json::<GeoResponse>().await {
            Ok(geo) => {
                debug!(country = %geo.country_code, "geolocation response");
                CountryResolution::from_code(geo.country_code)
            }
            Err(e) => {
                warn!(error = %e, "malformed geolocation response, defaulting to {DEFAULT_COUNTRY}");
                CountryResolution::from_code(DEFAULT_COUNTRY.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolves_country_and_supportedness() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"country_code": "IN"})),
            )
            .mount(&server)
            .await;

        let resolver = CountryResolver::new(server.uri());
        let resolution = resolver.resolve().await;

        assert_eq!(resolution.country_code, "IN");
        assert!(resolution.supported);
    }

    #[tokio::test]
    async fn test_unsupported_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"country_code": "ZZ"})),
            )
            .mount(&server)
            .await;

        let resolver = CountryResolver::new(server.uri());
        let resolution = resolver.resolve().await;

        assert_eq!(resolution.country_code, "ZZ");
        assert!(!resolution.supported);
    }

    #[tokio::test]
    async fn test_single_flight_dedupes_concurrent_callers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"country_code": "GB"}))
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Arc::new(CountryResolver::new(server.uri()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move { resolver.resolve().await }));
        }

        for handle in handles {
            let resolution = handle.await.unwrap();
            assert_eq!(resolution.country_code, "GB");
        }

        // A later call returns the settled value, still one request total
        assert_eq!(resolver.resolve().await.country_code, "GB");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let resolver = CountryResolver::new(server.uri());
        let resolution = resolver.resolve().await;

        assert_eq!(resolution.country_code, DEFAULT_COUNTRY);
        assert!(resolution.supported);
        // Settled: no permanently-unresolved state after an attempt
        assert!(resolver.peek().is_some());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let resolver = CountryResolver::new("http://127.0.0.1:1/geo");
        let resolution = resolver.resolve().await;
        assert_eq!(resolution.country_code, DEFAULT_COUNTRY);
    }
}
