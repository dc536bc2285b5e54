//! # Exchange Rate Client
//!
//! USD-base exchange rate lookup with a bounded per-currency cache.
//! Conversion never fails: any fetch or parse problem falls back to the
//! original USD amount so rendering is never blocked.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use store_core::{currency_for_country, Currency, LocalPrice, Price};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cache entries expire one hour after first fetch
pub const RATE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: f64,
    fetched_at: Instant,
}

impl CachedRate {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Full USD-base rate table from the FX collaborator
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Cached FX conversion client
pub struct FxClient {
    client: Client,
    endpoint: String,
    ttl: Duration,
    cache: Mutex<HashMap<&'static str, CachedRate>>,
}

impl FxClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_ttl(endpoint, RATE_TTL)
    }

    pub fn with_ttl(endpoint: impl Into<String>, ttl: Duration) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Convert a USD price into the viewer's display currency.
    ///
    /// USD-mapped countries (including unresolved/unknown ones) return the
    /// amount unchanged with no network call. Everything else goes through
    /// the rate cache, fetching the full table on miss or expiry. On
    /// failure the USD quote is returned silently.
    pub async fn convert(&self, usd: Price, country_code: &str) -> LocalPrice {
        debug_assert_eq!(usd.currency, Currency::USD);

        let target = currency_for_country(country_code);
        if target == Currency::USD {
            return LocalPrice::usd(usd.as_decimal());
        }

        match self.rate_for(target).await {
            Some(rate) => LocalPrice::new(usd.as_decimal() * rate, target),
            None => LocalPrice::usd(usd.as_decimal()),
        }
    }

    async fn rate_for(&self, target: Currency) -> Option<f64> {
        let code = target.code();

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(code) {
            if cached.is_fresh(self.ttl) {
                return Some(cached.rate);
            }
        }

        // Miss or expired: fetch the full USD-base table once
        let rate = self.fetch_rate(code).await?;
        cache.insert(
            code,
            CachedRate {
                rate,
                fetched_at: Instant::now(),
            },
        );
        Some(rate)
    }

    async fn fetch_rate(&self, code: &str) -> Option<f64> {
        let response = match self.client.get(&self.endpoint).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "fx fetch failed, falling back to USD");
                return None;
            }
        };

        let table: RatesResponse = match response.json().await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "malformed fx response, falling back to USD");
                return None;
            }
        };

        match table.rates.get(code) {
            Some(rate) => {
                debug!(currency = code, rate, "fx rate refreshed");
                Some(*rate)
            }
            None => {
                warn!(currency = code, "fx table missing currency, falling back to USD");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rates_body() -> serde_json::Value {
        serde_json::json!({
            "rates": { "INR": 83.0, "GBP": 0.8, "EUR": 0.9 }
        })
    }

    #[tokio::test]
    async fn test_usd_identity_makes_zero_network_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rates_body()))
            .expect(0)
            .mount(&server)
            .await;

        let fx = FxClient::new(server.uri());
        let quote = fx.convert(Price::usd(25.0), "US").await;

        assert_eq!(quote, LocalPrice::usd(25.0));
        // Unresolved/unknown countries are also USD with no fetch
        let quote = fx.convert(Price::usd(25.0), "ZZ").await;
        assert_eq!(quote.code, "USD");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_converts_with_fetched_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rates_body()))
            .mount(&server)
            .await;

        let fx = FxClient::new(server.uri());
        let quote = fx.convert(Price::usd(10.0), "IN").await;

        assert_eq!(quote.code, "INR");
        assert_eq!(quote.symbol, "₹");
        assert!((quote.amount - 830.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_cache_avoids_repeat_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rates_body()))
            .expect(1)
            .mount(&server)
            .await;

        let fx = FxClient::new(server.uri());
        fx.convert(Price::usd(10.0), "IN").await;
        fx.convert(Price::usd(20.0), "IN").await;
        fx.convert(Price::usd(30.0), "IN").await;

        server.verify().await;
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rates_body()))
            .expect(2)
            .mount(&server)
            .await;

        let fx = FxClient::with_ttl(server.uri(), Duration::from_millis(20));
        fx.convert(Price::usd(10.0), "GB").await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        fx.convert(Price::usd(10.0), "GB").await;

        server.verify().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_usd() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fx = FxClient::new(server.uri());
        let quote = fx.convert(Price::usd(25.0), "IN").await;

        assert_eq!(quote.code, "USD");
        assert_eq!(quote.amount, 25.0);
    }

    #[tokio::test]
    async fn test_missing_currency_in_table_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"rates": {}})),
            )
            .mount(&server)
            .await;

        let fx = FxClient::new(server.uri());
        let quote = fx.convert(Price::usd(25.0), "IN").await;
        assert_eq!(quote.code, "USD");
    }
}
