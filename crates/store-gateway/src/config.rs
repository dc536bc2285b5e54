//! # Gateway Configuration
//!
//! Configuration for the payment gateway integration.
//! All secrets are loaded from environment variables; the key secret is
//! server-held and never serialized toward the client.

use std::env;
use store_core::{Currency, StoreError};

/// Payment gateway API configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Public key id (gwk_test_... or gwk_live_...) — safe to embed in
    /// the client modal options
    pub key_id: String,

    /// Server-held key secret (gws_...); signs payment confirmations
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Settlement currency the gateway charges in
    pub currency: Currency,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `GATEWAY_KEY_ID`
    /// - `GATEWAY_KEY_SECRET`
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let key_id = env::var("GATEWAY_KEY_ID")
            .map_err(|_| StoreError::Configuration("GATEWAY_KEY_ID not set".to_string()))?;

        let key_secret = env::var("GATEWAY_KEY_SECRET")
            .map_err(|_| StoreError::Configuration("GATEWAY_KEY_SECRET not set".to_string()))?;

        // Validate key formats
        if !key_id.starts_with("gwk_test_") && !key_id.starts_with("gwk_live_") {
            return Err(StoreError::Configuration(
                "GATEWAY_KEY_ID must start with gwk_test_ or gwk_live_".to_string(),
            ));
        }

        if !key_secret.starts_with("gws_") {
            return Err(StoreError::Configuration(
                "GATEWAY_KEY_SECRET must start with gws_".to_string(),
            ));
        }

        let api_base_url = env::var("GATEWAY_API_URL")
            .unwrap_or_else(|_| "https://api.gateway.example".to_string());

        Ok(Self {
            key_id,
            key_secret,
            api_base_url,
            currency: Currency::INR,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: "https://api.gateway.example".to_string(),
            currency: Currency::INR,
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("gwk_test_")
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the settlement currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = GatewayConfig::new("gwk_test_abc", "gws_secret")
            .with_api_base_url("http://localhost:9999")
            .with_currency(Currency::USD);

        assert!(config.is_test_mode());
        assert_eq!(config.api_base_url, "http://localhost:9999");
        assert_eq!(config.currency, Currency::USD);
    }

    #[test]
    fn test_default_currency_is_inr() {
        let config = GatewayConfig::new("gwk_live_abc", "gws_secret");
        assert_eq!(config.currency, Currency::INR);
        assert!(!config.is_test_mode());
    }
}
