//! # Gateway REST Client
//!
//! Server-side client for the payment gateway: creates the gateway-side
//! order/intent a capture is reconciled against.

use crate::config::GatewayConfig;
use crate::events::{CheckoutPrompt, Prefill};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use store_core::{Customer, StoreError, StoreResult};
use tracing::{debug, error, info, instrument};

/// The gateway's server-side record of an amount to be collected
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order/intent id
    pub id: String,
    /// Amount in minor units
    pub amount: i64,
    /// Currency code
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    description: String,
}

/// Payment gateway API client
pub struct GatewayClient {
    config: GatewayConfig,
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> StoreResult<Self> {
        let config = GatewayConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Create a gateway-side order for the given amount.
    ///
    /// `receipt` is our order id, echoed back for reconciliation.
    #[instrument(skip(self), fields(amount = amount_minor, receipt = %receipt))]
    pub async fn create_order(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> StoreResult<GatewayOrder> {
        if amount_minor <= 0 {
            return Err(StoreError::InvalidRequest(
                "Gateway amount must be positive".to_string(),
            ));
        }

        let currency = self.config.currency.code();
        let request = CreateOrderRequest {
            amount: amount_minor,
            currency,
            receipt,
        };

        debug!("creating gateway order: {} {}", amount_minor, currency);

        let url = format!("{}/v1/orders", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("gateway API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<GatewayErrorResponse>(&body) {
                return Err(StoreError::GatewayError {
                    message: error_response.error.description,
                });
            }

            return Err(StoreError::GatewayError {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let order: GatewayOrder = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse gateway response: {e}"))
        })?;

        info!("created gateway order: id={}", order.id);
        Ok(order)
    }

    /// Build the client-side modal prompt for a created gateway order.
    /// Carries the public key id only; the secret stays server-side.
    pub fn checkout_prompt(
        &self,
        gateway_order: &GatewayOrder,
        order_id: &str,
        customer: &Customer,
    ) -> CheckoutPrompt {
        let mut notes = std::collections::HashMap::new();
        notes.insert("order_id".to_string(), order_id.to_string());

        CheckoutPrompt {
            key: self.config.key_id.clone(),
            amount: gateway_order.amount,
            currency: gateway_order.currency.clone(),
            gateway_order_id: gateway_order.id.clone(),
            order_id: order_id.to_string(),
            prefill: Prefill::from(customer),
            notes,
            theme_color: "#8b5e3c".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig::new("gwk_test_abc", "gws_secret").with_api_base_url(base_url)
    }

    #[tokio::test]
    async fn test_create_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_GW1",
                "amount": 4500,
                "currency": "INR"
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(config(&server.uri()));
        let order = client.create_order(4_500, "ord-1").await.unwrap();

        assert_eq!(order.id, "order_GW1");
        assert_eq!(order.amount, 4_500);
        assert_eq!(order.currency, "INR");
    }

    #[tokio::test]
    async fn test_provider_error_body_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "description": "amount below minimum" }
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(config(&server.uri()));
        let err = client.create_order(1, "ord-1").await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::GatewayError { ref message } if message == "amount below minimum"
        ));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_locally() {
        let client = GatewayClient::new(config("http://127.0.0.1:1"));
        assert!(client.create_order(0, "ord-1").await.is_err());
    }

    #[tokio::test]
    async fn test_network_failure_is_typed() {
        let client = GatewayClient::new(config("http://127.0.0.1:1"));
        let err = client.create_order(100, "ord-1").await.unwrap_err();
        assert!(matches!(err, StoreError::NetworkError(_)));
    }

    #[test]
    fn test_checkout_prompt_carries_public_key_only() {
        let client = GatewayClient::new(config("http://localhost"));
        let gateway_order = GatewayOrder {
            id: "order_GW1".to_string(),
            amount: 4_500,
            currency: "INR".to_string(),
        };
        let customer = Customer {
            name: "Maya".to_string(),
            email: "maya@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
        };

        let prompt = client.checkout_prompt(&gateway_order, "ord-1", &customer);
        assert_eq!(prompt.key, "gwk_test_abc");
        assert_eq!(prompt.notes.get("order_id").map(String::as_str), Some("ord-1"));
        assert_eq!(prompt.prefill.email, "maya@example.com");
    }
}
