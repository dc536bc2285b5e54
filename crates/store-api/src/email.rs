//! # Email Notifier
//!
//! Fire-and-forget calls to the email microservice after checkout.
//! Failures are logged and never escalated; a lost notification must not
//! fail or roll back a completed payment.

use reqwest::Client;
use serde_json::json;
use store_core::Order;
use tracing::{info, warn};

/// Email collaborator client
#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    endpoint: String,
}

impl EmailClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Send one notification. Non-2xx and transport errors are logged at
    /// warn and swallowed.
    pub async fn send(&self, kind: &str, data: serde_json::Value) {
        let payload = json!({ "type": kind, "data": data });

        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(kind, "notification sent");
            }
            Ok(resp) => {
                warn!(kind, status = %resp.status(), "notification rejected");
            }
            Err(e) => {
                warn!(kind, error = %e, "notification failed");
            }
        }
    }

    /// Queue the post-checkout admin and customer notifications.
    /// Detached: the caller returns immediately.
    pub fn notify_checkout(&self, order: &Order, customer_email: &str) {
        let order_data = json!({
            "order_id": order.id,
            "total_minor": order.total_minor,
            "items": order.item_count(),
            "country": order.country_code,
        });

        let email = self.clone();
        let customer = customer_email.to_string();
        tokio::spawn(async move {
            email.send("order_admin", order_data.clone()).await;
            let mut customer_data = order_data;
            customer_data["email"] = json!(customer);
            email.send("order_customer", customer_data).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_posts_type_and_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"type": "order_admin"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let email = EmailClient::new(server.uri());
        email.send("order_admin", json!({"order_id": "ord-1"})).await;
        server.verify().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let email = EmailClient::new(server.uri());
        // Must not panic or error
        email.send("order_admin", json!({})).await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_swallowed() {
        let email = EmailClient::new("http://127.0.0.1:1/email");
        email.send("order_admin", json!({})).await;
    }
}
