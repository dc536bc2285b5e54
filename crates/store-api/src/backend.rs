//! # Backend Repositories
//!
//! REST implementations of the repository traits over the hosted
//! relational backend. The backend exposes a generic per-table query
//! surface: `GET /{table}?col=eq.v`, `POST /{table}` (returning the
//! inserted representation), `PATCH /{table}?id=eq.v`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use store_core::{
    Order, OrderRepository, OrderStatus, PaymentRecord, PaymentRepository, ProductRecord,
    ProductRepository, PromoCode, PromoRepository, StoreError, StoreResult,
};
use tracing::{debug, instrument};

/// REST client over the relational backend
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// `GET /{table}?{column}=eq.{value}`, decoded as a row list
    async fn select_eq<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> StoreResult<Vec<T>> {
        let response = self
            .authed(self.client.get(self.table_url(table)))
            .query(&[(column, format!("eq.{value}"))])
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("{table} select: HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(format!("{table} select decode: {e}")))
    }

    /// `POST /{table}` with a single-row payload
    async fn insert_row(&self, table: &str, row: serde_json::Value) -> StoreResult<()> {
        let response = self
            .authed(self.client.post(self.table_url(table)))
            .json(&json!([row]))
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("{table} insert: HTTP {status}: {body}")));
        }
        debug!(table, "row inserted");
        Ok(())
    }

    /// `PATCH /{table}?id=eq.{id}`
    async fn patch_by_id(&self, table: &str, id: &str, patch: serde_json::Value) -> StoreResult<()> {
        let response = self
            .authed(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("{table} update: HTTP {status}: {body}")));
        }
        debug!(table, id, "row updated");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for RestBackend {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        let row = serde_json::to_value(order)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.insert_row("orders", row).await
    }

    async fn get(&self, order_id: &str) -> StoreResult<Order> {
        let rows: Vec<Order> = self.select_eq("orders", "id", order_id).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::OrderNotFound {
            order_id: order_id.to_string(),
        })
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        let current = OrderRepository::get(self, order_id).await?;
        if !current.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: current.status.to_string(),
                to: status.to_string(),
            });
        }
        self.patch_by_id("orders", order_id, json!({ "status": status })).await
    }

    async fn attach_payment(&self, order_id: &str, payment_id: &str) -> StoreResult<()> {
        self.patch_by_id("orders", order_id, json!({ "payment_id": payment_id })).await
    }
}

#[async_trait]
impl PromoRepository for RestBackend {
    #[instrument(skip(self))]
    async fn find_active(&self, code: &str) -> StoreResult<Option<PromoCode>> {
        let rows: Vec<PromoCode> = self.select_eq("promo_codes", "code", code).await?;
        Ok(rows.into_iter().find(|p| p.is_active))
    }
}

#[async_trait]
impl PaymentRepository for RestBackend {
    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn insert(&self, payment: &PaymentRecord) -> StoreResult<()> {
        let row = serde_json::to_value(payment)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.insert_row("payments", row).await
    }
}

#[async_trait]
impl ProductRepository for RestBackend {
    async fn get(&self, product_id: &str) -> StoreResult<ProductRecord> {
        let rows: Vec<ProductRecord> = self.select_eq("products", "id", product_id).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: product_id.to_string(),
            })
    }
}
