//! # Backend Repository Traits
//!
//! Object-safe async seams over the relational backend. The HTTP
//! implementations live in the API crate; in-memory implementations here
//! back the orchestration tests and local development.

use crate::error::{StoreError, StoreResult};
use crate::money::Price;
use crate::order::{Order, OrderStatus, PaymentRecord};
use crate::promo::PromoCode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A product row from the `products` table
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    /// Unit price (USD)
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Available stock per size variant
    #[serde(default)]
    pub size_stock: HashMap<String, u32>,
    /// Minimum order quantity
    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,
}

fn default_min_quantity() -> u32 {
    1
}

impl ProductRecord {
    /// Stock for a size, zero when the size is not offered
    pub fn stock_for_size(&self, size: &str) -> u32 {
        self.size_stock.get(size).copied().unwrap_or(0)
    }
}

/// Access to the `orders` table
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> StoreResult<()>;
    async fn get(&self, order_id: &str) -> StoreResult<Order>;
    async fn set_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()>;
    async fn attach_payment(&self, order_id: &str, payment_id: &str) -> StoreResult<()>;
}

/// Access to the `promo_codes` table
#[async_trait]
pub trait PromoRepository: Send + Sync {
    /// Find an active promotion matching the code exactly (case-sensitive)
    async fn find_active(&self, code: &str) -> StoreResult<Option<PromoCode>>;
}

/// Access to the `payments` table
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &PaymentRecord) -> StoreResult<()>;
}

/// Access to the `products` table
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, product_id: &str) -> StoreResult<ProductRecord>;
}

/// Type aliases for shared trait objects
pub type SharedOrderRepository = Arc<dyn OrderRepository>;
pub type SharedPromoRepository = Arc<dyn PromoRepository>;
pub type SharedPaymentRepository = Arc<dyn PaymentRepository>;
pub type SharedProductRepository = Arc<dyn ProductRepository>;

// =============================================================================
// In-memory implementations
// =============================================================================

/// In-memory order table
#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Order> {
        self.orders.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert(&self, order: &Order) -> StoreResult<()> {
        self.orders
            .lock()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> StoreResult<Order> {
        self.orders
            .lock()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn set_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        if !order.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: order.status.to_string(),
                to: status.to_string(),
            });
        }
        order.status = status;
        Ok(())
    }

    async fn attach_payment(&self, order_id: &str, payment_id: &str) -> StoreResult<()> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        order.payment_id = Some(payment_id.to_string());
        Ok(())
    }
}

/// In-memory promo table
pub struct MemoryPromoRepository {
    promos: Vec<PromoCode>,
}

impl MemoryPromoRepository {
    pub fn new(promos: Vec<PromoCode>) -> Self {
        Self { promos }
    }
}

#[async_trait]
impl PromoRepository for MemoryPromoRepository {
    async fn find_active(&self, code: &str) -> StoreResult<Option<PromoCode>> {
        Ok(self
            .promos
            .iter()
            .find(|p| p.code == code && p.is_active)
            .cloned())
    }
}

/// In-memory payment table
#[derive(Default)]
pub struct MemoryPaymentRepository {
    payments: Mutex<Vec<PaymentRecord>>,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PaymentRecord> {
        self.payments.lock().await.clone()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn insert(&self, payment: &PaymentRecord) -> StoreResult<()> {
        self.payments.lock().await.push(payment.clone());
        Ok(())
    }
}

/// In-memory product table
#[derive(Default)]
pub struct MemoryProductRepository {
    products: HashMap<String, ProductRecord>,
}

impl MemoryProductRepository {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn get(&self, product_id: &str) -> StoreResult<ProductRecord> {
        self.products
            .get(product_id)
            .cloned()
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: product_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::ShippingAddress;

    fn address() -> ShippingAddress {
        ShippingAddress {
            line1: "12 Kiln Lane".to_string(),
            city: "Asheville".to_string(),
            state: "NC".to_string(),
            postal_code: "28801".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn test_order_status_transition_enforced() {
        let repo = MemoryOrderRepository::new();
        let order = Order::new(vec![], 1_000, &address(), "US", OrderStatus::ToBeVerified);
        let id = order.id.clone();
        repo.insert(&order).await.unwrap();

        repo.set_status(&id, OrderStatus::Pending).await.unwrap();
        assert_eq!(repo.get(&id).await.unwrap().status, OrderStatus::Pending);

        // Shipped is not reachable from Pending directly
        let err = repo.set_status(&id, OrderStatus::Shipped).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_promo_lookup_is_case_sensitive() {
        let repo = MemoryPromoRepository::new(vec![PromoCode {
            code: "SAVE10".to_string(),
            discount: 10.0,
            discount_type: crate::promo::DiscountType::Percentage,
            is_active: true,
        }]);

        assert!(repo.find_active("SAVE10").await.unwrap().is_some());
        assert!(repo.find_active("save10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_stock_for_size() {
        let mut size_stock = HashMap::new();
        size_stock.insert("M".to_string(), 4);
        let repo = MemoryProductRepository::new(vec![ProductRecord {
            id: "mug".to_string(),
            name: "Stoneware Mug".to_string(),
            price: Price::usd(25.0),
            thumbnail: None,
            size_stock,
            min_quantity: 1,
        }]);

        let product = repo.get("mug").await.unwrap();
        assert_eq!(product.stock_for_size("M"), 4);
        assert_eq!(product.stock_for_size("XL"), 0);

        assert!(repo.get("missing").await.is_err());
    }
}
