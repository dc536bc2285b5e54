//! # Order & Payment Types
//!
//! The backend-persisted order snapshot taken from the cart at checkout
//! time, its lifecycle status machine, and the payment record written
//! after server-side verification.

use crate::cart::CartLine;
use crate::error::{StoreError, StoreResult};
use crate::money::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// Cart checkouts enter at `ToBeVerified`; single-item buy-now orders
/// enter directly at `Pending`. `Cancelled` is reachable from any state
/// before `Shipped`/`Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    ToBeVerified,
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (ToBeVerified, Pending) => true,
            (Pending, Processing) => true,
            (Processing, Shipped) => true,
            (Shipped, Delivered) => true,
            (ToBeVerified | Pending | Processing, Cancelled) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::ToBeVerified => "to_be_verified",
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One item frozen into the order snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in minor units (USD)
    pub unit_price_minor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub size: String,
}

impl OrderItem {
    /// Snapshot an order item from a cart line
    pub fn from_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price_minor: line.unit_price.amount,
            image: line.thumbnail.clone(),
            size: line.size.clone(),
        }
    }
}

/// Free-form structured shipping address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Reject when any field is blank
    pub fn validate(&self) -> StoreResult<()> {
        let fields = [
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::MissingAddressField {
                    field: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Single-string formatting as stored on the order
    pub fn formatted(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.line1, self.city, self.state, self.postal_code, self.country
        )
    }
}

/// Customer identity prefilled into the gateway modal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The order snapshot persisted to the backend at checkout time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// Snapshot of cart line items
    pub items: Vec<OrderItem>,

    /// Total in minor units, discount applied
    pub total_minor: i64,

    /// Shipping address, formatted as a single string
    pub shipping_address: String,

    /// Resolved country code at checkout time
    pub country_code: String,

    /// Applied promo code, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,

    /// Frozen discount in minor units
    #[serde(default)]
    pub discount_minor: i64,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Linked payment record, set after verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order snapshot with a generated ID
    pub fn new(
        items: Vec<OrderItem>,
        total_minor: i64,
        address: &ShippingAddress,
        country_code: impl Into<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            items,
            total_minor,
            shipping_address: address.formatted(),
            country_code: country_code.into(),
            promo_code: None,
            discount_minor: 0,
            status,
            payment_id: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: attach promo metadata
    pub fn with_promo(mut self, code: impl Into<String>, discount_minor: i64) -> Self {
        self.promo_code = Some(code.into());
        self.discount_minor = discount_minor;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Payment status enum for persisted payment records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// One row per successfully verified payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Generated record ID
    pub id: String,

    /// Our order this payment settles
    pub order_id: String,

    /// Gateway-side order/intent ID
    pub gateway_order_id: String,

    /// Gateway-side payment ID
    pub gateway_payment_id: String,

    /// Amount in minor units
    pub amount_minor: i64,

    /// Settlement currency
    pub currency: Currency,

    /// Status
    pub status: PaymentStatus,

    /// Verification timestamp
    pub verified_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Record a completed, verified payment
    pub fn completed(
        order_id: impl Into<String>,
        gateway_order_id: impl Into<String>,
        gateway_payment_id: impl Into<String>,
        amount_minor: i64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: gateway_payment_id.into(),
            amount_minor,
            currency,
            status: PaymentStatus::Completed,
            verified_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Price;

    fn address() -> ShippingAddress {
        ShippingAddress {
            line1: "12 Kiln Lane".to_string(),
            city: "Asheville".to_string(),
            state: "NC".to_string(),
            postal_code: "28801".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        assert!(ToBeVerified.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));

        // Cancellation allowed before shipment only
        assert!(ToBeVerified.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));

        // No skipping or rewinding
        assert!(!ToBeVerified.can_transition_to(Shipped));
        assert!(!Delivered.can_transition_to(Pending));
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());

        let mut incomplete = address();
        incomplete.city = "  ".to_string();
        let err = incomplete.validate().unwrap_err();
        assert!(matches!(err, StoreError::MissingAddressField { ref field } if field == "city"));
    }

    #[test]
    fn test_address_formatting() {
        assert_eq!(
            address().formatted(),
            "12 Kiln Lane, Asheville, NC 28801, US"
        );
    }

    #[test]
    fn test_order_item_snapshot() {
        let line = CartLine {
            product_id: "mug".to_string(),
            name: "Stoneware Mug".to_string(),
            unit_price: Price::usd(25.0),
            thumbnail: Some("mug.jpg".to_string()),
            quantity: 2,
            size: "M".to_string(),
            color: None,
            stock: 5,
            min_quantity: 1,
        };
        let item = OrderItem::from_line(&line);

        assert_eq!(item.unit_price_minor, 2_500);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.size, "M");
    }

    #[test]
    fn test_order_with_promo() {
        let order = Order::new(vec![], 4_500, &address(), "US", OrderStatus::ToBeVerified)
            .with_promo("FIVEOFF", 500);

        assert_eq!(order.promo_code.as_deref(), Some("FIVEOFF"));
        assert_eq!(order.discount_minor, 500);
        assert_eq!(order.status, OrderStatus::ToBeVerified);
    }
}
