//! # Store Error Types
//!
//! Typed error handling for the storefront core.
//! All fallible operations return `Result<T, StoreError>`.

use thiserror::Error;

/// Core error type for storefront operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested quantity exceeds available stock
    #[error("Only {available} items available in stock")]
    StockExceeded { available: u32 },

    /// Requested quantity is below the item's minimum order quantity
    #[error("Minimum order quantity is {minimum}")]
    BelowMinimumQuantity { minimum: u32 },

    /// Promo code not found or inactive
    #[error("Invalid promo code: {code}")]
    InvalidPromoCode { code: String },

    /// Checkout attempted with an empty cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Shipping address is incomplete
    #[error("Missing shipping address field: {field}")]
    MissingAddressField { field: String },

    /// Shopping is not enabled for the resolved country
    #[error("Shopping is not available in {country_code}")]
    ShoppingUnavailable { country_code: String },

    /// Product not found in the backend
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Order not found in the backend
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Invalid order status transition
    #[error("Invalid order transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Payment gateway API error
    #[error("Gateway error: {message}")]
    GatewayError { message: String },

    /// Network/HTTP error communicating with a collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Payment signature verification failed
    #[error("Payment verification failed")]
    VerificationFailed,

    /// Backend query error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns true if this is a local validation failure that should
    /// surface as a transient user-facing warning (operation was a no-op).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::StockExceeded { .. }
                | StoreError::BelowMinimumQuantity { .. }
                | StoreError::InvalidPromoCode { .. }
                | StoreError::EmptyCart
                | StoreError::MissingAddressField { .. }
                | StoreError::ShoppingUnavailable { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Configuration(_) => 500,
            StoreError::InvalidRequest(_) => 400,
            StoreError::StockExceeded { .. } => 400,
            StoreError::BelowMinimumQuantity { .. } => 400,
            StoreError::InvalidPromoCode { .. } => 404,
            StoreError::EmptyCart => 400,
            StoreError::MissingAddressField { .. } => 400,
            StoreError::ShoppingUnavailable { .. } => 403,
            StoreError::ProductNotFound { .. } => 404,
            StoreError::OrderNotFound { .. } => 404,
            StoreError::InvalidTransition { .. } => 409,
            StoreError::GatewayError { .. } => 502,
            StoreError::NetworkError(_) => 503,
            StoreError::VerificationFailed => 401,
            StoreError::Backend(_) => 502,
            StoreError::Serialization(_) => 500,
            StoreError::Internal(_) => 500,
        }
    }

    /// User-facing message. Security failures get a generic message
    /// without cryptographic detail; everything else names the problem.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::VerificationFailed => {
                "Payment verification failed, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for storefront operations
pub type StoreResult<T> = Result<T, StoreError>;
