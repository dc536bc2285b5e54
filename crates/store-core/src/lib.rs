//! # store-core
//!
//! Core types and state machines for the artisan storefront.
//!
//! This crate provides:
//! - `CartStore`, `CartLine`, and `PromoState` for the session cart
//! - `Order`, `OrderStatus`, and `PaymentRecord` for the checkout lifecycle
//! - `Currency`, `Price`, and the country→currency mapping
//! - Repository traits over the relational backend, with in-memory
//!   implementations for tests
//! - `CartStorage` for durable local cart persistence
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use store_core::{CartLine, CartStore, MemoryStorage, Price};
//!
//! let mut cart = CartStore::new(Box::new(MemoryStorage::default()));
//!
//! cart.add_item(line, 2)?;
//! cart.apply_promo_code("SAVE10", &promo_repo).await?;
//!
//! assert_eq!(cart.total_minor(), cart.subtotal_minor() - cart.discount_minor());
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod promo;
pub mod repository;
pub mod storage;

// Re-exports for convenience
pub use cart::{CartLine, CartNotice, CartStore, PromoState};
pub use error::{StoreError, StoreResult};
pub use money::{
    currency_for_country, shopping_supported, Currency, LocalPrice, Price, SUPPORTED_COUNTRIES,
};
pub use order::{
    Customer, Order, OrderItem, OrderStatus, PaymentRecord, PaymentStatus, ShippingAddress,
};
pub use promo::{DiscountType, PromoCode};
pub use repository::{
    MemoryOrderRepository, MemoryPaymentRepository, MemoryProductRepository,
    MemoryPromoRepository, OrderRepository, PaymentRepository, ProductRecord, ProductRepository,
    PromoRepository, SharedOrderRepository, SharedPaymentRepository, SharedProductRepository,
    SharedPromoRepository,
};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, PersistedCart, CART_STORAGE_KEY};
