//! # store-api
//!
//! HTTP API layer for the artisan storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for checkout, payment verification, promos, and pricing
//! - Checkout orchestration over the gateway and backend repositories
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/checkout` | Create order + gateway intent |
//! | POST | `/api/v1/checkout/buy-now` | Direct single-product purchase |
//! | POST | `/api/v1/payments/verify` | Verify payment signature |
//! | GET | `/api/v1/promos/{code}` | Look up an active promo code |
//! | GET | `/api/v1/geo` | Resolved country + shopping support |
//! | GET | `/api/v1/price` | Display-currency quote for a USD amount |

pub mod backend;
pub mod checkout;
pub mod email;
pub mod handlers;
pub mod routes;
pub mod state;

pub use checkout::{CartSnapshot, CheckoutFlow, CheckoutOutcome};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
