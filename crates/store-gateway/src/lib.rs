//! # store-gateway
//!
//! Payment gateway integration for the artisan storefront.
//!
//! The gateway flow has two server-side halves around a client-side
//! capture step:
//!
//! 1. **Intent creation** — `GatewayClient::create_order` records an
//!    amount to be collected on the gateway's side and yields the
//!    `CheckoutPrompt` the frontend opens the modal with.
//! 2. **Verification** — the signed `PaymentConfirmation` returned by
//!    the modal is checked with `verify_signature` (HMAC-SHA256, keyed by
//!    the server-held secret) before any state is mutated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use store_gateway::{GatewayClient, verify_signature};
//!
//! let client = GatewayClient::from_env()?;
//! let gateway_order = client.create_order(total_minor, &order.id).await?;
//! let prompt = client.checkout_prompt(&gateway_order, &order.id, &customer);
//!
//! // ... later, when the confirmation arrives:
//! verify_signature(
//!     &confirmation.gateway_order_id,
//!     &confirmation.gateway_payment_id,
//!     &confirmation.signature,
//!     &client.config().key_secret,
//! )?;
//! ```

pub mod client;
pub mod config;
pub mod events;
pub mod verify;

// Re-exports
pub use client::{GatewayClient, GatewayOrder};
pub use config::GatewayConfig;
pub use events::{CheckoutPrompt, PaymentConfirmation, PaymentEvent, Prefill};
pub use verify::{compute_signature, verify_signature};
