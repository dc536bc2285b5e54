//! # Checkout Orchestration
//!
//! Sequences a checkout end to end: precondition checks, backend order
//! creation, gateway intent creation, and — once the gateway's
//! externally-timed confirmation arrives — signature verification,
//! payment persistence, and order finalization.
//!
//! The order record is always inserted BEFORE the gateway is involved so
//! something exists to reconcile against if payment is abandoned. A
//! failed intent or verification leaves that record in its pre-payment
//! status; there is no automatic cancellation.

use crate::email::EmailClient;
use std::sync::Arc;
use store_core::{
    CartLine, CartStore, Customer, Order, OrderItem, OrderStatus, PaymentRecord,
    ShippingAddress, SharedOrderRepository, SharedPaymentRepository, SharedProductRepository,
    StoreError, StoreResult,
};
use store_gateway::{verify_signature, CheckoutPrompt, GatewayClient, PaymentEvent};
use store_geo::CountryResolution;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Client-supplied cart snapshot taken at checkout time
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub discount_minor: i64,
}

impl CartSnapshot {
    /// Snapshot an in-process cart store
    pub fn from_store(store: &CartStore) -> Self {
        Self {
            lines: store.lines().to_vec(),
            promo_code: store.promo().code.clone(),
            discount_minor: store.discount_minor(),
        }
    }

    pub fn subtotal_minor(&self) -> i64 {
        self.lines.iter().map(|l| l.total_minor()).sum()
    }

    pub fn total_minor(&self) -> i64 {
        (self.subtotal_minor() - self.discount_minor).max(0)
    }
}

/// Result of the server-side half of checkout initiation
#[derive(Debug, Clone, serde::Serialize)]
pub struct BegunCheckout {
    pub order_id: String,
    pub prompt: CheckoutPrompt,
}

/// Terminal outcome of a payment event
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Verified and finalized; payment record id attached
    Completed { payment_id: String },
    /// User dismissed the modal; nothing was mutated
    Dismissed,
}

/// The checkout orchestrator
pub struct CheckoutFlow {
    orders: SharedOrderRepository,
    payments: SharedPaymentRepository,
    products: SharedProductRepository,
    gateway: Arc<GatewayClient>,
    email: Arc<EmailClient>,
}

impl CheckoutFlow {
    pub fn new(
        orders: SharedOrderRepository,
        payments: SharedPaymentRepository,
        products: SharedProductRepository,
        gateway: Arc<GatewayClient>,
        email: Arc<EmailClient>,
    ) -> Self {
        Self {
            orders,
            payments,
            products,
            gateway,
            email,
        }
    }

    /// Begin a cart checkout: validate, insert the order at
    /// `ToBeVerified`, create the gateway intent, and return the modal
    /// prompt. Suspends here; the confirmation arrives later.
    #[instrument(skip_all, fields(items = cart.lines.len(), country = %country.country_code))]
    pub async fn begin(
        &self,
        cart: &CartSnapshot,
        address: &ShippingAddress,
        customer: &Customer,
        country: &CountryResolution,
    ) -> StoreResult<BegunCheckout> {
        if !country.supported {
            return Err(StoreError::ShoppingUnavailable {
                country_code: country.country_code.clone(),
            });
        }
        if cart.lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        address.validate()?;

        let items: Vec<OrderItem> = cart.lines.iter().map(OrderItem::from_line).collect();
        let mut order = Order::new(
            items,
            cart.total_minor(),
            address,
            country.country_code.clone(),
            OrderStatus::ToBeVerified,
        );
        if let Some(code) = &cart.promo_code {
            order = order.with_promo(code.clone(), cart.discount_minor);
        }

        self.open_gateway(order, customer).await
    }

    /// Begin a single-item buy-now checkout. Skips `ToBeVerified`: the
    /// order enters directly at `Pending`.
    #[instrument(skip_all, fields(product_id, quantity))]
    pub async fn begin_buy_now(
        &self,
        product_id: &str,
        size: &str,
        quantity: u32,
        address: &ShippingAddress,
        customer: &Customer,
        country: &CountryResolution,
    ) -> StoreResult<BegunCheckout> {
        if !country.supported {
            return Err(StoreError::ShoppingUnavailable {
                country_code: country.country_code.clone(),
            });
        }
        address.validate()?;

        let product = self.products.get(product_id).await?;
        let stock = product.stock_for_size(size);
        if quantity > stock {
            return Err(StoreError::StockExceeded { available: stock });
        }
        if quantity < product.min_quantity {
            return Err(StoreError::BelowMinimumQuantity {
                minimum: product.min_quantity,
            });
        }

        let item = OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price_minor: product.price.amount,
            image: product.thumbnail.clone(),
            size: size.to_string(),
        };
        let total = item.unit_price_minor * quantity as i64;
        let order = Order::new(
            vec![item],
            total,
            address,
            country.country_code.clone(),
            OrderStatus::Pending,
        );

        self.open_gateway(order, customer).await
    }

    /// Shared tail of both entry points: persist the order, then create
    /// the gateway intent.
    async fn open_gateway(
        &self,
        order: Order,
        customer: &Customer,
    ) -> StoreResult<BegunCheckout> {
        // The order record must exist before the gateway is invoked
        self.orders.insert(&order).await?;
        info!(order_id = %order.id, status = %order.status, total = order.total_minor, "order created");

        let gateway_order = match self.gateway.create_order(order.total_minor, &order.id).await {
            Ok(g) => g,
            Err(e) => {
                // Reconciliation gap: the order stays in its pre-payment
                // status with no intent to settle against.
                warn!(order_id = %order.id, error = %e, "gateway intent failed, order left in place");
                return Err(e);
            }
        };

        let prompt = self
            .gateway
            .checkout_prompt(&gateway_order, &order.id, customer);
        Ok(BegunCheckout {
            order_id: order.id,
            prompt,
        })
    }

    /// Handle a gateway event for an in-flight checkout.
    ///
    /// Completion is verified fail-closed before anything is written; a
    /// mismatched signature leaves the order untouched. Dismissal mutates
    /// nothing.
    #[instrument(skip(self, event), fields(order_id))]
    pub async fn handle_event(
        &self,
        order_id: &str,
        event: PaymentEvent,
        customer_email: &str,
    ) -> StoreResult<CheckoutOutcome> {
        let confirmation = match event {
            PaymentEvent::Dismissed => {
                info!(order_id, "gateway modal dismissed, checkout re-enabled");
                return Ok(CheckoutOutcome::Dismissed);
            }
            PaymentEvent::Completed(confirmation) => confirmation,
        };

        // Security-critical, server-side only; the secret never reaches
        // the client.
        verify_signature(
            &confirmation.gateway_order_id,
            &confirmation.gateway_payment_id,
            &confirmation.signature,
            &self.gateway.config().key_secret,
        )?;

        let order = self.orders.get(order_id).await?;

        let payment = PaymentRecord::completed(
            &order.id,
            &confirmation.gateway_order_id,
            &confirmation.gateway_payment_id,
            order.total_minor,
            self.gateway.config().currency,
        );
        self.payments.insert(&payment).await?;

        self.orders.attach_payment(&order.id, &payment.id).await?;
        let next = match order.status {
            OrderStatus::ToBeVerified => OrderStatus::Pending,
            OrderStatus::Pending => OrderStatus::Processing,
            other => {
                return Err(StoreError::InvalidTransition {
                    from: other.to_string(),
                    to: "paid".to_string(),
                })
            }
        };
        self.orders.set_status(&order.id, next).await?;
        info!(order_id, payment_id = %payment.id, status = %next, "payment verified, order finalized");

        // Best-effort; never fails the checkout
        self.email.notify_checkout(&order, customer_email);

        Ok(CheckoutOutcome::Completed {
            payment_id: payment.id,
        })
    }

    /// Await the next gateway event on a channel and dispatch it.
    ///
    /// `None` (sender dropped) models the user closing the tab: the
    /// checkout is simply abandoned, same as a dismissal.
    pub async fn next_event(
        &self,
        order_id: &str,
        events: &mut mpsc::Receiver<PaymentEvent>,
        customer_email: &str,
    ) -> StoreResult<CheckoutOutcome> {
        match events.recv().await {
            Some(event) => self.handle_event(order_id, event, customer_email).await,
            None => Ok(CheckoutOutcome::Dismissed),
        }
    }
}

/// Post-payment cart cleanup: lines and promo are cleared together here,
/// the one place both are intentionally coupled.
pub fn clear_cart_after_payment(cart: &mut CartStore) {
    cart.clear();
    cart.remove_promo_code();
}
