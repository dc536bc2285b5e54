//! # Cart Store
//!
//! The session-scoped shopping cart: line items keyed by
//! (product, size, color), a single frozen promo state, derived totals,
//! and durable persistence on every mutation.
//!
//! All mutations validate against the line's stock ceiling and
//! minimum-quantity floor and are rejected whole on violation; the cart
//! is never left partially applied.

use crate::error::{StoreError, StoreResult};
use crate::money::Price;
use crate::repository::PromoRepository;
use crate::storage::{CartStorage, PersistedCart};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One purchasable unit selection in the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID
    pub product_id: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price (USD)
    pub unit_price: Price,

    /// Thumbnail reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Quantity (always within [min_quantity, stock])
    pub quantity: u32,

    /// Size variant (required for sized goods)
    pub size: String,

    /// Optional color variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Available stock for the selected size
    pub stock: u32,

    /// Minimum order quantity
    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,
}

fn default_min_quantity() -> u32 {
    1
}

impl CartLine {
    /// Cart identity: at most one line per (product, size, color) triple
    pub fn same_selection(&self, other: &CartLine) -> bool {
        self.product_id == other.product_id
            && self.size == other.size
            && self.color == other.color
    }

    /// Line total in minor units
    pub fn total_minor(&self) -> i64 {
        self.unit_price.amount * self.quantity as i64
    }
}

/// At most one active promotion per cart.
///
/// The discount is resolved at apply time and frozen: changing the cart
/// afterwards does not refresh it. Removing and re-applying the code is
/// the only way to recompute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoState {
    /// Applied code, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Frozen discount in minor units (0 when no code)
    pub discount_minor: i64,
}

impl PromoState {
    pub fn is_active(&self) -> bool {
        self.code.is_some() && self.discount_minor > 0
    }
}

/// User-visible cart notification.
///
/// Only one notice is pending at a time; it is consumed by the next
/// render pass via [`CartStore::take_notice`], so duplicate invocations
/// in the same tick never double-fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CartNotice {
    /// New line added to the cart
    Added { name: String },
    /// Existing line's quantity changed
    Updated { name: String, quantity: u32 },
    /// Line(s) removed
    Removed { name: String, size: String },
    /// Promotion applied
    PromoApplied { code: String },
    /// Rejected mutation; message names the specific problem
    Warning { message: String },
}

/// The session cart: ordered line items plus promo state.
///
/// Exclusive owner of its state; all changes go through the operations
/// below, each of which persists the full cart before returning.
pub struct CartStore {
    lines: Vec<CartLine>,
    promo: PromoState,
    pending_notice: Option<CartNotice>,
    storage: Box<dyn CartStorage>,
}

impl CartStore {
    /// Create a store, rehydrating any previously persisted cart.
    /// Malformed stored data is discarded (empty cart), never fatal.
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        let persisted = storage.load().unwrap_or_default();
        debug!(
            lines = persisted.lines.len(),
            promo = persisted.promo.is_active(),
            "rehydrated cart"
        );
        Self {
            lines: persisted.lines,
            promo: persisted.promo,
            pending_notice: None,
            storage,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item selection to the cart.
    ///
    /// Merges into an existing (product, size, color) line by summing
    /// quantity; otherwise appends a new line. Rejects without mutation
    /// when the resulting quantity would exceed stock or fall below the
    /// minimum order quantity.
    pub fn add_item(&mut self, line: CartLine, quantity: u32) -> StoreResult<()> {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_selection(&line)) {
            // An overflowing sum can never fit in stock
            let available = existing.stock;
            let Some(merged) = existing.quantity.checked_add(quantity) else {
                return self.reject(StoreError::StockExceeded { available });
            };
            if merged > available {
                return self.reject(StoreError::StockExceeded { available });
            }
            existing.quantity = merged;
            let notice = CartNotice::Updated {
                name: existing.name.clone(),
                quantity: merged,
            };
            self.persist();
            self.pending_notice = Some(notice);
            return Ok(());
        }

        if quantity < line.min_quantity {
            let minimum = line.min_quantity;
            return self.reject(StoreError::BelowMinimumQuantity { minimum });
        }
        if quantity > line.stock {
            let available = line.stock;
            return self.reject(StoreError::StockExceeded { available });
        }

        let notice = CartNotice::Added {
            name: line.name.clone(),
        };
        self.lines.push(CartLine { quantity, ..line });
        self.persist();
        self.pending_notice = Some(notice);
        Ok(())
    }

    /// Remove every line matching the product id.
    ///
    /// Keyed by product id alone, not the full (product, size, color)
    /// triple: all size/color variants of the product go at once.
    pub fn remove_item(&mut self, product_id: &str) {
        let removed: Vec<CartLine> = self
            .lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .cloned()
            .collect();
        if removed.is_empty() {
            return;
        }
        self.lines.retain(|l| l.product_id != product_id);
        self.persist();
        // Notice names the first removed variant
        let first = &removed[0];
        self.pending_notice = Some(CartNotice::Removed {
            name: first.name.clone(),
            size: first.size.clone(),
        });
    }

    /// Set the quantity for the line matching (product, size, color).
    ///
    /// A target below 1 behaves as [`remove_item`](Self::remove_item) for
    /// the product. Otherwise the same bounds as `add_item` apply.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        size: &str,
        color: Option<&str>,
        quantity: u32,
    ) -> StoreResult<()> {
        if quantity < 1 {
            self.remove_item(product_id);
            return Ok(());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.size == size && l.color.as_deref() == color);

        let Some(line) = line else {
            return self.reject(StoreError::ProductNotFound {
                product_id: product_id.to_string(),
            });
        };

        if quantity > line.stock {
            let available = line.stock;
            return self.reject(StoreError::StockExceeded { available });
        }
        if quantity < line.min_quantity {
            let minimum = line.min_quantity;
            return self.reject(StoreError::BelowMinimumQuantity { minimum });
        }

        line.quantity = quantity;
        let notice = CartNotice::Updated {
            name: line.name.clone(),
            quantity,
        };
        self.persist();
        self.pending_notice = Some(notice);
        Ok(())
    }

    /// Apply a promo code after remote validation.
    ///
    /// The lookup is exact and case-sensitive and only active codes match.
    /// A miss leaves any prior promo state untouched. A hit freezes the
    /// computed discount; it is not refreshed when the cart changes.
    pub async fn apply_promo_code(
        &mut self,
        code: &str,
        promos: &dyn PromoRepository,
    ) -> StoreResult<()> {
        let promo = match promos.find_active(code).await {
            Ok(Some(promo)) => promo,
            Ok(None) => {
                return self.reject(StoreError::InvalidPromoCode {
                    code: code.to_string(),
                });
            }
            Err(e) => {
                warn!(code, error = %e, "promo lookup failed");
                return self.reject(StoreError::InvalidPromoCode {
                    code: code.to_string(),
                });
            }
        };

        let discount = promo.discount_for(self.subtotal_minor());
        self.promo = PromoState {
            code: Some(promo.code.clone()),
            discount_minor: discount,
        };
        self.persist();
        self.pending_notice = Some(CartNotice::PromoApplied { code: promo.code });
        Ok(())
    }

    /// Clear the promo state unconditionally
    pub fn remove_promo_code(&mut self) {
        self.promo = PromoState::default();
        self.persist();
    }

    /// Empty all lines. Promo state intentionally survives; clearing it
    /// is the caller's separate responsibility.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Consume the pending notification, if any (one-shot)
    pub fn take_notice(&mut self) -> Option<CartNotice> {
        self.pending_notice.take()
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    /// Sum of line totals in minor units
    pub fn subtotal_minor(&self) -> i64 {
        self.lines.iter().map(|l| l.total_minor()).sum()
    }

    /// The frozen promo discount in minor units
    pub fn discount_minor(&self) -> i64 {
        self.promo.discount_minor
    }

    /// Subtotal minus discount, clamped at zero
    pub fn total_minor(&self) -> i64 {
        (self.subtotal_minor() - self.promo.discount_minor).max(0)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn promo(&self) -> &PromoState {
        &self.promo
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total unit count across lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Reject a mutation: no state change, warning notice scheduled,
    /// error returned for the caller.
    fn reject(&mut self, err: StoreError) -> StoreResult<()> {
        self.pending_notice = Some(CartNotice::Warning {
            message: err.user_message(),
        });
        Err(err)
    }

    fn persist(&self) {
        let snapshot = PersistedCart {
            lines: self.lines.clone(),
            promo: self.promo.clone(),
        };
        if let Err(e) = self.storage.save(&snapshot) {
            warn!(error = %e, "failed to persist cart");
        }
    }
}
