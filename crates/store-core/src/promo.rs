//! # Promo Codes
//!
//! Promotion records as stored in the backend, and the discount math
//! applied against a cart subtotal.

use serde::{Deserialize, Serialize};

/// How a promotion's discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount` is a percentage of the subtotal (0-100)
    Percentage,
    /// `discount` is a flat amount in whole currency units
    Flat,
}

/// A promotion record from the `promo_codes` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    /// The code customers enter (matched exactly, case-sensitive)
    pub code: String,

    /// Discount value; meaning depends on `discount_type`
    pub discount: f64,

    /// Percentage or flat
    pub discount_type: DiscountType,

    /// Inactive codes never match
    pub is_active: bool,
}

impl PromoCode {
    /// Compute the discount in minor units for the given subtotal.
    ///
    /// Percentage discounts round to the nearest minor unit. The result is
    /// captured by the cart at apply time and frozen; it is not recomputed
    /// when the subtotal changes afterward.
    pub fn discount_for(&self, subtotal_minor: i64) -> i64 {
        match self.discount_type {
            DiscountType::Percentage => {
                ((subtotal_minor as f64) * self.discount / 100.0).round() as i64
            }
            DiscountType::Flat => (self.discount * 100.0).round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(code: &str, pct: f64) -> PromoCode {
        PromoCode {
            code: code.to_string(),
            discount: pct,
            discount_type: DiscountType::Percentage,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let promo = percent("SAVE10", 10.0);
        // 10% of $100.00
        assert_eq!(promo.discount_for(10_000), 1_000);
    }

    #[test]
    fn test_flat_discount() {
        let promo = PromoCode {
            code: "FIVEOFF".to_string(),
            discount: 5.0,
            discount_type: DiscountType::Flat,
            is_active: true,
        };
        assert_eq!(promo.discount_for(10_000), 500);
        // Flat discounts ignore the subtotal
        assert_eq!(promo.discount_for(100), 500);
    }

    #[test]
    fn test_percentage_rounding() {
        let promo = percent("SAVE15", 15.0);
        // 15% of $0.99 = 14.85 cents, rounds to 15
        assert_eq!(promo.discount_for(99), 15);
    }
}
