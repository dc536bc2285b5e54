//! # Gateway Events & Checkout Prompt
//!
//! Types crossing the boundary between this system and the gateway's
//! client-side modal. The prompt describes the modal to be opened; the
//! confirmation arrives later as an externally-triggered event whose
//! timing (or occurrence) is outside this system's control.

use serde::{Deserialize, Serialize};
use store_core::Customer;

/// Identity fields prefilled into the gateway modal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl From<&Customer> for Prefill {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            contact: customer.phone.clone(),
        }
    }
}

/// Options for the gateway's client-side card-capture modal.
///
/// Serialized to the frontend, which constructs the gateway SDK object
/// and calls `.open()`. Only the public key id appears here; the key
/// secret never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPrompt {
    /// Public gateway key id
    pub key: String,

    /// Amount in minor units
    pub amount: i64,

    /// Settlement currency code
    pub currency: String,

    /// Gateway-side order/intent id
    pub gateway_order_id: String,

    /// Our order id, echoed back with the confirmation
    pub order_id: String,

    /// Customer identity prefill
    pub prefill: Prefill,

    /// Order metadata notes
    #[serde(default, skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub notes: std::collections::HashMap<String, String>,

    /// Modal theme color
    pub theme_color: String,
}

/// Signed payment confirmation returned by the gateway after capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Gateway-side order/intent id (matches the prompt)
    pub gateway_order_id: String,

    /// Gateway-side payment id
    pub gateway_payment_id: String,

    /// HMAC signature over `"{gateway_order_id}|{gateway_payment_id}"`
    pub signature: String,
}

/// Terminal events delivered by the gateway modal lifecycle.
///
/// `Completed` may arrive an arbitrary time after the prompt was issued,
/// or never (abandoned tab). `Dismissed` is the explicit user
/// cancellation path: no order or cart state is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum PaymentEvent {
    Completed(PaymentConfirmation),
    Dismissed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefill_from_customer() {
        let customer = Customer {
            name: "Maya Ortiz".to_string(),
            email: "maya@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
        };
        let prefill = Prefill::from(&customer);

        assert_eq!(prefill.name, "Maya Ortiz");
        assert_eq!(prefill.contact, "+1-555-0100");
    }

    #[test]
    fn test_prompt_never_carries_the_secret() {
        let prompt = CheckoutPrompt {
            key: "gwk_test_abc".to_string(),
            amount: 4_500,
            currency: "INR".to_string(),
            gateway_order_id: "order_GW1".to_string(),
            order_id: "ord-1".to_string(),
            prefill: Prefill::default(),
            notes: Default::default(),
            theme_color: "#8b5e3c".to_string(),
        };

        let json = serde_json::to_string(&prompt).unwrap();
        assert!(json.contains("gwk_test_abc"));
        assert!(!json.contains("gws_"));
    }

    #[test]
    fn test_event_serialization_tags() {
        let dismissed = serde_json::to_value(PaymentEvent::Dismissed).unwrap();
        assert_eq!(dismissed["event"], "dismissed");

        let completed = PaymentEvent::Completed(PaymentConfirmation {
            gateway_order_id: "order_GW1".to_string(),
            gateway_payment_id: "pay_GW2".to_string(),
            signature: "sig".to_string(),
        });
        let value = serde_json::to_value(completed).unwrap();
        assert_eq!(value["event"], "completed");
        assert_eq!(value["gateway_payment_id"], "pay_GW2");
    }
}
