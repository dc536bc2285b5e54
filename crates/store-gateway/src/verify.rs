//! # Payment Signature Verification
//!
//! Server-side cryptographic confirmation that a payment completion
//! notice genuinely originated from the gateway. The digest is
//! HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"` keyed by
//! the server-held secret; any mismatch is a hard rejection.

use store_core::{StoreError, StoreResult};

/// Compute the expected hex signature for a payment confirmation
pub fn compute_signature(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let payload = format!("{gateway_order_id}|{gateway_payment_id}");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a gateway-supplied signature against the expected digest.
///
/// Fail-closed: returns `StoreError::VerificationFailed` on any mismatch;
/// callers must not mutate downstream state on error.
pub fn verify_signature(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
    secret: &str,
) -> StoreResult<()> {
    let expected = compute_signature(gateway_order_id, gateway_payment_id, secret);
    if constant_time_compare(&expected, signature) {
        Ok(())
    } else {
        Err(StoreError::VerificationFailed)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // hex(HMAC-SHA256("test_secret", "order_abc|pay_123"))
    const KNOWN_DIGEST: &str = "2ae265b7794ea1d60d2bfbcb6be50d9e059bce607577aeaf83c1297090a8dfc7";
    const KNOWN_SECRET: &str = "test_secret";

    #[test]
    fn test_known_digest() {
        let sig = compute_signature("order_abc", "pay_123", KNOWN_SECRET);
        assert_eq!(sig, KNOWN_DIGEST);
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_verify_accepts_exact_match() {
        assert!(verify_signature("order_abc", "pay_123", KNOWN_DIGEST, KNOWN_SECRET).is_ok());
    }

    #[test]
    fn test_single_character_mutation_rejected() {
        let mut mutated = KNOWN_DIGEST.to_string();
        // Flip the last hex character
        mutated.pop();
        mutated.push('8');

        let err =
            verify_signature("order_abc", "pay_123", &mutated, KNOWN_SECRET).unwrap_err();
        assert!(matches!(err, StoreError::VerificationFailed));
    }

    #[test]
    fn test_wrong_ids_rejected() {
        assert!(verify_signature("order_xyz", "pay_123", KNOWN_DIGEST, KNOWN_SECRET).is_err());
        assert!(verify_signature("order_abc", "pay_999", KNOWN_DIGEST, KNOWN_SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(verify_signature("order_abc", "pay_123", KNOWN_DIGEST, "other_secret").is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
