use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over `{order_id}|{payment_id}`, the string the
/// gateway signs when it confirms a payment.
pub fn payment_signature(key_secret: &str, order_id: &str, payment_id: &str) -> String {
    let mac = mac_for(key_secret, order_id, payment_id);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a callback signature. Returns false for malformed
/// hex as well as for a genuine mismatch.
pub fn verify_payment_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    supplied: &str,
) -> bool {
    let Ok(supplied) = hex::decode(supplied) else {
        return false;
    };
    mac_for(key_secret, order_id, payment_id)
        .verify_slice(&supplied)
        .is_ok()
}

fn mac_for(key_secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";
    const ORDER_ID: &str = "order_MkWq8vXYZ12345";
    const PAYMENT_ID: &str = "pay_NkQr9wABC67890";

    #[test]
    fn genuine_signature_verifies() {
        let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        assert!(verify_payment_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn signature_is_deterministic() {
        let a = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        let b = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        assert_eq!(a, b);
    }

    #[test]
    fn mutated_order_id_is_rejected() {
        let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        let mutated = format!("{}X", &ORDER_ID[..ORDER_ID.len() - 1]);
        assert!(!verify_payment_signature(SECRET, &mutated, PAYMENT_ID, &sig));
    }

    #[test]
    fn mutated_payment_id_is_rejected() {
        let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        let mutated = format!("{}X", &PAYMENT_ID[..PAYMENT_ID.len() - 1]);
        assert!(!verify_payment_signature(SECRET, ORDER_ID, &mutated, &sig));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        assert!(!verify_payment_signature(
            "other_secret",
            ORDER_ID,
            PAYMENT_ID,
            &sig
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID);
        // Flip the last hex digit.
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_payment_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(!verify_payment_signature(
            SECRET,
            ORDER_ID,
            PAYMENT_ID,
            "not-hex-at-all"
        ));
    }
}
