//! Webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the exact raw body bytes
//! and sends the result as `sha256=<hex>` in the signature header. The check
//! only runs when the service is configured with a shared secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the vendor's body signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature header value GitHub would send for `payload`.
pub fn compute_signature(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = hmac(secret);
    mac.update(payload);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `sha256=<hex>` header value against the raw body bytes.
///
/// The comparison is constant-time. Anything that does not parse as a
/// well-formed signature verifies as false rather than erroring.
pub fn verify_signature(secret: &[u8], payload: &[u8], header_value: &str) -> bool {
    let Some(signature_hex) = header_value.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };

    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    let mut mac = hmac(secret);
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

fn hmac(secret: &[u8]) -> Hmac<Sha256> {
    Hmac::<Sha256>::new_from_slice(secret)
        .unwrap_or_else(|_| Hmac::<Sha256>::new_from_slice(b"default").expect("hmac"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let secret = b"supersecret";
        let payload = br#"{"zen":"Keep it logically awesome."}"#;

        let header = compute_signature(secret, payload);
        assert!(header.starts_with("sha256="));
        assert!(verify_signature(secret, payload, &header));
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = b"{}";
        let header = compute_signature(b"secret-a", payload);
        assert!(!verify_signature(b"secret-b", payload, &header));
    }

    #[test]
    fn tampered_payload_fails() {
        let secret = b"supersecret";
        let header = compute_signature(secret, b"original");
        assert!(!verify_signature(secret, b"tampered", &header));
    }

    #[test]
    fn malformed_header_fails_closed() {
        let secret = b"supersecret";
        assert!(!verify_signature(secret, b"{}", "sha1=abcd"));
        assert!(!verify_signature(secret, b"{}", "sha256=not-hex"));
        assert!(!verify_signature(secret, b"{}", ""));
    }
}
