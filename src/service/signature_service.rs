use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a hex-encoded HMAC-SHA256 signature over the raw webhook body.
/// The comparison inside `verify_slice` is constant-time. Any malformed input
/// yields false, never an error.
pub fn verify_hmac_signature(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let candidate = signature_hex.trim().trim_start_matches("sha256=");
    let Ok(signature) = hex::decode(candidate) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| format!("invalid webhook secret: {e}"))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let secret = b"test-webhook-secret";
        let payload = br#"{"requestId":"req-1","status":"verified"}"#;
        let signature = sign_payload(secret, payload).expect("sign");
        assert!(verify_hmac_signature(secret, payload, &signature));
        assert!(verify_hmac_signature(
            secret,
            payload,
            &format!("sha256={signature}")
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let secret = b"test-webhook-secret";
        let signature = sign_payload(secret, b"original").expect("sign");
        assert!(!verify_hmac_signature(secret, b"tampered", &signature));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        assert!(!verify_hmac_signature(b"secret", b"payload", "not-hex"));
        assert!(!verify_hmac_signature(b"secret", b"payload", ""));
    }
}
