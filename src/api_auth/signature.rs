//! HMAC-SHA256 request signatures.
//!
//! Signing base:
//! ```text
//! {METHOD}\n{path_with_query}\n{timestamp}\n{hex(sha256(raw_body))}
//! ```
//! The body hash is taken over the exact bytes received. An absent body is
//! hashed as zero bytes. Signatures travel as hex.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hex SHA-256 of the raw request body.
pub fn body_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Build the string both sides sign.
pub fn signing_base(method: &str, path_with_query: &str, timestamp: &str, body: &[u8]) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        method,
        path_with_query,
        timestamp,
        body_hash(body)
    )
}

/// Compute the hex signature for a signing base (client side, and tests).
///
/// HMAC takes keys of any length, so the empty fallback is unreachable; it
/// would never verify anyway.
pub fn sign(secret: &[u8], signing_base: &str) -> String {
    match HmacSha256::new_from_slice(secret) {
        Ok(mut mac) => {
            mac.update(signing_base.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    }
}

/// Verify a hex signature in constant time.
///
/// Returns `false` for anything that is not a well-formed 32-byte hex
/// signature; never panics.
pub fn verify_hmac(secret: &[u8], signing_base: &str, signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(signing_base.as_bytes());
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"shared-secret";

    #[test]
    fn test_empty_body_hash() {
        // SHA-256 of zero bytes
        assert_eq!(
            body_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(body_hash(b""), body_hash(b"{}"));
    }

    #[test]
    fn test_signing_base_format() {
        let base = signing_base("POST", "/entries?x=1", "1700000000", b"{}");
        let lines: Vec<&str> = base.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/entries?x=1");
        assert_eq!(lines[2], "1700000000");
        assert_eq!(lines[3], body_hash(b"{}"));
    }

    #[test]
    fn test_sign_verify() {
        let base = signing_base("GET", "/entries", "1700000000", b"");
        let sig = sign(SECRET, &base);
        assert_eq!(sig.len(), 64);
        assert!(verify_hmac(SECRET, &base, &sig));
        assert!(verify_hmac(SECRET, &base, &sig.to_uppercase()));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let base = signing_base("GET", "/entries", "1700000000", b"");
        let sig = sign(SECRET, &base);
        assert!(!verify_hmac(b"other-secret", &base, &sig));
    }

    #[test]
    fn test_verify_malformed_signature() {
        let base = signing_base("GET", "/entries", "1700000000", b"");
        assert!(!verify_hmac(SECRET, &base, "not-hex"));
        assert!(!verify_hmac(SECRET, &base, ""));
        assert!(!verify_hmac(SECRET, &base, "abcd"));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let mut mac = HmacSha256::new_from_slice(b"Jefe").unwrap();
        mac.update(b"what do ya want for nothing?");
        let expected = hex::encode(mac.finalize().into_bytes());
        assert_eq!(
            expected,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert_eq!(sign(b"Jefe", "what do ya want for nothing?"), expected);
    }
}
