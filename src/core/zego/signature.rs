//! Vendor request signing.
//!
//! Every call to the agent API carries `Action`, `AppId`, `SignatureNonce`,
//! `SignatureVersion` and `Timestamp` as query parameters. They are sorted by
//! key, rendered as `key=value` pairs joined with `&`, and signed with
//! HMAC-SHA256 keyed by the server secret. The lowercase hex digest is
//! appended as `Signature`.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded::byte_serialize;

use super::{ZegoError, ZegoResult};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_VERSION: &str = "2.0";

/// Render parameters as a key-sorted, percent-encoded query string
pub fn canonical_query(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| {
            let encoded: String = byte_serialize(value.as_bytes()).collect();
            format!("{key}={encoded}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// HMAC-SHA256 of `canonical` keyed by `secret`, lowercase hex
pub fn sign(canonical: &str, secret: &str) -> ZegoResult<String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ZegoError::InvalidSecret)?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build the complete signed query string for one vendor action
pub fn signed_query(
    action: &str,
    app_id: u32,
    secret: &str,
    nonce: &str,
    timestamp: i64,
) -> ZegoResult<String> {
    let mut params = BTreeMap::new();
    params.insert("Action", action.to_string());
    params.insert("AppId", app_id.to_string());
    params.insert("SignatureNonce", nonce.to_string());
    params.insert("SignatureVersion", SIGNATURE_VERSION.to_string());
    params.insert("Timestamp", timestamp.to_string());

    let canonical = canonical_query(&params);
    let signature = sign(&canonical, secret)?;
    Ok(format!("{canonical}&Signature={signature}"))
}

/// Fresh 16-character hex nonce
pub fn generate_nonce() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_sign_known_vector() {
        // RFC-style HMAC-SHA256 reference value
        let digest = sign("The quick brown fox jumps over the lazy dog", "key").unwrap();
        assert_eq!(
            digest,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_signed_query_known_vector() {
        let query = signed_query(
            "CreateAgentInstance",
            1234567890,
            SECRET,
            "0123456789abcdef",
            1700000000,
        )
        .unwrap();

        assert_eq!(
            query,
            "Action=CreateAgentInstance&AppId=1234567890&SignatureNonce=0123456789abcdef\
             &SignatureVersion=2.0&Timestamp=1700000000\
             &Signature=19fb0b175c96aad2c6bd190fc29f2e6e29ed7f3b76c5b0da39c286101cffdc4a"
        );
    }

    #[test]
    fn test_canonical_query_sorted_regardless_of_insertion() {
        let mut params = BTreeMap::new();
        params.insert("Timestamp", "1".to_string());
        params.insert("AppId", "2".to_string());
        params.insert("Action", "X".to_string());

        assert_eq!(canonical_query(&params), "Action=X&AppId=2&Timestamp=1");
    }

    #[test]
    fn test_canonical_query_encodes_values() {
        let mut params = BTreeMap::new();
        params.insert("Action", "a b&c".to_string());
        assert_eq!(canonical_query(&params), "Action=a+b%26c");
    }

    #[test]
    fn test_wrong_secret_changes_signature() {
        let a = signed_query("Foo", 1, SECRET, "n", 1).unwrap();
        let b = signed_query("Foo", 1, "fedcba9876543210fedcba9876543210", "n", 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_nonce() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 16);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, generate_nonce());
    }
}
