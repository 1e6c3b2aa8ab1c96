//! RSA public-key parsing and signature generation
//!
//! The Payout authorize exchange requires an RSA-OAEP encrypted signature
//! over `"{client_id}.{unix_epoch_seconds}"`. Keys arrive as PEM text that
//! has usually been copy-pasted through configuration UIs, so the parser
//! strips whitespace and the PEM armor textually instead of using a
//! PEM-aware reader; this accepts keys with mangled line breaks that a
//! strict parser would reject. Existing stored keys depend on this
//! behavior, so it must not be replaced with a standards-conformant
//! parser.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use sha1::Sha1;

use crate::error::CashfreeError;

/// PEM armor lines stripped from pasted keys
const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";

/// Parse an RSA public key from possibly-mangled PEM text
///
/// Strips all spaces, tabs, newlines and carriage returns, removes the
/// `BEGIN/END PUBLIC KEY` armor, base64-decodes the remainder, and parses
/// the result as a DER-encoded SubjectPublicKeyInfo key.
///
/// # Errors
///
/// Returns `CashfreeError::KeyFormat` when the base64 decoding fails or
/// the decoded bytes are not a valid DER public key.
pub fn parse_public_key(public_key_content: &str) -> Result<RsaPublicKey, CashfreeError> {
    let cleaned: String = public_key_content
        .replace(PEM_HEADER, "")
        .replace(PEM_FOOTER, "")
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect();

    let key_bytes = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| CashfreeError::KeyFormat(format!("Failed to parse public key: {}", e)))?;

    RsaPublicKey::from_public_key_der(&key_bytes)
        .map_err(|e| CashfreeError::KeyFormat(format!("Failed to parse public key: {}", e)))
}

/// Current Unix time in whole seconds
fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Generate the base64-encoded RSA-OAEP signature for the authorize call
///
/// Encrypts `"{client_id}.{epoch_seconds}"` under the supplied key with
/// OAEP padding, SHA-1 for both the OAEP digest and MGF1, and no label.
/// The embedded timestamp makes each signature time-bound; Cashfree
/// enforces expiry server-side, so nothing here is cached or reused.
///
/// # Errors
///
/// Returns `CashfreeError::Signature` when encryption fails, for example
/// when the plaintext exceeds the key's OAEP payload ceiling (about 214
/// bytes for a 2048-bit key with SHA-1).
pub fn generate_signature(
    client_id: &str,
    public_key: &RsaPublicKey,
) -> Result<String, CashfreeError> {
    let timestamp = epoch_seconds();
    let payload = format!("{}.{}", client_id, timestamp);

    tracing::debug!(
        client_id = %client_id,
        timestamp = timestamp,
        "Generating authorize signature"
    );

    let mut rng = rand::thread_rng();
    let ciphertext = public_key
        .encrypt(&mut rng, Oaep::new::<Sha1>(), payload.as_bytes())
        .map_err(|e| CashfreeError::Signature(format!("Failed to generate signature: {}", e)))?;

    Ok(BASE64.encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::RsaPrivateKey;

    fn test_key() -> RsaPublicKey {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
        RsaPublicKey::from(&private_key)
    }

    fn test_key_base64() -> String {
        let der = test_key().to_public_key_der().expect("der");
        BASE64.encode(der.as_bytes())
    }

    #[test]
    fn test_parse_clean_armored_key() {
        let body = test_key_base64();
        let pem = format!("{}\n{}\n{}", PEM_HEADER, body, PEM_FOOTER);
        assert!(parse_public_key(&pem).is_ok());
    }

    #[test]
    fn test_parse_key_without_armor() {
        let body = test_key_base64();
        assert!(parse_public_key(&body).is_ok());
    }

    #[test]
    fn test_parse_key_with_mangled_whitespace() {
        let body = test_key_base64();
        // Break the base64 body with tabs, CRLF and interior spaces the way
        // copy-paste through a browser form does.
        let mut mangled = String::from("  -----BEGIN PUBLIC KEY-----\r\n");
        for (i, chunk) in body.as_bytes().chunks(37).enumerate() {
            if i % 2 == 0 {
                mangled.push('\t');
            }
            mangled.push_str(std::str::from_utf8(chunk).unwrap());
            mangled.push_str("\r\n");
        }
        mangled.push_str("-----END PUBLIC KEY-----  ");
        assert!(parse_public_key(&mangled).is_ok());
    }

    #[test]
    fn test_parse_rejects_non_base64() {
        let err = parse_public_key("!!! not base64 !!!").unwrap_err();
        assert!(matches!(err, CashfreeError::KeyFormat(_)));
    }

    #[test]
    fn test_parse_rejects_non_der_content() {
        // Valid base64, but the decoded bytes are not DER.
        let bogus = BASE64.encode(b"these bytes are not a public key");
        let err = parse_public_key(&bogus).unwrap_err();
        assert!(matches!(err, CashfreeError::KeyFormat(_)));
    }

    #[test]
    fn test_signature_length_matches_key_size() {
        let key = test_key();
        let signature = generate_signature("CF10203", &key).unwrap();
        let raw = BASE64.decode(signature.as_bytes()).unwrap();
        // 2048-bit key produces a 256-byte ciphertext.
        assert_eq!(raw.len(), 256);
    }

    #[test]
    fn test_signatures_are_not_reused() {
        let key = test_key();
        let first = generate_signature("CF10203", &key).unwrap();
        let second = generate_signature("CF10203", &key).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_signature_rejects_oversized_payload() {
        let key = test_key();
        // OAEP with SHA-1 on a 2048-bit key caps the plaintext at 214
        // bytes; the timestamp suffix pushes this client_id past it.
        let oversized = "x".repeat(220);
        let err = generate_signature(&oversized, &key).unwrap_err();
        assert!(matches!(err, CashfreeError::Signature(_)));
    }
}
