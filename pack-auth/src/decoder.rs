//! Structural credential decoding.
//!
//! Splits a compact JWS and parses the payload segment. No signature check
//! happens here: only call this on a token a [`CredentialVerifier`] accepted.
//!
//! [`CredentialVerifier`]: crate::verify::CredentialVerifier

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::claims::Credential;
use crate::error::DecodeError;

pub fn decode_credential(raw: &str) -> Result<Credential, DecodeError> {
    let segments: Vec<&str> = raw.trim().split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(DecodeError::Malformed(segments.len()));
    };

    // Some issuers keep the padding.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn decodes_payload_claims() {
        let c = decode_credential(&token(json!({"id": 1, "tenant_id": "tenant-b"}))).unwrap();
        assert_eq!(c.tenant_id.as_deref(), Some("tenant-b"));
        assert_eq!(c.id.as_deref(), Some("1"));
    }

    #[test]
    fn rejects_structural_garbage() {
        assert!(matches!(decode_credential("a.b"), Err(DecodeError::Malformed(2))));
        assert!(matches!(decode_credential("a.!!!.c"), Err(DecodeError::Base64(_))));

        let not_json = format!("x.{}.y", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(decode_credential(&not_json), Err(DecodeError::Json(_))));
    }
}
