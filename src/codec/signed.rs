//! Compact HS256 signed tokens
//!
//! Wire format: `b64url(header) "." b64url(payload) "." b64url(sig)` with
//! unpadded base64url segments, `header = {"alg":"HS256","typ":"JWT"}` and
//! `sig = HMAC-SHA256(key, segment1 "." segment2)`.
//!
//! The payload is only signed, not encrypted. Connection parameters placed
//! in a signed token are readable by whoever holds it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    check_expiry, constant_time_equal, hmac_sha256, Scheme, TokenCodec, MAC_LEN, MAX_TOKEN_LEN,
};
use crate::error::TokenError;
use crate::key::SecretKey;
use crate::payload::{AuthorizationPayload, ExpiryUnit};
use crate::serializer;

/// The only algorithm this codec signs with or accepts
pub const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// Codec for the `signed` scheme
#[derive(Debug, Clone)]
pub struct SignedCodec {
    key: SecretKey,
}

impl SignedCodec {
    /// Creates a codec; any non-empty key length is accepted
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if `key` is empty.
    pub fn new(key: SecretKey) -> Result<Self, TokenError> {
        if key.is_empty() {
            return Err(TokenError::InvalidKey(
                "signed scheme requires a non-empty key".to_string(),
            ));
        }
        Ok(Self { key })
    }

    fn sign(&self, header_b64: &str, payload_b64: &str) -> Result<[u8; MAC_LEN], TokenError> {
        hmac_sha256(
            &self.key,
            &[header_b64.as_bytes(), b".", payload_b64.as_bytes()],
        )
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    Ok(URL_SAFE_NO_PAD.encode(serializer::to_canonical_bytes(value)?))
}

impl TokenCodec for SignedCodec {
    fn scheme(&self) -> Scheme {
        Scheme::Signed
    }

    fn expiry_unit(&self) -> ExpiryUnit {
        ExpiryUnit::Seconds
    }

    fn encode(&self, payload: &AuthorizationPayload) -> Result<String, TokenError> {
        payload.validate()?;
        let header_b64 = encode_segment(&Header::hs256())?;
        let payload_b64 = encode_segment(payload)?;
        let signature = self.sign(&header_b64, &payload_b64)?;
        Ok(format!(
            "{}.{}.{}",
            header_b64,
            payload_b64,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn decode_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationPayload, TokenError> {
        // Cap before scanning attacker-controlled input for delimiters.
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::MalformedToken("token too long".to_string()));
        }

        let segments: Vec<&str> = token.split('.').collect();
        let [header_b64, payload_b64, sig_b64] = segments.as_slice() else {
            return Err(TokenError::MalformedToken(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        };
        if header_b64.is_empty() || payload_b64.is_empty() || sig_b64.is_empty() {
            return Err(TokenError::MalformedToken("empty segment".to_string()));
        }

        // A signature that does not even decode cannot match.
        let provided = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::SignatureMismatch)?;
        let expected = self.sign(header_b64, payload_b64)?;
        if !constant_time_equal(&provided, &expected) {
            return Err(TokenError::SignatureMismatch);
        }

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|e| TokenError::MalformedToken(format!("header: {}", e)))?;
        let header: Header = serde_json::from_slice(&header_raw)
            .map_err(|e| TokenError::MalformedToken(format!("header: {}", e)))?;
        if header.alg != ALGORITHM {
            return Err(TokenError::MalformedToken(format!(
                "unsupported algorithm: {}",
                header.alg
            )));
        }

        let payload_raw = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| TokenError::MalformedPayload(e.to_string()))?;
        let payload: AuthorizationPayload = serializer::from_slice(&payload_raw)?;
        check_expiry(payload, self.expiry_unit(), now)
    }
}
