//! Token codecs
//!
//! Two token schemes are supported, both keyed by one shared secret:
//!
//! - [`EncryptedCodec`] (`encrypted`): the payload is MAC'd, the MAC is
//!   prepended, and the whole buffer is AES-128-CBC encrypted and base64
//!   encoded. Confidential and tamper evident.
//! - [`SignedCodec`] (`signed`): a compact HS256 token,
//!   `b64url(header).b64url(payload).b64url(hmac)`. Tamper evident only;
//!   anyone holding the token can read the payload.
//!
//! Both implement [`TokenCodec`]. [`Codec`] wraps whichever one the
//! configuration selects. Tokens produced by one scheme are never accepted
//! by the other.
//!
//! # Example
//!
//! ```
//! use guactoken::codec::{SignedCodec, TokenCodec};
//! use guactoken::key::SecretKey;
//! use guactoken::payload::{AuthorizationPayload, ConnectionSpec, Protocol};
//!
//! let codec = SignedCodec::new(SecretKey::from_bytes(b"shared".to_vec())).unwrap();
//! let payload = AuthorizationPayload::new("alice", i64::MAX)
//!     .with_connection("d1", ConnectionSpec::new(Protocol::Vnc).with_parameter("port", "5900"));
//!
//! let token = codec.encode(&payload).unwrap();
//! assert_eq!(codec.decode(&token).unwrap(), payload);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::key::{iv_from_hex, SecretKey};
use crate::payload::{AuthorizationPayload, ExpiryUnit};

pub mod encrypted;
pub mod signed;

pub use encrypted::EncryptedCodec;
pub use signed::SignedCodec;

/// Upper bound on accepted token length, checked before any decoding work
pub const MAX_TOKEN_LEN: usize = 64 * 1024;

/// Length of an HMAC-SHA256 tag in bytes
pub const MAC_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Encode/verify capability shared by every token scheme
pub trait TokenCodec: Send + Sync {
    /// Scheme implemented by this codec
    fn scheme(&self) -> Scheme;

    /// Unit the `expires` field is expressed in for this scheme
    fn expiry_unit(&self) -> ExpiryUnit;

    /// Encodes `payload` into a token string
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Serialization`] if the payload is malformed.
    fn encode(&self, payload: &AuthorizationPayload) -> Result<String, TokenError>;

    /// Verifies `token` and returns its payload, treating `now` as the
    /// current instant for the expiry check
    ///
    /// The signature is always checked before any payload field is parsed.
    fn decode_at(&self, token: &str, now: DateTime<Utc>)
        -> Result<AuthorizationPayload, TokenError>;

    /// Verifies `token` against the wall clock
    fn decode(&self, token: &str) -> Result<AuthorizationPayload, TokenError> {
        self.decode_at(token, Utc::now())
    }
}

/// Token scheme selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Sign-then-encrypt (AES-128-CBC, HMAC-SHA256 inside the ciphertext)
    Encrypted,
    /// Compact HS256 signed token
    #[default]
    Signed,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Encrypted => "encrypted",
            Scheme::Signed => "signed",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "encrypted" => Ok(Scheme::Encrypted),
            "signed" => Ok(Scheme::Signed),
            other => Err(format!(
                "Invalid token scheme: {}. Must be one of: encrypted, signed",
                other
            )),
        }
    }
}

/// Codec selected by configuration
#[derive(Debug, Clone)]
pub enum Codec {
    Encrypted(EncryptedCodec),
    Signed(SignedCodec),
}

impl Codec {
    /// Builds the codec named by `config.scheme` from its key material
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if the secret or IV is missing,
    /// not hex, or the wrong length for the scheme.
    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        let secret = config
            .secret_hex
            .as_deref()
            .ok_or_else(|| TokenError::InvalidKey("no secret configured".to_string()))?;
        let key = SecretKey::from_hex(secret)?;

        match config.scheme {
            Scheme::Encrypted => {
                let iv = iv_from_hex(&config.iv_hex)?;
                Ok(Codec::Encrypted(EncryptedCodec::new(key, iv)?))
            }
            Scheme::Signed => Ok(Codec::Signed(SignedCodec::new(key)?)),
        }
    }

    fn inner(&self) -> &dyn TokenCodec {
        match self {
            Codec::Encrypted(codec) => codec,
            Codec::Signed(codec) => codec,
        }
    }
}

impl TokenCodec for Codec {
    fn scheme(&self) -> Scheme {
        self.inner().scheme()
    }

    fn expiry_unit(&self) -> ExpiryUnit {
        self.inner().expiry_unit()
    }

    fn encode(&self, payload: &AuthorizationPayload) -> Result<String, TokenError> {
        self.inner().encode(payload)
    }

    fn decode_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationPayload, TokenError> {
        self.inner().decode_at(token, now)
    }
}

/// HMAC-SHA256 over the concatenation of `chunks`
pub(crate) fn hmac_sha256(key: &SecretKey, chunks: &[&[u8]]) -> Result<[u8; MAC_LEN], TokenError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
    for chunk in chunks {
        mac.update(chunk);
    }
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

pub(crate) fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}

/// Rejects expired payloads after they have been authenticated and parsed
pub(crate) fn check_expiry(
    payload: AuthorizationPayload,
    unit: ExpiryUnit,
    now: DateTime<Utc>,
) -> Result<AuthorizationPayload, TokenError> {
    if unit.is_expired(payload.expires, now) {
        return Err(TokenError::Expired {
            expires: payload.expires,
        });
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scheme: Scheme, secret: Option<&str>) -> TokenConfig {
        TokenConfig {
            scheme,
            secret_hex: secret.map(str::to_string),
            ..TokenConfig::default()
        }
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("Encrypted".parse::<Scheme>().unwrap(), Scheme::Encrypted);
        assert_eq!("signed".parse::<Scheme>().unwrap(), Scheme::Signed);
        assert!("jwe".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_from_config_selects_scheme() {
        let key = "28169799454fdfb2870d65374a4ed0f2";
        let encrypted = Codec::from_config(&config(Scheme::Encrypted, Some(key))).unwrap();
        assert_eq!(encrypted.scheme(), Scheme::Encrypted);
        assert_eq!(encrypted.expiry_unit(), ExpiryUnit::Milliseconds);

        let signed = Codec::from_config(&config(Scheme::Signed, Some(key))).unwrap();
        assert_eq!(signed.scheme(), Scheme::Signed);
        assert_eq!(signed.expiry_unit(), ExpiryUnit::Seconds);
    }

    #[test]
    fn test_from_config_requires_secret() {
        assert!(matches!(
            Codec::from_config(&config(Scheme::Signed, None)),
            Err(TokenError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_long_key_for_encrypted() {
        let key = "00112233445566778899aabbccddeeff00";
        assert!(matches!(
            Codec::from_config(&config(Scheme::Encrypted, Some(key))),
            Err(TokenError::InvalidKey(_))
        ));
        assert!(Codec::from_config(&config(Scheme::Signed, Some(key))).is_ok());
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let key = SecretKey::from_bytes(b"Jefe".to_vec());
        let mac = hmac_sha256(&key, &[b"what do ya want ", b"for nothing?"]).unwrap();
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_constant_time_equal() {
        assert!(constant_time_equal(b"abc", b"abc"));
        assert!(!constant_time_equal(b"abc", b"abd"));
        assert!(!constant_time_equal(b"abc", b"ab"));
    }
}
