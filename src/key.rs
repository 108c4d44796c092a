//! Shared secret key material
//!
//! A [`SecretKey`] is loaded once from configuration (hex encoded), validated
//! by the codec that consumes it, and never mutated afterwards. Its `Debug`
//! output carries only the length so keys cannot leak through logs.

use std::fmt;

use crate::error::TokenError;

/// Raw bytes of the secret shared between the issuer and the gateway
///
/// Not `PartialEq`; key material is only compared in constant time.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wraps raw key bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parses a hex-encoded key such as `28169799454fdfb2870d65374a4ed0f2`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if the string is empty or not valid hex.
    pub fn from_hex(encoded: &str) -> Result<Self, TokenError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(TokenError::InvalidKey("key is empty".to_string()));
        }
        hex::decode(encoded)
            .map(Self)
            .map_err(|e| TokenError::InvalidKey(format!("key is not valid hex: {}", e)))
    }

    /// Generates `len` cryptographically random bytes
    pub fn generate(len: usize) -> Self {
        use rand::RngCore as _;

        let mut bytes = vec![0u8; len];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Hex encoding of the key, for writing into configuration
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// Parses a 16-byte initialization vector from hex
///
/// # Errors
///
/// Returns [`TokenError::InvalidKey`] if the value is not 32 hex characters.
pub fn iv_from_hex(encoded: &str) -> Result<[u8; 16], TokenError> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| TokenError::InvalidKey(format!("IV is not valid hex: {}", e)))?;
    <[u8; 16]>::try_from(bytes.as_slice()).map_err(|_| {
        TokenError::InvalidKey(format!("IV must be 16 bytes, got {}", bytes.len()))
    })
}
