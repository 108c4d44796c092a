//! Sign-then-encrypt tokens
//!
//! Wire format: `base64(AES-128-CBC(key, iv, PKCS7(hmac ‖ json)))` where
//! `hmac = HMAC-SHA256(key, json)` and `json` is the canonical payload.
//! The same 16-byte key is used for the MAC and the cipher.
//!
//! The IV is fixed per deployment (all-zero for the reference gateway).
//! Identical payload prefixes therefore produce identical ciphertext
//! prefixes; the fixed IV is kept only because the gateway decrypts with it.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};

use super::{
    check_expiry, constant_time_equal, hmac_sha256, Scheme, TokenCodec, MAC_LEN, MAX_TOKEN_LEN,
};
use crate::error::TokenError;
use crate::key::SecretKey;
use crate::payload::{AuthorizationPayload, ExpiryUnit};
use crate::serializer;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Key length required by AES-128
pub const KEY_LEN: usize = 16;

/// AES block size, also the IV length
pub const BLOCK_LEN: usize = 16;

/// The initialization vector the reference gateway decrypts with
pub const ZERO_IV: [u8; BLOCK_LEN] = [0u8; BLOCK_LEN];

/// Codec for the `encrypted` scheme
#[derive(Debug, Clone)]
pub struct EncryptedCodec {
    key: SecretKey,
    iv: [u8; BLOCK_LEN],
}

impl EncryptedCodec {
    /// Creates a codec with an explicit IV agreed with the gateway
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] unless `key` is exactly 16 bytes.
    pub fn new(key: SecretKey, iv: [u8; BLOCK_LEN]) -> Result<Self, TokenError> {
        if key.len() != KEY_LEN {
            return Err(TokenError::InvalidKey(format!(
                "encrypted scheme requires a {}-byte key, got {}",
                KEY_LEN,
                key.len()
            )));
        }
        Ok(Self { key, iv })
    }

    /// Creates a codec using [`ZERO_IV`]
    pub fn with_zero_iv(key: SecretKey) -> Result<Self, TokenError> {
        Self::new(key, ZERO_IV)
    }

    fn encryptor(&self) -> Result<Aes128CbcEnc, TokenError> {
        Aes128CbcEnc::new_from_slices(self.key.as_bytes(), &self.iv)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))
    }

    fn decryptor(&self) -> Result<Aes128CbcDec, TokenError> {
        Aes128CbcDec::new_from_slices(self.key.as_bytes(), &self.iv)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))
    }
}

impl TokenCodec for EncryptedCodec {
    fn scheme(&self) -> Scheme {
        Scheme::Encrypted
    }

    fn expiry_unit(&self) -> ExpiryUnit {
        ExpiryUnit::Milliseconds
    }

    fn encode(&self, payload: &AuthorizationPayload) -> Result<String, TokenError> {
        payload.validate()?;
        let plaintext = serializer::to_canonical_bytes(payload)?;
        let mac = hmac_sha256(&self.key, &[&plaintext])?;

        let mut signed = Vec::with_capacity(MAC_LEN + plaintext.len());
        signed.extend_from_slice(&mac);
        signed.extend_from_slice(&plaintext);

        let ciphertext = self.encryptor()?.encrypt_padded_vec_mut::<Pkcs7>(&signed);
        Ok(general_purpose::STANDARD.encode(ciphertext))
    }

    fn decode_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationPayload, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::MalformedToken("token too long".to_string()));
        }

        let ciphertext = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|e| TokenError::MalformedToken(e.to_string()))?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(TokenError::MalformedToken(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_LEN
            )));
        }

        let signed = self
            .decryptor()?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| TokenError::PaddingError)?;

        // Too short to carry a MAC: nothing here can be authenticated.
        if signed.len() < MAC_LEN {
            return Err(TokenError::SignatureMismatch);
        }
        let (mac, plaintext) = signed.split_at(MAC_LEN);

        let expected = hmac_sha256(&self.key, &[plaintext])?;
        if !constant_time_equal(mac, &expected) {
            return Err(TokenError::SignatureMismatch);
        }

        let payload: AuthorizationPayload = serializer::from_slice(plaintext)?;
        check_expiry(payload, self.expiry_unit(), now)
    }
}
