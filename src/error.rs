//! Error types for guactoken
//!
//! This module defines the error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.
//!
//! Two layers exist:
//!
//! - [`TokenError`] is returned by the codecs. Every kind is distinct so
//!   issuers and tests can match on it.
//! - [`GuactokenError`] covers the application around the codecs
//!   (configuration, files, CLI output).
//!
//! Verifiers must never tell the caller *which* decode check failed.
//! [`Unauthorized`] is the single rejection value for that purpose.

use thiserror::Error;

/// Errors produced while encoding or decoding a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The payload could not be turned into bytes (invalid payload shape)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The token string is structurally invalid (encoding, length, segments)
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Block-cipher padding was invalid after decryption
    #[error("Invalid padding")]
    PaddingError,

    /// The MAC or signature did not match the shared key
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// The authenticated payload could not be parsed
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The payload's expiry is at or before the verification instant
    #[error("Token expired at {expires}")]
    Expired {
        /// Expiry value carried by the token, in the codec's unit
        expires: i64,
    },

    /// Key material has the wrong length or encoding for the codec
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl TokenError {
    /// Returns true for kinds that mean "this untrusted token is rejected"
    ///
    /// Encoding failures and key errors are programmer or deployment
    /// errors, not rejections.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::MalformedToken(_)
                | TokenError::PaddingError
                | TokenError::SignatureMismatch
                | TokenError::MalformedPayload(_)
                | TokenError::Expired { .. }
        )
    }
}

/// Generic rejection surfaced to callers of a verifier
///
/// Collapses every [`TokenError`] into one opaque outcome so a caller
/// cannot distinguish padding failures from signature failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unauthorized")]
pub struct Unauthorized;

impl From<TokenError> for Unauthorized {
    fn from(err: TokenError) -> Self {
        tracing::debug!(kind = %err, "Token rejected");
        Unauthorized
    }
}

/// Main error type for guactoken application operations
#[derive(Error, Debug)]
pub enum GuactokenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Token codec errors
    #[error(transparent)]
    Token(#[from] TokenError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for guactoken application operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
