//! Canonical JSON serializer
//!
//! MAC and signature input must be byte-stable between issuer and verifier.
//! The canonical form used here is compact JSON (no insignificant
//! whitespace) with every object's keys sorted by byte value at every
//! nesting level. Values are routed through [`serde_json::Value`], whose map
//! type is ordered, so the result does not depend on struct field order or
//! map iteration order.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TokenError;

/// Serializes `value` into canonical JSON bytes
///
/// # Errors
///
/// Returns [`TokenError::Serialization`] if `value` cannot be represented
/// as JSON (for example a map with non-string keys).
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, TokenError> {
    let tree = serde_json::to_value(value).map_err(|e| TokenError::Serialization(e.to_string()))?;
    serde_json::to_vec(&tree).map_err(|e| TokenError::Serialization(e.to_string()))
}

/// Parses JSON bytes produced by [`to_canonical_bytes`] (or any JSON encoder)
///
/// # Errors
///
/// Returns [`TokenError::MalformedPayload`] on invalid JSON or shape mismatch.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TokenError> {
    serde_json::from_slice(bytes).map_err(|e| TokenError::MalformedPayload(e.to_string()))
}
