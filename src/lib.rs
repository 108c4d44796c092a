//! guactoken - remote-desktop gateway token library
//!
//! This library issues opaque, self-contained authorization tokens that let
//! a Guacamole-style web gateway grant a caller access to backend display
//! sessions without any server-side session store.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `payload`: The authorization claim (username, expiry, connections)
//! - `serializer`: Canonical JSON used as MAC/signature input
//! - `key`: Shared secret key material
//! - `codec`: The `encrypted` and `signed` token schemes
//! - `issuer`: Builds payloads for sessions and embeds tokens in gateway URLs
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use guactoken::codec::Codec;
//! use guactoken::issuer::{IssueRequest, TokenIssuer};
//! use guactoken::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/guactoken.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let issuer = TokenIssuer::new(Codec::from_config(&config.token)?, &config)?;
//!     let issued = issuer.issue(&IssueRequest::new("alice"))?;
//!     println!("{}", issued.url);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod payload;
pub mod serializer;

// Re-export commonly used types
pub use codec::{Codec, EncryptedCodec, Scheme, SignedCodec, TokenCodec};
pub use config::Config;
pub use error::{GuactokenError, Result, TokenError, Unauthorized};
pub use issuer::{IssueRequest, IssuedToken, TokenIssuer};
pub use key::SecretKey;
pub use payload::{AuthorizationPayload, ConnectionSpec, ExpiryUnit, Protocol};

#[cfg(test)]
pub mod test_utils;
