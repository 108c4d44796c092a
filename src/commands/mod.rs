/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `issue`  — Issue a token and print the gateway URL
- `verify` — Verify a token with the configured key
- `keygen` — Generate a shared secret

These handlers are intentionally small and use the library components:
the codecs, the issuer, and the configuration.
*/

use crate::codec::{Codec, TokenCodec};
use crate::config::Config;
use crate::error::{GuactokenError, Result, Unauthorized};
use crate::issuer::{IssueRequest, TokenIssuer};
use crate::key::SecretKey;

/// Builds the codec selected by a validated configuration
fn build_codec(config: &Config) -> Result<Codec> {
    Codec::from_config(&config.token)
        .map_err(|e| GuactokenError::Config(format!("Cannot build token codec: {}", e)).into())
}

// Issue command handler
pub mod issue {
    //! Issues a token for one display session.

    use super::*;
    use crate::payload::Protocol;

    /// Options for `guactoken issue`
    #[derive(Debug, Clone, Default)]
    pub struct IssueArgs {
        pub name: String,
        pub hostname: Option<String>,
        pub port: Option<u16>,
        pub protocol: Option<Protocol>,
        pub params: Vec<(String, String)>,
        pub json: bool,
    }

    /// Issue a token and return the text to print
    ///
    /// Prints the bare URL, or the whole issued token as pretty JSON when
    /// `args.json` is set.
    pub fn render(config: &Config, args: IssueArgs) -> Result<String> {
        let issuer = TokenIssuer::new(build_codec(config)?, config)?;

        let request = IssueRequest {
            name: args.name,
            hostname: args.hostname,
            port: args.port,
            protocol: args.protocol,
            parameters: args.params.into_iter().collect(),
        };
        let issued = issuer.issue(&request).map_err(GuactokenError::from)?;

        if args.json {
            Ok(serde_json::to_string_pretty(&issued)?)
        } else {
            Ok(issued.url)
        }
    }

    /// Run `guactoken issue`
    pub fn run_issue(config: &Config, args: IssueArgs) -> Result<()> {
        let output = render(config, args)?;
        println!("{}", output);
        Ok(())
    }
}

// Verify command handler
pub mod verify {
    //! Verifies a token the way a gateway would.
    //!
    //! The caller only ever learns "valid" or "unauthorized"; the specific
    //! failure is logged at debug level.

    use super::*;

    /// Verify `token` and return the payload as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns [`Unauthorized`] for every rejected token, regardless of
    /// which check failed.
    pub fn render(config: &Config, token: &str) -> Result<String> {
        let codec = build_codec(config)?;
        let payload = codec.decode(token.trim()).map_err(Unauthorized::from)?;
        tracing::info!(username = %payload.username, "Token verified");
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Run `guactoken verify`
    pub fn run_verify(config: &Config, token: &str) -> Result<()> {
        let output = render(config, token)?;
        println!("{}", output);
        Ok(())
    }
}

// Keygen command handler
pub mod keygen {
    //! Generates a random shared secret.

    use super::*;

    /// Largest key `keygen` will produce, in bytes
    pub const MAX_KEY_BYTES: usize = 1024;

    /// Generate a key of `bytes` random bytes, hex encoded
    pub fn render(bytes: usize) -> Result<String> {
        if bytes == 0 || bytes > MAX_KEY_BYTES {
            return Err(GuactokenError::InvalidArgument(format!(
                "key length must be between 1 and {} bytes, got {}",
                MAX_KEY_BYTES, bytes
            ))
            .into());
        }
        Ok(SecretKey::generate(bytes).to_hex())
    }

    /// Run `guactoken keygen`
    pub fn run_keygen(bytes: usize) -> Result<()> {
        let output = render(bytes)?;
        println!("{}", output);
        Ok(())
    }
}
