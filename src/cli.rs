//! Command-line interface definition for guactoken
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for issuing and verifying tokens and generating keys.

use clap::{Parser, Subcommand};

use crate::codec::Scheme;
use crate::config::DEFAULT_CONFIG_PATH;
use crate::payload::Protocol;

/// guactoken - remote-desktop gateway token issuer
///
/// Issues self-contained authorization tokens for a Guacamole-style
/// gateway and embeds them in a ready-to-open URL.
#[derive(Parser, Debug, Clone)]
#[command(name = "guactoken")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the token scheme from config (encrypted, signed)
    #[arg(long, global = true)]
    pub scheme: Option<Scheme>,

    /// Override the token lifetime from config (seconds)
    #[arg(long, global = true)]
    pub ttl_seconds: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for guactoken
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Issue a token for a display session and print its gateway URL
    Issue {
        /// Session name; becomes the username and the connection suffix
        #[arg(short, long)]
        name: String,

        /// Display host (defaults to the session's service name, svc-gui-<name>)
        #[arg(long)]
        hostname: Option<String>,

        /// Display port (defaults to connection.port from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Connection protocol (vnc, rdp, ssh, telnet, kubernetes)
        #[arg(long)]
        protocol: Option<Protocol>,

        /// Extra connection parameter as key=value; may be repeated
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Print the issued token as JSON instead of the bare URL
        #[arg(long)]
        json: bool,
    },

    /// Verify a token with the configured key and print its payload
    Verify {
        /// Token string to verify
        token: String,
    },

    /// Generate a random shared secret and print it as hex
    Keygen {
        /// Key length in bytes (16 for the encrypted scheme)
        #[arg(short, long, default_value_t = 16)]
        bytes: usize,
    },
}

/// Parses a `key=value` connection parameter
fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in `{}`", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some(DEFAULT_CONFIG_PATH.to_string()),
            verbose: false,
            scheme: None,
            ttl_seconds: None,
            command: Commands::Keygen { bytes: 16 },
        }
    }
}
