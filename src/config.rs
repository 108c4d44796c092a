//! Configuration management for guactoken
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! The shared secret is read once at startup and never written to logs;
//! [`TokenConfig`] has a hand-written `Debug` that redacts it.

use crate::codec::Scheme;
use crate::error::{GuactokenError, Result};
use crate::key::{iv_from_hex, SecretKey};
use crate::payload::Protocol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/guactoken.yaml";

/// Longest token lifetime accepted (one year)
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Main configuration structure for guactoken
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Token scheme and key material
    #[serde(default)]
    pub token: TokenConfig,
    /// Where the gateway lives
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Defaults for the connection placed in issued tokens
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Token scheme and key configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Which codec to use
    #[serde(default)]
    pub scheme: Scheme,

    /// Shared secret, hex encoded. 16 bytes for the encrypted scheme.
    #[serde(default)]
    pub secret_hex: Option<String>,

    /// Fixed CBC initialization vector for the encrypted scheme, hex encoded
    #[serde(default = "default_iv_hex")]
    pub iv_hex: String,

    /// Lifetime of issued tokens (seconds)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_iv_hex() -> String {
    "00000000000000000000000000000000".to_string()
}

fn default_ttl_seconds() -> u64 {
    3600
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            secret_hex: None,
            iv_hex: default_iv_hex(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("scheme", &self.scheme)
            .field(
                "secret_hex",
                &self.secret_hex.as_ref().map(|_| "<redacted>"),
            )
            .field("iv_hex", &self.iv_hex)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Gateway location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Scheme, host and port of the gateway, e.g. `http://guacamole.guac.svc.cluster.local:8080`
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Path the gateway web application is mounted under
    #[serde(default = "default_gateway_path")]
    pub path: String,
}

fn default_gateway_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_gateway_path() -> String {
    "/guacamole".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base_url(),
            path: default_gateway_path(),
        }
    }
}

/// Default connection settings for issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Protocol the gateway speaks to the display
    #[serde(default)]
    pub protocol: Protocol,

    /// Display server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Extra parameters added to every connection (e.g. `color-depth`)
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

fn default_port() -> u16 {
    5900
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            port: default_port(),
            parameters: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GuactokenError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| GuactokenError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(scheme) = std::env::var("GUACTOKEN_SCHEME") {
            match scheme.parse::<Scheme>() {
                Ok(v) => {
                    self.token.scheme = v;
                    tracing::debug!(scheme = %v, "Env override: GUACTOKEN_SCHEME");
                }
                Err(e) => tracing::warn!("Invalid GUACTOKEN_SCHEME: {}", e),
            }
        }

        if let Ok(secret) = std::env::var("GUACTOKEN_SECRET_HEX") {
            self.token.secret_hex = Some(secret);
            tracing::debug!("Env override: GUACTOKEN_SECRET_HEX");
        }

        if let Ok(iv) = std::env::var("GUACTOKEN_IV_HEX") {
            self.token.iv_hex = iv;
            tracing::debug!("Env override: GUACTOKEN_IV_HEX");
        }

        if let Ok(ttl) = std::env::var("GUACTOKEN_TTL_SECONDS") {
            if let Ok(value) = ttl.parse() {
                self.token.ttl_seconds = value;
            } else {
                tracing::warn!("Invalid GUACTOKEN_TTL_SECONDS: {}", ttl);
            }
        }

        if let Ok(base_url) = std::env::var("GUACTOKEN_GATEWAY_URL") {
            self.gateway.base_url = base_url.clone();
            tracing::debug!(base_url = %base_url, "Env override: GUACTOKEN_GATEWAY_URL");
        }

        if let Ok(path) = std::env::var("GUACTOKEN_GATEWAY_PATH") {
            self.gateway.path = path.clone();
            tracing::debug!(path = %path, "Env override: GUACTOKEN_GATEWAY_PATH");
        }

        if let Ok(port) = std::env::var("GUACTOKEN_PORT") {
            if let Ok(value) = port.parse() {
                self.connection.port = value;
            } else {
                tracing::warn!("Invalid GUACTOKEN_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(scheme) = cli.scheme {
            self.token.scheme = scheme;
        }
        if let Some(ttl) = cli.ttl_seconds {
            self.token.ttl_seconds = ttl;
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the key material fits the selected scheme and that the
    /// gateway location and connection defaults are usable.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let secret = self.token.secret_hex.as_deref().ok_or_else(|| {
            GuactokenError::Config(
                "token.secret_hex must be set (or GUACTOKEN_SECRET_HEX)".to_string(),
            )
        })?;
        let key = SecretKey::from_hex(secret)
            .map_err(|e| GuactokenError::Config(format!("token.secret_hex: {}", e)))?;

        if self.token.scheme == Scheme::Encrypted {
            if key.len() != 16 {
                return Err(GuactokenError::Config(format!(
                    "encrypted scheme requires a 16-byte secret, got {} bytes",
                    key.len()
                ))
                .into());
            }
            iv_from_hex(&self.token.iv_hex)
                .map_err(|e| GuactokenError::Config(format!("token.iv_hex: {}", e)))?;
        }

        if self.token.ttl_seconds == 0 {
            return Err(
                GuactokenError::Config("ttl_seconds must be greater than 0".to_string()).into(),
            );
        }
        if self.token.ttl_seconds > MAX_TTL_SECONDS {
            return Err(GuactokenError::Config(format!(
                "ttl_seconds must be at most {}, got {}",
                MAX_TTL_SECONDS, self.token.ttl_seconds
            ))
            .into());
        }

        let base = url::Url::parse(&self.gateway.base_url).map_err(|e| {
            GuactokenError::Config(format!(
                "Invalid gateway.base_url {}: {}",
                self.gateway.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(GuactokenError::Config(format!(
                "gateway.base_url must be http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.connection.port == 0 {
            return Err(
                GuactokenError::Config("connection.port must be greater than 0".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}
