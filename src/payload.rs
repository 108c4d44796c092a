//! Authorization payload model
//!
//! The payload is the claim carried inside a token: who the caller is, when
//! the grant ends, and which display connections the gateway should expose.
//! Field names match what the gateway expects on the wire (`username`,
//! `expires`, `connections`, `protocol`, `parameters`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Transport protocol the gateway uses to reach a connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Vnc,
    Rdp,
    Ssh,
    Telnet,
    Kubernetes,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Vnc => "vnc",
            Protocol::Rdp => "rdp",
            Protocol::Ssh => "ssh",
            Protocol::Telnet => "telnet",
            Protocol::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vnc" => Ok(Protocol::Vnc),
            "rdp" => Ok(Protocol::Rdp),
            "ssh" => Ok(Protocol::Ssh),
            "telnet" => Ok(Protocol::Telnet),
            "kubernetes" => Ok(Protocol::Kubernetes),
            other => Err(format!(
                "Unknown protocol: {}. Must be one of: vnc, rdp, ssh, telnet, kubernetes",
                other
            )),
        }
    }
}

/// One backend connection the token grants access to
///
/// `parameters` is passed through to the gateway untouched; its key set
/// depends on the protocol (`hostname`, `port`, `password`, `color-depth`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConnectionSpec {
    pub protocol: Protocol,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl ConnectionSpec {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            parameters: BTreeMap::new(),
        }
    }

    /// Adds or replaces a connection parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// The structured claim carried by a token
///
/// `expires` is an absolute instant whose unit is fixed by the codec that
/// encodes it (see [`ExpiryUnit`]). The codec does not require it to be in
/// the future; only verification checks it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationPayload {
    pub username: String,
    pub expires: i64,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionSpec>,
}

impl AuthorizationPayload {
    pub fn new(username: impl Into<String>, expires: i64) -> Self {
        Self {
            username: username.into(),
            expires,
            connections: BTreeMap::new(),
        }
    }

    /// Adds or replaces a named connection
    pub fn with_connection(mut self, name: impl Into<String>, spec: ConnectionSpec) -> Self {
        self.connections.insert(name.into(), spec);
        self
    }

    /// Checks the payload shape before it is encoded
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Serialization`] when `username` is empty or a
    /// connection name is empty.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.username.trim().is_empty() {
            return Err(TokenError::Serialization(
                "username cannot be empty".to_string(),
            ));
        }
        if self.connections.keys().any(|name| name.is_empty()) {
            return Err(TokenError::Serialization(
                "connection names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unit of the integer `expires` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUnit {
    Milliseconds,
    Seconds,
}

impl ExpiryUnit {
    /// Integer representation of `instant` in this unit
    pub fn from_instant(&self, instant: DateTime<Utc>) -> i64 {
        match self {
            ExpiryUnit::Milliseconds => instant.timestamp_millis(),
            ExpiryUnit::Seconds => instant.timestamp(),
        }
    }

    /// True when `expires` is at or before `now`
    pub fn is_expired(&self, expires: i64, now: DateTime<Utc>) -> bool {
        expires <= self.from_instant(now)
    }
}
