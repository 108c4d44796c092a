//! Token issuance
//!
//! The issuer turns "give this session a display" into a payload, encodes it
//! with the configured codec, and embeds the token in the URL the caller
//! opens. Provisioning the display workload itself happens elsewhere; the
//! issuer only needs the hostname and port that workload is reachable on.
//! By default the hostname is the per-session service name `svc-gui-<name>`.
//!
//! URL forms:
//!
//! - `signed`: `{base}{path}/#/?token=<token>` (base64url needs no escaping)
//! - `encrypted`: `{base}{path}/?data=<percent-encoded token>`

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use url::Url;

use crate::codec::{Codec, Scheme, TokenCodec};
use crate::config::{Config, ConnectionConfig};
use crate::error::{GuactokenError, Result, TokenError};
use crate::payload::{AuthorizationPayload, ConnectionSpec, Protocol};

/// What the caller asks a token for
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    /// Session name; lowercased to form the username
    pub name: String,
    /// Display host; defaults to [`service_name`] of the session
    pub hostname: Option<String>,
    /// Display port; defaults to the configured connection port
    pub port: Option<u16>,
    /// Protocol; defaults to the configured connection protocol
    pub protocol: Option<Protocol>,
    /// Extra parameters, applied over the configured defaults
    pub parameters: BTreeMap<String, String>,
}

impl IssueRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// An issued token and where to use it
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub url: String,
    pub scheme: Scheme,
    pub username: String,
    pub connection: String,
    /// Expiry in the scheme's unit (ms for encrypted, s for signed)
    pub expires: i64,
}

/// Service name the provisioning layer gives a session's display
pub fn service_name(name: &str) -> String {
    format!("svc-gui-{}", name)
}

/// Connection name used inside the payload for a session
pub fn connection_name(name: &str) -> String {
    format!("conn-{}", name)
}

/// Issues tokens with a fixed codec and configuration
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: Codec,
    gateway: Url,
    ttl: Duration,
    defaults: ConnectionConfig,
}

impl TokenIssuer {
    /// Creates an issuer from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway URL does not parse or the TTL does
    /// not fit a duration.
    pub fn new(codec: Codec, config: &Config) -> Result<Self> {
        let mut gateway = Url::parse(&config.gateway.base_url).map_err(|e| {
            GuactokenError::Config(format!(
                "Invalid gateway.base_url {}: {}",
                config.gateway.base_url, e
            ))
        })?;
        let path = format!("{}/", config.gateway.path.trim_end_matches('/'));
        gateway.set_path(&path);

        let ttl_seconds = i64::try_from(config.token.ttl_seconds).map_err(|_| {
            GuactokenError::Config(format!(
                "ttl_seconds too large: {}",
                config.token.ttl_seconds
            ))
        })?;
        let ttl = Duration::try_seconds(ttl_seconds).ok_or_else(|| {
            GuactokenError::Config(format!("ttl_seconds too large: {}", ttl_seconds))
        })?;

        Ok(Self {
            codec,
            gateway,
            ttl,
            defaults: config.connection.clone(),
        })
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Issues a token that expires `ttl` after the wall clock
    pub fn issue(&self, request: &IssueRequest) -> std::result::Result<IssuedToken, TokenError> {
        self.issue_at(request, Utc::now())
    }

    /// Issues a token that expires `ttl` after `now`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Serialization`] if the session name is empty or
    /// the expiry falls outside the representable date range.
    pub fn issue_at(
        &self,
        request: &IssueRequest,
        now: DateTime<Utc>,
    ) -> std::result::Result<IssuedToken, TokenError> {
        let payload = self.build_payload(request, now)?;
        let connection = connection_name(&payload.username);
        let token = self.codec.encode(&payload)?;
        let url = self.url_for(&token);

        tracing::info!(
            username = %payload.username,
            connection = %connection,
            scheme = %self.codec.scheme(),
            "Issued gateway token"
        );

        Ok(IssuedToken {
            token,
            url,
            scheme: self.codec.scheme(),
            username: payload.username,
            connection,
            expires: payload.expires,
        })
    }

    /// Builds the payload for `request` without encoding it
    pub fn build_payload(
        &self,
        request: &IssueRequest,
        now: DateTime<Utc>,
    ) -> std::result::Result<AuthorizationPayload, TokenError> {
        let name = request.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(TokenError::Serialization(
                "session name cannot be empty".to_string(),
            ));
        }

        let hostname = request
            .hostname
            .clone()
            .unwrap_or_else(|| service_name(&name));
        let port = request.port.unwrap_or(self.defaults.port);
        let protocol = request.protocol.unwrap_or(self.defaults.protocol);

        let mut spec = ConnectionSpec::new(protocol);
        spec.parameters = self.defaults.parameters.clone();
        spec.parameters.extend(request.parameters.clone());
        let spec = spec
            .with_parameter("hostname", hostname)
            .with_parameter("port", port.to_string());

        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            TokenError::Serialization(format!(
                "expiry out of range: {} + {}s",
                now,
                self.ttl.num_seconds()
            ))
        })?;
        let expires = self.codec.expiry_unit().from_instant(expires_at);
        let connection = connection_name(&name);
        Ok(AuthorizationPayload::new(name, expires).with_connection(connection, spec))
    }

    /// Gateway URL carrying `token`
    pub fn url_for(&self, token: &str) -> String {
        let mut url = self.gateway.clone();
        match self.codec.scheme() {
            Scheme::Signed => {
                url.set_fragment(Some(&format!("/?token={}", token)));
            }
            Scheme::Encrypted => {
                url.query_pairs_mut().append_pair("data", token);
            }
        }
        url.to_string()
    }
}
