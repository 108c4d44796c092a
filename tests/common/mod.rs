use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use guactoken::payload::{AuthorizationPayload, ConnectionSpec, Protocol};
use guactoken::SecretKey;
use tempfile::TempDir;

/// 16-byte key from the reference gateway setup
#[allow(dead_code)]
pub const KEY_HEX: &str = "28169799454fdfb2870d65374a4ed0f2";

#[allow(dead_code)]
pub fn key() -> SecretKey {
    SecretKey::from_hex(KEY_HEX).expect("valid test key")
}

#[allow(dead_code)]
pub fn other_key() -> SecretKey {
    SecretKey::from_hex("00112233445566778899aabbccddeeff").expect("valid test key")
}

/// Fixed verification instant so expiry arithmetic is reproducible
#[allow(dead_code)]
pub fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// `alice` with one VNC display `d1` at `h:5900`
#[allow(dead_code)]
pub fn alice(expires: i64) -> AuthorizationPayload {
    AuthorizationPayload::new("alice", expires).with_connection(
        "d1",
        ConnectionSpec::new(Protocol::Vnc)
            .with_parameter("hostname", "h")
            .with_parameter("port", "5900"),
    )
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("guactoken.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
