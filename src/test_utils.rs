//! Test utilities for guactoken
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, and assertion helpers.

use crate::config::Config;
use std::fmt::Display;
use std::path::PathBuf;
use tempfile::TempDir;

/// 16-byte key shared by unit tests (hex)
pub const TEST_KEY_HEX: &str = "28169799454fdfb2870d65374a4ed0f2";

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Returns
///
/// Returns the path to the created file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T, E: Display>(result: Result<T, E>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a valid test configuration using [`TEST_KEY_HEX`]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.token.secret_hex = Some(TEST_KEY_HEX.to_string());
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    format!(
        r#"
token:
  scheme: encrypted
  secret_hex: "{TEST_KEY_HEX}"
  iv_hex: "00000000000000000000000000000000"
  ttl_seconds: 3600

gateway:
  base_url: http://guacamole.guac.svc.cluster.local:8080
  path: /guacamole

connection:
  protocol: vnc
  port: 5900
  parameters:
    color-depth: "24"
    enable-audio: "false"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuactokenError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), GuactokenError> =
            Err(GuactokenError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), GuactokenError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        assert!(yaml.contains("token:"));
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.connection.parameters.len(), 2);
    }
}
