//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Authentication configuration
///
/// `bypass` disables the session gate entirely. `test_tokens` makes the
/// verifier accept every credential as self-signed; the verifier also
/// falls back to self-signed when no `issuer` is configured. All three
/// are fixed at startup and injected into the gate and verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Skip the session gate entirely
    #[serde(default)]
    pub bypass: bool,
    /// Treat every credential as self-signed (test environments)
    #[serde(default)]
    pub test_tokens: bool,
    /// Trusted token issuer; unset means self-signed credentials only
    #[serde(default)]
    pub issuer: Option<String>,
    /// Key-set cache TTL in seconds
    #[serde(default = "default_jwks_ttl_secs")]
    pub jwks_ttl_secs: u64,
    /// Identity provider backing the auth routes
    #[serde(default = "default_identity_provider")]
    pub provider: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_db_path() -> String {
    "./data/lenaclav.db".to_string()
}

fn default_jwks_ttl_secs() -> u64 {
    600
}

fn default_identity_provider() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: default_bind_address(),
                port: default_port(),
            },
            database: DatabaseConfig {
                path: default_db_path(),
            },
            auth: AuthConfig {
                bypass: false,
                test_tokens: false,
                issuer: None,
                jwks_ttl_secs: default_jwks_ttl_secs(),
                provider: default_identity_provider(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.auth.provider, "local");
        assert!(!config.auth.bypass);
        assert!(config.auth.issuer.is_none());
        assert_eq!(config.auth.jwks_ttl_secs, 600);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 8787);
    }

    #[test]
    fn test_parse_overrides() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [database]
            path = "/tmp/test.db"

            [auth]
            test_tokens = true
            issuer = "https://issuer.example/pool"
            jwks_ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.database.path, "/tmp/test.db");
        assert!(config.auth.test_tokens);
        assert_eq!(
            config.auth.issuer.as_deref(),
            Some("https://issuer.example/pool")
        );
        assert_eq!(config.auth.jwks_ttl_secs, 60);
        assert_eq!(config.logging.level, "info");
    }
}
