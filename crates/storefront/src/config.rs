//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ECOFINDS_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `ECOFINDS_HOST` - Bind address (default: 127.0.0.1)
//! - `ECOFINDS_PORT` - Listen port (default: 3000)
//! - `ECOFINDS_STORAGE` - `file` or `memory` (default: file)
//! - `ECOFINDS_DATA_DIR` - Directory for JSON blobs (default: data)
//! - `ECOFINDS_KEY_PREFIX` - Storage key prefix (default: ecofinds)
//! - `ECOFINDS_DEMO_PASSWORD` - Password every account signs in with (default: password)
//! - `ECOFINDS_LOGIN_DELAY_MS` - Artificial delay on login and signup (default: 500)
//! - `ECOFINDS_SEED_DEMO_DATA` - Seed demo users and listings on startup (default: true)
//! - `ECOFINDS_AUTH_RATE_LIMIT` - Rate limit `/auth` endpoints (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::storage::StorageKeys;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Where marketplace state is persisted
    pub storage: StorageConfig,
    /// Demo sign-in settings
    pub auth: AuthConfig,
    /// Seed demo data into empty storage on startup
    pub seed_demo_data: bool,
    /// Apply the governor rate limiter to `/auth`
    pub auth_rate_limit: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Which key-value backend holds the JSON blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// One file per key under [`StorageConfig::data_dir`].
    File,
    /// Process memory; everything is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'file' or 'memory', got '{other}'")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub keys: StorageKeys,
}

/// Demo authentication settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AuthConfig {
    /// The literal every account signs in with
    pub demo_password: SecretString,
    /// Simulated network latency on login and signup
    pub login_delay: Duration,
}

impl AuthConfig {
    pub const DEFAULT_DEMO_PASSWORD: &'static str = "password";
    pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(500);
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            demo_password: SecretString::from(Self::DEFAULT_DEMO_PASSWORD),
            login_delay: Self::DEFAULT_LOGIN_DELAY,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("demo_password", &"[REDACTED]")
            .field("login_delay", &self.login_delay)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or("ECOFINDS_HOST", "127.0.0.1")?;
        let port = env.parse_or("ECOFINDS_PORT", "3000")?;
        let base_url = env.required("ECOFINDS_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ECOFINDS_BASE_URL".to_string(), e.to_string())
        })?;

        let prefix = env.or_default("ECOFINDS_KEY_PREFIX", StorageKeys::DEFAULT_PREFIX);
        let keys = StorageKeys::new(&prefix).map_err(|e| {
            ConfigError::InvalidEnvVar("ECOFINDS_KEY_PREFIX".to_string(), e.to_string())
        })?;
        let storage = StorageConfig {
            backend: env.parse_or("ECOFINDS_STORAGE", "file")?,
            data_dir: PathBuf::from(env.or_default("ECOFINDS_DATA_DIR", "data")),
            keys,
        };

        let auth = AuthConfig {
            demo_password: SecretString::from(
                env.or_default("ECOFINDS_DEMO_PASSWORD", AuthConfig::DEFAULT_DEMO_PASSWORD),
            ),
            login_delay: Duration::from_millis(env.parse_or("ECOFINDS_LOGIN_DELAY_MS", "500")?),
        };

        Ok(Self {
            host,
            port,
            base_url,
            storage,
            auth,
            seed_demo_data: env.parse_or("ECOFINDS_SEED_DEMO_DATA", "true")?,
            auth_rate_limit: env.parse_or("ECOFINDS_AUTH_RATE_LIMIT", "true")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable. Blank values count as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ECOFINDS_BASE_URL", "http://localhost:3000")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage.keys.users(), "ecofinds_users");
        assert_eq!(config.auth.demo_password.expose_secret(), "password");
        assert_eq!(config.auth.login_delay, Duration::from_millis(500));
        assert!(config.seed_demo_data);
        assert!(config.auth_rate_limit);
        assert!(!config.is_https());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "ECOFINDS_BASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ECOFINDS_BASE_URL", "https://ecofinds.example"),
            ("ECOFINDS_PORT", "8080"),
            ("ECOFINDS_STORAGE", "Memory"),
            ("ECOFINDS_KEY_PREFIX", "evoswap"),
            ("ECOFINDS_LOGIN_DELAY_MS", "0"),
            ("ECOFINDS_SEED_DEMO_DATA", "false"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.keys.products(), "evoswap_products");
        assert_eq!(config.auth.login_delay, Duration::ZERO);
        assert!(!config.seed_demo_data);
        assert!(config.is_https());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[
            ("ECOFINDS_BASE_URL", "http://localhost:3000"),
            ("ECOFINDS_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ECOFINDS_PORT"));

        let err = load(&[
            ("ECOFINDS_BASE_URL", "http://localhost:3000"),
            ("ECOFINDS_KEY_PREFIX", "../up"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ECOFINDS_KEY_PREFIX"));

        assert!(load(&[("ECOFINDS_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_auth_config_debug_redacts_password() {
        let config = AuthConfig {
            demo_password: SecretString::from("super_secret_demo"),
            login_delay: Duration::ZERO,
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_demo"));
    }
}
