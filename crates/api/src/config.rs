//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `ORCHARD_JWT_SECRET` - JWT signing secret (min 32 chars, high entropy)
//! - `ORCHARD_BLOB_STORE_URL` - Base URL the upload service PUTs product
//!   images to
//!
//! ## Optional
//! - `ORCHARD_HOST` - Bind address (default: 127.0.0.1)
//! - `ORCHARD_PORT` - Listen port (default: 3000)
//! - `ORCHARD_JWT_TTL_SECS` - Token lifetime in seconds (default: 3600)
//! - `ORCHARD_BLOB_PUBLIC_URL` - Base URL for serving uploaded images
//!   (default: the blob store URL)
//! - `ORCHARD_BLOB_STORE_TOKEN` - Bearer token for the blob store
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens, in seconds
    pub jwt_ttl_secs: u64,
    /// Blob store configuration for product images
    pub blob_store: BlobStoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Blob store configuration for product image uploads.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct BlobStoreConfig {
    /// Base URL uploads are PUT to
    pub store_url: url::Url,
    /// Base URL uploaded objects are served from
    pub public_url: url::Url,
    /// Optional bearer token for the store
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for BlobStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStoreConfig")
            .field("store_url", &self.store_url.as_str())
            .field("public_url", &self.public_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORCHARD_DATABASE_URL")?;
        let host = get_env_or_default("ORCHARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORCHARD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ORCHARD_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORCHARD_PORT".to_string(), e.to_string()))?;

        let jwt_secret = get_validated_secret("ORCHARD_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "ORCHARD_JWT_SECRET")?;
        let jwt_ttl_secs = get_env_or_default("ORCHARD_JWT_TTL_SECS", "3600")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORCHARD_JWT_TTL_SECS".to_string(), e.to_string())
            })?;

        let blob_store = BlobStoreConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_secs,
            blob_store,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BlobStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_url = parse_url_env("ORCHARD_BLOB_STORE_URL")?;
        let public_url = match get_optional_env("ORCHARD_BLOB_PUBLIC_URL") {
            Some(_) => parse_url_env("ORCHARD_BLOB_PUBLIC_URL")?,
            None => store_url.clone(),
        };
        let token = get_optional_env("ORCHARD_BLOB_STORE_TOKEN").map(SecretString::from);

        Ok(Self {
            store_url,
            public_url,
            token,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable parsed as a URL.
fn parse_url_env(key: &str) -> Result<url::Url, ConfigError> {
    let raw = get_required_env(key)?;
    url::Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_secret_length(&secret, "TEST_JWT").is_err());
    }

    #[test]
    fn test_validate_secret_length_ok() {
        let secret = SecretString::from("x".repeat(32));
        assert!(validate_secret_length(&secret, "TEST_JWT").is_ok());
    }

    #[test]
    fn test_blob_store_debug_redacts_token() {
        let config = BlobStoreConfig {
            store_url: url::Url::parse("https://blobs.internal/orchard").unwrap(),
            public_url: url::Url::parse("https://cdn.orchard.example").unwrap(),
            token: Some(SecretString::from("super_secret_store_token")),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("blobs.internal"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_store_token"));
    }
}
