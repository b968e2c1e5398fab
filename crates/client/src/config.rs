//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HF_API_BASE_URL` - Base URL of the hosted backend (auth + documents)
//! - `HF_STORAGE_BASE_URL` - Base URL of the blob storage service
//! - `HF_GEOCODER_BASE_URL` - Base URL of the geocoding service
//! - `HF_PROJECT_ID` - Backend project identifier
//! - `HF_API_KEY` - Backend API key (validated for placeholder/entropy)
//!
//! ## Optional
//! - `HF_GEOCODE_CONCURRENCY` - Bulk geocode worker limit (default: 8)
//! - `HF_GEOCODE_CACHE_TTL_SECS` - Geocode cache TTL (default: 300)

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default worker limit for bulk geocoding.
pub const DEFAULT_GEOCODE_CONCURRENCY: usize = 8;

/// Default TTL for cached geocode results, in seconds.
pub const DEFAULT_GEOCODE_CACHE_TTL_SECS: u64 = 300;

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

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct HiddenForkConfig {
    /// Hosted backend (auth, documents, blobs) configuration.
    pub backend: BackendConfig,
    /// Geocoding service configuration.
    pub geocoder: GeocoderConfig,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL for auth and document endpoints.
    pub api_base_url: String,
    /// Base URL for blob storage endpoints.
    pub storage_base_url: String,
    /// Backend project identifier.
    pub project_id: String,
    /// API key sent with every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_base_url", &self.api_base_url)
            .field("storage_base_url", &self.storage_base_url)
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Geocoding service configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL for the geocoding endpoint.
    pub base_url: String,
    /// Worker limit for bulk geocoding.
    pub concurrency: usize,
    /// TTL for cached geocode results, in seconds.
    pub cache_ttl_secs: u64,
}

impl HiddenForkConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            backend: BackendConfig::from_env()?,
            geocoder: GeocoderConfig::from_env()?,
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: get_required_env("HF_API_BASE_URL")?,
            storage_base_url: get_required_env("HF_STORAGE_BASE_URL")?,
            project_id: get_required_env("HF_PROJECT_ID")?,
            api_key: get_validated_secret("HF_API_KEY")?,
        })
    }
}

impl GeocoderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let concurrency = get_env_or_default(
            "HF_GEOCODE_CONCURRENCY",
            &DEFAULT_GEOCODE_CONCURRENCY.to_string(),
        )
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidEnvVar("HF_GEOCODE_CONCURRENCY".to_string(), e.to_string()))?;
        if concurrency == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HF_GEOCODE_CONCURRENCY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let cache_ttl_secs = get_env_or_default(
            "HF_GEOCODE_CACHE_TTL_SECS",
            &DEFAULT_GEOCODE_CACHE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("HF_GEOCODE_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url: get_required_env("HF_GEOCODER_BASE_URL")?,
            concurrency,
            cache_ttl_secs,
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the backend console."
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
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
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
    fn test_backend_config_debug_redacts_api_key() {
        let config = BackendConfig {
            api_base_url: "https://api.hiddenfork.dev".to_string(),
            storage_base_url: "https://blobs.hiddenfork.dev".to_string(),
            project_id: "hidden-fork-prod".to_string(),
            api_key: SecretString::from("kJ8#mP2$xQ9!vN4@wL7&rT3*"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("hidden-fork-prod"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kJ8#mP2"));
    }
}
