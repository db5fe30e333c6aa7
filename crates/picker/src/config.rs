//! Picker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_API_KEY` - Static API key sent in the `x-api-key` header
//!
//! ## Optional
//! - `CATALOG_ENDPOINT` - Product search URL (default: `http://stageapi.monkcommerce.app/task/products/search`)
//! - `PICKER_QUERY` - Search text for the initial fetch (default: empty)
//! - `PICKER_PAGE` - Page number, 1-based (default: 1)
//! - `PICKER_LIMIT` - Products per page (default: 10)
//! - `PICKER_SEARCH_MODE` - `refetch` or `clear` (default: refetch)
//! - `PICKER_SEARCH_DEBOUNCE_MS` - Delay before a search edit refetches (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::search::SearchPolicy;

const DEFAULT_ENDPOINT: &str = "http://stageapi.monkcommerce.app/task/products/search";
const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "shared via email",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Full configuration for a picker front end.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Catalog endpoint configuration
    pub catalog: CatalogConfig,
    /// Options applied to every picker opened
    pub picker: PickerOptions,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog endpoint configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Product search endpoint
    pub endpoint: Url,
    /// Static API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Per-picker options: what the first fetch asks for and how search edits
/// behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    /// Search text for the initial fetch
    pub initial_query: String,
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Reaction to search text edits
    pub search: SearchPolicy,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            initial_query: String::new(),
            page: 1,
            limit: 10,
            search: SearchPolicy::Refetch {
                debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let catalog = CatalogConfig {
            endpoint: env
                .or_default("CATALOG_ENDPOINT", DEFAULT_ENDPOINT)
                .parse::<Url>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_ENDPOINT".to_string(), e.to_string())
                })?,
            api_key: env.validated_secret("CATALOG_API_KEY")?,
        };

        let search = match env.or_default("PICKER_SEARCH_MODE", "refetch").as_str() {
            "refetch" => SearchPolicy::Refetch {
                debounce: Duration::from_millis(env.parsed(
                    "PICKER_SEARCH_DEBOUNCE_MS",
                    DEFAULT_DEBOUNCE_MS,
                )?),
            },
            "clear" => SearchPolicy::ClearOnly,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PICKER_SEARCH_MODE".to_string(),
                    format!("expected 'refetch' or 'clear', got '{other}'"),
                ));
            }
        };

        let picker = PickerOptions {
            initial_query: env.or_default("PICKER_QUERY", ""),
            page: env.positive("PICKER_PAGE", 1)?,
            limit: env.positive("PICKER_LIMIT", 10)?,
            search,
        };

        Ok(Self {
            catalog,
            picker,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a variable that must be at least 1.
    fn positive(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        let value = self.parsed(key, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(value)
    }

    /// Load a secret and reject obvious placeholders.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_not_placeholder(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Validate that a secret is not a placeholder value.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CATALOG_API_KEY", "k3y-9f8e7d")]).unwrap();
        assert_eq!(config.catalog.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.catalog.api_key.expose_secret(), "k3y-9f8e7d");
        assert_eq!(config.picker, PickerOptions::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_key() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "CATALOG_API_KEY"));
    }

    #[test]
    fn test_placeholder_api_key_rejected() {
        let err = load(&[("CATALOG_API_KEY", "shared via email")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        let err = load(&[("CATALOG_API_KEY", "your-api-key-here")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_picker_overrides() {
        let config = load(&[
            ("CATALOG_API_KEY", "k3y-9f8e7d"),
            ("CATALOG_ENDPOINT", "http://localhost:8080/search"),
            ("PICKER_QUERY", "Hat"),
            ("PICKER_PAGE", "2"),
            ("PICKER_LIMIT", "1"),
            ("PICKER_SEARCH_MODE", "clear"),
        ])
        .unwrap();

        assert_eq!(config.catalog.endpoint.as_str(), "http://localhost:8080/search");
        assert_eq!(config.picker.initial_query, "Hat");
        assert_eq!(config.picker.page, 2);
        assert_eq!(config.picker.limit, 1);
        assert_eq!(config.picker.search, SearchPolicy::ClearOnly);
    }

    #[test]
    fn test_debounce_override() {
        let config = load(&[
            ("CATALOG_API_KEY", "k3y-9f8e7d"),
            ("PICKER_SEARCH_DEBOUNCE_MS", "50"),
        ])
        .unwrap();
        assert_eq!(
            config.picker.search,
            SearchPolicy::Refetch {
                debounce: Duration::from_millis(50)
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("CATALOG_API_KEY", "k3y-9f8e7d"), ("PICKER_LIMIT", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PICKER_LIMIT"));

        let err = load(&[("CATALOG_API_KEY", "k3y-9f8e7d"), ("PICKER_PAGE", "two")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PICKER_PAGE"));

        let err = load(&[
            ("CATALOG_API_KEY", "k3y-9f8e7d"),
            ("PICKER_SEARCH_MODE", "live"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PICKER_SEARCH_MODE"));

        let err = load(&[
            ("CATALOG_API_KEY", "k3y-9f8e7d"),
            ("CATALOG_ENDPOINT", "not a url"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "CATALOG_ENDPOINT"));
    }

    #[test]
    fn test_catalog_config_debug_redacts_api_key() {
        let config = CatalogConfig {
            endpoint: "http://localhost/search".parse().unwrap(),
            api_key: SecretString::from("super_secret_api_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("http://localhost/search"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
