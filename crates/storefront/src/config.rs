//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MEKONG_API_URL` - Base URL of the Mekong Market backend,
//!   e.g. `https://api.mekongmarket.dev/`
//!
//! ## Optional
//! - `MEKONG_SESSION_FILE` - Path of the persisted session token
//!   (default: `.mekong-session` in the working directory)
//! - `MEKONG_CATALOG_LIMIT` - How many products the listing fetches
//!   (default: 100)

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_FILE: &str = ".mekong-session";
const DEFAULT_CATALOG_LIMIT: u32 = 100;

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
    /// Base URL of the backend API
    pub api_url: Url,
    /// Path of the persisted session token
    pub session_file: PathBuf,
    /// How many products the listing fetches
    pub catalog_limit: u32,
}

impl StorefrontConfig {
    /// Load configuration from the process environment (and `.env`, if one
    /// exists).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("MEKONG_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("MEKONG_API_URL".to_owned()))?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("MEKONG_API_URL".to_owned(), e.to_string()))?;

        let session_file = lookup("MEKONG_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        let catalog_limit = lookup("MEKONG_CATALOG_LIMIT")
            .map(|raw| {
                raw.parse::<u32>().map_err(|e| {
                    ConfigError::InvalidEnvVar("MEKONG_CATALOG_LIMIT".to_owned(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_CATALOG_LIMIT);

        Ok(Self {
            api_url,
            session_file,
            catalog_limit,
        })
    }

    /// Build configuration from a map, for tests and embedding shells.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_minimal_config() {
        let config =
            StorefrontConfig::from_vars(&vars(&[("MEKONG_API_URL", "https://api.example.com/")]))
                .unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.example.com/");
        assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert_eq!(config.catalog_limit, DEFAULT_CATALOG_LIMIT);
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_vars(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "MEKONG_API_URL"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = StorefrontConfig::from_vars(&vars(&[("MEKONG_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "MEKONG_API_URL"));

        let err = StorefrontConfig::from_vars(&vars(&[
            ("MEKONG_API_URL", "https://api.example.com/"),
            ("MEKONG_CATALOG_LIMIT", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "MEKONG_CATALOG_LIMIT"));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_vars(&vars(&[
            ("MEKONG_API_URL", "http://localhost:8000/"),
            ("MEKONG_SESSION_FILE", "/tmp/session"),
            ("MEKONG_CATALOG_LIMIT", "25"),
        ]))
        .unwrap();
        assert_eq!(config.session_file, PathBuf::from("/tmp/session"));
        assert_eq!(config.catalog_limit, 25);
    }
}
