//! Environment-driven configuration for the user-registry services.
//!
//! Configuration is read once at startup from process environment
//! variables; nothing here mutates at runtime. Crates define a config
//! struct and implement [`FromEnv`] for it.

pub mod tracing;

use std::env;
use thiserror::Error;

/// Failure to assemble a configuration value from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable '{0}' is not set")]
    Missing(String),

    #[error("environment variable '{key}' has an invalid value: {details}")]
    Invalid { key: String, details: String },
}

/// Deployment environment, selected by `APP_ENV`.
///
/// Anything other than `production` (case-insensitive) is treated as
/// development, including an unset variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("APP_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

/// A configuration struct that can be assembled from environment variables.
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Read and parse `key`, falling back to `default` when unset.
///
/// An unset variable is fine; a set-but-unparseable one is an error, so a
/// typo fails fast instead of silently running with the default.
pub fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        details: e.to_string(),
    })
}
