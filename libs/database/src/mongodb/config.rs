use core_config::{ConfigError, FromEnv};

/// Connection settings for the document store.
///
/// Built manually in tests or loaded from the environment at startup:
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::from_env()?;
/// ```
///
/// Recognized environment variables:
///
/// | Variable | Default |
/// |---|---|
/// | `MONGODB_URL` (or `MONGO_URL`) | required |
/// | `MONGODB_DATABASE` (or `MONGO_DATABASE`) | required |
/// | `MONGODB_APP_NAME` | unset |
/// | `MONGODB_MAX_POOL_SIZE` | 100 |
/// | `MONGODB_MIN_POOL_SIZE` | 5 |
/// | `MONGODB_CONNECT_TIMEOUT_SECS` | 10 |
/// | `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` | 30 |
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Connection string, `mongodb://[user:pass@]host[:port][/?options]`
    pub url: String,
    /// Database holding the service's collections
    pub database: String,
    /// Reported to the server for its connection logs
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    /// Settings with the given URL and defaults for everything else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: "default".to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }

    /// Settings with the given URL and database name.
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        let mut config = Self::new(url);
        config.database = database.into();
        config
    }
}

impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        // Older deployments exported the MONGO_-prefixed pair.
        let required = |primary: &str, legacy: &str| {
            std::env::var(primary)
                .or_else(|_| std::env::var(legacy))
                .map_err(|_| ConfigError::Missing(format!("{primary} or {legacy}")))
        };

        let mut config = Self::new(required("MONGODB_URL", "MONGO_URL")?);
        config.database = required("MONGODB_DATABASE", "MONGO_DATABASE")?;
        config.app_name = std::env::var("MONGODB_APP_NAME").ok();
        config.max_pool_size = core_config::env_parse_or("MONGODB_MAX_POOL_SIZE", 100)?;
        config.min_pool_size = core_config::env_parse_or("MONGODB_MIN_POOL_SIZE", 5)?;
        config.connect_timeout_secs = core_config::env_parse_or("MONGODB_CONNECT_TIMEOUT_SECS", 10)?;
        config.server_selection_timeout_secs =
            core_config::env_parse_or("MONGODB_SERVER_SELECTION_TIMEOUT_SECS", 30)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MongoConfig::new("mongodb://db:27017");
        assert_eq!(config.url, "mongodb://db:27017");
        assert_eq!(config.database, "default");
        assert_eq!(config.max_pool_size, 100);
        assert_eq!(config.min_pool_size, 5);
        assert!(config.app_name.is_none());
    }

    #[test]
    fn test_with_database() {
        let config = MongoConfig::with_database("mongodb://db:27017", "registry");
        assert_eq!(config.database, "registry");
    }

    #[test]
    fn test_from_env_primary_keys() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://primary:27017")),
                ("MONGODB_DATABASE", Some("registry")),
                ("MONGODB_MAX_POOL_SIZE", Some("25")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://primary:27017");
                assert_eq!(config.database, "registry");
                assert_eq!(config.max_pool_size, 25);
            },
        );
    }

    #[test]
    fn test_from_env_legacy_key_fallback() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", Some("mongodb://legacy:27017")),
                ("MONGODB_DATABASE", None::<&str>),
                ("MONGO_DATABASE", Some("legacydb")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://legacy:27017");
                assert_eq!(config.database, "legacydb");
            },
        );
    }

    #[test]
    fn test_from_env_requires_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None::<&str>),
                ("MONGODB_DATABASE", Some("registry")),
            ],
            || {
                assert!(MongoConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_pool_size() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://db:27017")),
                ("MONGODB_DATABASE", Some("registry")),
                ("MONGODB_MAX_POOL_SIZE", Some("lots")),
            ],
            || {
                assert!(MongoConfig::from_env().is_err());
            },
        );
    }
}
