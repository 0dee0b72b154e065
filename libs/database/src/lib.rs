//! Document-store connectivity for the user-registry services.
//!
//! Settings come from the environment ([`mongodb::MongoConfig`] implements
//! `core_config::FromEnv`), connections are verified with a ping before
//! use, and startup connects can be wrapped in exponential-backoff retry
//! for dependencies that come up slower than the service.
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{connect_from_config_with_retry, MongoConfig};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(&config.database);
//! ```

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
