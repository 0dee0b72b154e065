//! MongoDB connectivity: settings, connection establishment with startup
//! retry, and liveness probes.

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{connect, connect_from_config, connect_from_config_with_retry};
pub use health::{probe, HealthStatus};

// Driver types, re-exported so callers don't need a direct mongodb dep
// just to hold a handle.
pub use mongodb::{Client, Collection, Database};
