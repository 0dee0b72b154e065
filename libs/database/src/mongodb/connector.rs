//! Connection establishment for the document store.

use mongodb::bson::doc;
use mongodb::{options::ClientOptions, Client};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{retry, retry_with, DatabaseError, RetrySettings};

/// Connect with default settings, verifying the server answers.
pub async fn connect(url: &str) -> Result<Client, DatabaseError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Connect using explicit settings, verifying the server answers.
///
/// Pool sizes and timeouts from the config are applied on top of whatever
/// the connection string carries. The returned client has been pinged, so
/// an unreachable server fails here rather than on the first query.
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, DatabaseError> {
    info!(url = %config.url, "Connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.app_name.clone_from(&config.app_name);

    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::Unreachable(e.to_string()))?;

    info!("MongoDB connection established");
    Ok(client)
}

/// [`connect_from_config`] wrapped in startup retry.
///
/// `None` uses the default schedule (3 retries, doubling from 100 ms).
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_settings: Option<RetrySettings>,
) -> Result<Client, DatabaseError> {
    match retry_settings {
        Some(schedule) => retry_with(|| connect_from_config(config), schedule).await,
        None => retry(|| connect_from_config(config)).await,
    }
}
