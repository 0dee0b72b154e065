//! Background worker that drains user-activity events from NATS JetStream
//! into MongoDB.
//!
//! ```text
//! USER_ACTIVITY stream
//!   -> durable pull consumer "activity-worker"
//!   -> NatsWorker<ActivityEvent, ActivityProcessor>
//!   -> historial_act_usuarios (fresh record id per delivery)
//!   -> auditoriaUsuarios
//! ```
//!
//! Transient store failures are redelivered at a fixed interval up to the
//! consumer's delivery limit; exhausted and permanent failures are
//! terminated.

use core_config::{Environment, FromEnv};
use database::mongodb::{connect_from_config_with_retry, probe, MongoConfig};
use domain_users::{
    ActivityEvent, ActivityProcessor, ActivityStream, MongoActivityRepository,
    MongoAuditRepository,
};
use eyre::{Result, WrapErr};
use messaging::nats::{NatsWorker, WorkerConfig};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Wire everything up and run the worker until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error when configuration is invalid, a MongoDB or NATS
/// connection cannot be established, or the stream and consumer cannot be
/// provisioned.
pub async fn run() -> Result<()> {
    core_config::tracing::install_error_hooks();

    let environment = Environment::from_env();
    core_config::tracing::init(&environment);

    info!(?environment, "Starting user-activity worker");

    let mongo_config = MongoConfig::from_env().wrap_err("Invalid MongoDB configuration")?;
    let client = connect_from_config_with_retry(&mongo_config, None)
        .await
        .wrap_err_with(|| format!("Failed to connect to MongoDB at {}", mongo_config.url))?;
    let db = client.database(&mongo_config.database);

    let health = probe(&client).await;
    info!(
        response_time_ms = health.response_time_ms,
        "MongoDB responding"
    );

    let activity_repo = Arc::new(MongoActivityRepository::new(&db));
    let audit_repo = Arc::new(MongoAuditRepository::new(&db));

    let nats_url =
        std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());
    info!(url = %nats_url, "Connecting to NATS");
    let nats_client = async_nats::connect(&nats_url)
        .await
        .wrap_err_with(|| format!("Failed to connect to NATS at {}", nats_url))?;
    let jetstream = async_nats::jetstream::new(nats_client);

    let worker_config = WorkerConfig::from_stream::<ActivityStream>();
    info!(
        stream = %worker_config.stream_name,
        durable = %worker_config.durable_name,
        subject = %worker_config.subject,
        "Worker configuration loaded"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let processor = ActivityProcessor::new(activity_repo, audit_repo);
    let worker = NatsWorker::<ActivityEvent, _>::new(jetstream, processor, worker_config)
        .await
        .wrap_err("Failed to create NATS worker")?;

    worker
        .run(shutdown_rx)
        .await
        .map_err(|e| eyre::eyre!("{}", e))?;

    info!("User-activity worker stopped");
    Ok(())
}

/// Completes when SIGINT arrives, or SIGTERM on unix.
async fn shutdown_signal() {
    // A failed handler install must not complete this future, or the
    // worker would shut down right after starting.
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C received, shutting down");
    };

    #[cfg(unix)]
    {
        use signal::unix::{signal as unix_signal, SignalKind};

        let terminate = async {
            match unix_signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("SIGTERM received, shutting down");
                }
                Err(e) => {
                    error!(error = %e, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = interrupt => {}
            _ = terminate => {}
        }
    }

    #[cfg(not(unix))]
    interrupt.await;
}
