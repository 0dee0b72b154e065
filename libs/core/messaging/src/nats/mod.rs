//! NATS JetStream transport.
//!
//! Implements [`Job`](crate::Job) and [`Processor`](crate::Processor)
//! over a durable stream with a durable pull consumer:
//!
//! - explicit acks (`AckPolicy::Explicit`)
//! - bounded redelivery via the consumer's `max_deliver`
//! - delayed redelivery via `AckKind::Nak(Some(delay))`
//! - permanent failures terminated with `AckKind::Term`
//!
//! # Example
//!
//! ```rust,ignore
//! use messaging::nats::{NatsWorker, NatsProducer, StreamConfig, WorkerConfig};
//!
//! struct ActivityStream;
//! impl StreamConfig for ActivityStream {
//!     const STREAM_NAME: &'static str = "USER_ACTIVITY";
//!     const CONSUMER_NAME: &'static str = "activity-worker";
//!     const SUBJECT: &'static str = "activity.user";
//! }
//!
//! let worker = NatsWorker::<ActivityEvent, ActivityProcessor>::new(
//!     jetstream,
//!     processor,
//!     WorkerConfig::from_stream::<ActivityStream>(),
//! ).await?;
//!
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod error;
mod producer;
mod worker;

pub use config::{StreamConfig, WorkerConfig};
pub use consumer::{Delivery, NatsConsumer};
pub use error::NatsError;
pub use producer::NatsProducer;
pub use worker::NatsWorker;

use async_nats::jetstream::stream::Config as JsStreamConfig;
use async_nats::jetstream::Context;
use std::time::Duration;
use tracing::{debug, info};

/// Streams keep a week of messages, bounded in count.
const STREAM_MAX_MESSAGES: i64 = 100_000;
const STREAM_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Create the stream if it does not exist yet.
///
/// Both ends of the pipeline call this at startup: JetStream rejects
/// publishes to a subject no stream captures, and a consumer cannot be
/// provisioned on a missing stream.
pub(crate) async fn ensure_stream(
    jetstream: &Context,
    name: &str,
    subject: &str,
) -> Result<(), NatsError> {
    if jetstream.get_stream(name).await.is_ok() {
        debug!(stream = %name, "Stream already exists");
        return Ok(());
    }

    info!(stream = %name, subject = %subject, "Creating stream");

    jetstream
        .create_stream(JsStreamConfig {
            name: name.to_string(),
            subjects: vec![subject.to_string()],
            max_messages: STREAM_MAX_MESSAGES,
            max_age: STREAM_MAX_AGE,
            ..Default::default()
        })
        .await
        .map_err(NatsError::from_jetstream_error)?;

    Ok(())
}
