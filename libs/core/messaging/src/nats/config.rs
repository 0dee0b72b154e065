//! Stream and worker settings for the JetStream transport.

use crate::config::BackoffStrategy;
use std::time::Duration;

/// Compile-time description of one stream and its durable consumer.
///
/// A domain crate declares a marker type per stream and both ends of the
/// pipeline read the same constants from it, so producer and worker can
/// never disagree on names:
///
/// ```rust,ignore
/// struct ActivityStream;
///
/// impl StreamConfig for ActivityStream {
///     const STREAM_NAME: &'static str = "USER_ACTIVITY";
///     const CONSUMER_NAME: &'static str = "activity-worker";
///     const SUBJECT: &'static str = "activity.user";
/// }
/// ```
pub trait StreamConfig {
    const STREAM_NAME: &'static str;

    /// Durable consumer name, shared by every worker instance.
    const CONSUMER_NAME: &'static str;

    /// Subject filter. The default captures everything on the stream.
    const SUBJECT: &'static str = ">";

    /// Delivery attempts per message before the server stops redelivering.
    const MAX_DELIVER: i64 = 3;

    /// Seconds between redeliveries of a nak'd message.
    const REDELIVERY_DELAY_SECS: u64 = 5;

    /// Seconds the server waits for an ack before redelivering on its own.
    const ACK_WAIT_SECS: u64 = 30;
}

/// Runtime settings for a [`NatsWorker`](crate::nats::NatsWorker).
///
/// Built with [`WorkerConfig::from_stream`]; the fields are public so a
/// deployment that needs different throughput can adjust them in place.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,
    pub durable_name: String,
    pub subject: String,
    /// Messages pulled per fetch.
    pub batch_size: usize,
    /// How long one fetch waits for the batch to fill.
    pub fetch_timeout: Duration,
    pub max_deliver: i64,
    pub redelivery_backoff: BackoffStrategy,
    pub ack_wait: Duration,
    /// Concurrency cap for in-flight jobs.
    pub max_concurrent_jobs: usize,
}

impl WorkerConfig {
    /// Derive the runtime settings from a [`StreamConfig`] marker type.
    ///
    /// Throughput knobs the marker does not carry get conservative
    /// defaults: batches of 10, a 5 second fetch window, 4 concurrent
    /// jobs.
    pub fn from_stream<S: StreamConfig>() -> Self {
        Self {
            stream_name: S::STREAM_NAME.to_string(),
            durable_name: S::CONSUMER_NAME.to_string(),
            subject: S::SUBJECT.to_string(),
            batch_size: 10,
            fetch_timeout: Duration::from_secs(5),
            max_deliver: S::MAX_DELIVER,
            redelivery_backoff: BackoffStrategy::Fixed(Duration::from_secs(
                S::REDELIVERY_DELAY_SECS,
            )),
            ack_wait: Duration::from_secs(S::ACK_WAIT_SECS),
            max_concurrent_jobs: 4,
        }
    }
}
