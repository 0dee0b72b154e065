//! Pull-consumer side of the JetStream pipeline.

use crate::nats::config::WorkerConfig;
use crate::nats::error::NatsError;
use crate::Job;
use async_nats::jetstream::consumer::pull::Config as ConsumerConfig;
use async_nats::jetstream::consumer::{AckPolicy, Consumer};
use async_nats::jetstream::{AckKind, Context, Message};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches batches of jobs from a durable pull consumer.
pub struct NatsConsumer {
    jetstream: Arc<Context>,
    config: WorkerConfig,
}

impl NatsConsumer {
    pub fn new(jetstream: Arc<Context>, config: WorkerConfig) -> Self {
        Self { jetstream, config }
    }

    /// Create the stream if it does not exist yet.
    pub async fn ensure_stream(&self) -> Result<(), NatsError> {
        super::ensure_stream(&self.jetstream, &self.config.stream_name, &self.config.subject).await
    }

    /// Look up the durable consumer, creating it on first run.
    ///
    /// The consumer uses explicit acks so the worker controls the fate of
    /// every message, and the server enforces the delivery cap.
    pub async fn ensure_consumer(&self) -> Result<Consumer<ConsumerConfig>, NatsError> {
        let stream = self
            .jetstream
            .get_stream(&self.config.stream_name)
            .await
            .map_err(NatsError::from_jetstream_error)?;

        if let Ok(consumer) = stream
            .get_consumer::<ConsumerConfig>(&self.config.durable_name)
            .await
        {
            debug!(consumer = %self.config.durable_name, "Consumer already exists");
            return Ok(consumer);
        }

        info!(
            consumer = %self.config.durable_name,
            stream = %self.config.stream_name,
            max_deliver = self.config.max_deliver,
            "Creating consumer"
        );

        stream
            .create_consumer(ConsumerConfig {
                durable_name: Some(self.config.durable_name.clone()),
                name: Some(self.config.durable_name.clone()),
                ack_policy: AckPolicy::Explicit,
                ack_wait: self.config.ack_wait,
                max_deliver: self.config.max_deliver,
                filter_subject: self.config.subject.clone(),
                ..Default::default()
            })
            .await
            .map_err(NatsError::from_jetstream_error)
    }

    /// Provision both stream and consumer.
    pub async fn init(&self) -> Result<(), NatsError> {
        self.ensure_stream().await?;
        self.ensure_consumer().await?;
        Ok(())
    }

    /// Pull up to `batch_size` messages.
    ///
    /// Payloads that do not deserialize as `J` are terminated on the spot:
    /// redelivering the same bytes would fail the same way every time.
    pub async fn fetch<J: Job>(&self, batch_size: usize) -> Result<Vec<Delivery<J>>, NatsError> {
        let consumer = self.ensure_consumer().await?;

        let mut messages = consumer
            .fetch()
            .max_messages(batch_size)
            .expires(self.config.fetch_timeout)
            .messages()
            .await
            .map_err(NatsError::from_jetstream_error)?;

        let mut batch = Vec::new();

        while let Some(next) = messages.next().await {
            let message = match next {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Error receiving message");
                    continue;
                }
            };

            let job = match serde_json::from_slice::<J>(&message.payload) {
                Ok(job) => job,
                Err(e) => {
                    warn!(error = %e, "Undecodable payload, terminating message");
                    if let Err(term_err) = message.ack_with(AckKind::Term).await {
                        warn!(error = %term_err, "Failed to terminate bad message");
                    }
                    continue;
                }
            };

            let delivery_count = match message.info() {
                Ok(info) => info.delivered as u32,
                Err(e) => {
                    warn!(error = %e, "No delivery metadata, assuming first delivery");
                    1
                }
            };

            batch.push(Delivery { job, message, delivery_count });
        }

        Ok(batch)
    }
}

/// One pulled message: the decoded job plus the handle needed to settle it.
pub struct Delivery<J: Job> {
    pub job: J,
    message: Message,
    /// 1 on the first delivery.
    pub delivery_count: u32,
}

impl<J: Job> Delivery<J> {
    pub fn job_id(&self) -> String {
        self.job.job_id()
    }

    pub fn is_redelivery(&self) -> bool {
        self.delivery_count > 1
    }

    /// Settle the message as successfully processed.
    pub async fn ack(self) -> Result<(), NatsError> {
        self.finish(AckKind::Ack).await
    }

    /// Ask the server to redeliver after `delay`.
    pub async fn nak_with_delay(self, delay: Duration) -> Result<(), NatsError> {
        self.finish(AckKind::Nak(Some(delay))).await
    }

    /// Settle the message as permanently failed. No further deliveries.
    pub async fn term(self) -> Result<(), NatsError> {
        self.finish(AckKind::Term).await
    }

    async fn finish(self, kind: AckKind) -> Result<(), NatsError> {
        self.message
            .ack_with(kind)
            .await
            .map_err(|e| NatsError::consumer_error(e.to_string()))
    }
}
