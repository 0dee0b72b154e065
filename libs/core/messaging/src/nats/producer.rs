//! Publishing side of the JetStream pipeline.

use crate::nats::config::StreamConfig;
use crate::nats::error::NatsError;
use crate::Job;
use async_nats::jetstream::Context;
use std::sync::Arc;
use tracing::debug;

/// Publishes jobs onto one stream subject.
///
/// Cheap to clone; every clone shares the underlying JetStream context.
pub struct NatsProducer {
    jetstream: Arc<Context>,
    stream_name: String,
    subject: String,
}

impl NatsProducer {
    pub fn new(
        jetstream: Context,
        stream_name: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            jetstream: Arc::new(jetstream),
            stream_name: stream_name.into(),
            subject: subject.into(),
        }
    }

    /// Build a producer for the stream a [`StreamConfig`] marker describes.
    pub fn from_stream_config<S: StreamConfig>(jetstream: Context) -> Self {
        Self::new(jetstream, S::STREAM_NAME, S::SUBJECT)
    }

    /// Publish one job and wait for the server ack.
    ///
    /// Returns the stream sequence the message was stored at.
    pub async fn publish<J: Job>(&self, job: &J) -> Result<u64, NatsError> {
        let payload = serde_json::to_vec(job)?;

        // The first await sends, the second waits for the server ack.
        let pending = self
            .jetstream
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| NatsError::publish_error(e.to_string()))?;
        let ack = pending
            .await
            .map_err(|e| NatsError::publish_error(e.to_string()))?;

        debug!(
            subject = %self.subject,
            sequence = ack.sequence,
            job_id = %job.job_id(),
            "Published job"
        );
        Ok(ack.sequence)
    }

    /// Create the stream if it does not exist yet. Runs once at startup,
    /// before the first publish.
    pub async fn ensure_stream(&self) -> Result<(), NatsError> {
        super::ensure_stream(&self.jetstream, &self.stream_name, &self.subject).await
    }
}

impl Clone for NatsProducer {
    fn clone(&self) -> Self {
        Self {
            jetstream: Arc::clone(&self.jetstream),
            stream_name: self.stream_name.clone(),
            subject: self.subject.clone(),
        }
    }
}
