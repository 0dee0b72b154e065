use thiserror::Error;

/// Failure in the JetStream transport itself, as opposed to a
/// [`JobError`](crate::JobError) raised by a processor.
#[derive(Debug, Error)]
pub enum NatsError {
    /// Stream or consumer management call failed.
    #[error("jetstream error: {0}")]
    JetStream(String),

    /// Fetching or settling a message failed.
    #[error("consumer error: {0}")]
    Consumer(String),

    /// Publish was not acknowledged by the server.
    #[error("publish error: {0}")]
    Publish(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// async_nats errors are generic over an error kind, so the conversions
// go through Display instead of From impls.
impl NatsError {
    pub fn from_jetstream_error(error: impl std::fmt::Display) -> Self {
        Self::JetStream(error.to_string())
    }

    pub fn publish_error(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    pub fn consumer_error(msg: impl Into<String>) -> Self {
        Self::Consumer(msg.into())
    }
}
