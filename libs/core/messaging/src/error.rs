use std::fmt;
use thiserror::Error;

/// What the transport should do with a failed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Redeliver, up to the consumer's delivery limit
    Transient,
    /// Terminate without redelivery
    Permanent,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        *self == FailureKind::Transient
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Transient => "transient",
            FailureKind::Permanent => "permanent",
        })
    }
}

/// Failure while processing a job, categorized for the worker.
///
/// A store timeout is transient (redelivering may succeed later); a
/// payload that violates a business rule is permanent (redelivering the
/// same bytes can never succeed).
#[derive(Debug, Error)]
pub enum JobError {
    #[error("transient failure: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("permanent failure: {message}")]
    Permanent {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Payload (de)serialization failure. Always permanent.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

impl JobError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into(), source: None }
    }

    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent { message: message.into(), source: None }
    }

    pub fn permanent_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Permanent { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transient { .. } => FailureKind::Transient,
            Self::Permanent { .. } | Self::Serialization(_) => FailureKind::Permanent,
        }
    }
}
