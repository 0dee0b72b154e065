//! Durable background messaging for the user-registry services.
//!
//! The crate splits into a small backend-agnostic core and a transport:
//!
//! - [`Job`]: a serializable message with a stable identifier
//! - [`Processor`]: the consumer-side handler for a job type
//! - [`JobError`] / [`FailureKind`]: failures categorized by
//!   whether redelivering the message can help
//! - [`BackoffStrategy`]: the delay between redeliveries
//!
//! The `nats` feature adds the JetStream transport in [`nats`]: a durable
//! stream, a durable pull consumer with explicit acks, and a worker loop
//! that settles every message as ack, delayed nak, or term.
//!
//! # Example
//!
//! ```ignore
//! use messaging::{Job, Processor, JobError};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct ActivityEvent {
//!     message_id: Uuid,
//!     user_id: Uuid,
//!     action: String,
//! }
//!
//! impl Job for ActivityEvent {
//!     fn job_id(&self) -> String { self.message_id.to_string() }
//! }
//!
//! struct ActivityProcessor { /* repositories */ }
//!
//! #[async_trait]
//! impl Processor<ActivityEvent> for ActivityProcessor {
//!     async fn process(&self, event: &ActivityEvent) -> Result<(), JobError> { ... }
//!     fn name(&self) -> &'static str { "activity_processor" }
//! }
//! ```

mod config;
mod error;
mod job;
mod processor;

#[cfg(feature = "nats")]
pub mod nats;

pub use config::BackoffStrategy;
pub use error::{FailureKind, JobError};
pub use job::Job;
pub use processor::Processor;
