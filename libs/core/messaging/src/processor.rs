use crate::error::JobError;
use crate::job::Job;
use async_trait::async_trait;

/// Consumer-side handler for one job type.
///
/// The returned error's category decides what the transport does next:
/// transient failures are redelivered (bounded by the consumer's delivery
/// cap), permanent ones terminate the message.
#[async_trait]
pub trait Processor<J: Job>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), JobError>;

    /// Name used in worker logs.
    fn name(&self) -> &'static str;
}
