use std::time::Duration;

/// How long the transport waits before redelivering a failed message.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// The same delay on every redelivery.
    Fixed(Duration),

    /// `base * 2^attempt`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl BackoffStrategy {
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(d) => *d,
            BackoffStrategy::Exponential { base, max } => {
                base.saturating_mul(2u32.saturating_pow(attempt)).min(*max)
            }
        }
    }
}
