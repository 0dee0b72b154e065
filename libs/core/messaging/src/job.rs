use serde::{de::DeserializeOwned, Serialize};

/// A message that travels through a durable queue.
///
/// The payload is plain data: redelivery state lives in the transport
/// (the consumer sees a delivery count), not in the job itself, so the
/// same bytes can be redelivered unchanged.
pub trait Job: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Stable identifier for this message, unchanged across redeliveries.
    fn job_id(&self) -> String;

    /// Short name for logs. Defaults to the Rust type name.
    fn job_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Serialize, Deserialize)]
    struct PingJob {
        token: String,
    }

    impl Job for PingJob {
        fn job_id(&self) -> String {
            self.token.clone()
        }
    }

    #[test]
    fn test_id_and_default_type_name() {
        let job = PingJob {
            token: "abc".into(),
        };
        assert_eq!(job.job_id(), "abc");
        assert!(job.job_type().ends_with("PingJob"));
    }

    #[test]
    fn test_id_survives_a_serde_roundtrip() {
        let job = PingJob {
            token: "abc".into(),
        };
        let bytes = serde_json::to_vec(&job).unwrap();
        let back: PingJob = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.job_id(), job.job_id());
    }
}
