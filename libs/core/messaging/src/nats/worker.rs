//! The worker loop: pull a batch, process it concurrently, settle every
//! message according to its outcome.

use crate::nats::config::WorkerConfig;
use crate::nats::consumer::{Delivery, NatsConsumer};
use crate::nats::error::NatsError;
use crate::{FailureKind, Job, Processor};
use async_nats::jetstream::Context;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Pause before the next fetch when a batch comes back empty.
const IDLE_PAUSE: Duration = Duration::from_millis(100);

/// Pause after a batch-level transport error before trying again.
const BATCH_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Long-running consumer of one job type.
///
/// Each message ends in exactly one of three settlements: ack on success,
/// nak-with-delay on a transient failure that still has deliveries left,
/// term on a permanent failure or once deliveries are exhausted.
pub struct NatsWorker<J: Job, P: Processor<J>> {
    consumer: NatsConsumer,
    processor: Arc<P>,
    config: WorkerConfig,
    _marker: PhantomData<J>,
}

impl<J: Job, P: Processor<J> + 'static> NatsWorker<J, P> {
    /// Build a worker and provision its stream and durable consumer.
    pub async fn new(
        jetstream: Context,
        processor: P,
        config: WorkerConfig,
    ) -> Result<Self, NatsError> {
        let consumer = NatsConsumer::new(Arc::new(jetstream), config.clone());
        consumer.init().await?;

        Ok(Self {
            consumer,
            processor: Arc::new(processor),
            config,
            _marker: PhantomData,
        })
    }

    /// Fetch and process batches until the shutdown channel flips to `true`
    /// (or its sender is dropped).
    ///
    /// A batch-level error is logged and the loop backs off briefly rather
    /// than exiting; messages left unsettled will be redelivered by the
    /// server after their ack wait.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), NatsError> {
        info!(
            stream = %self.config.stream_name,
            durable = %self.config.durable_name,
            max_deliver = self.config.max_deliver,
            max_concurrent = %self.config.max_concurrent_jobs,
            processor = %self.processor.name(),
            "Worker started"
        );

        loop {
            tokio::select! {
                stop = shutdown_rx.wait_for(|stop| *stop) => {
                    if stop.is_ok() {
                        info!("Shutdown requested, draining worker");
                    } else {
                        warn!("Shutdown channel closed, stopping worker");
                    }
                    break;
                }

                outcome = self.process_batch() => {
                    if let Err(e) = outcome {
                        error!(error = %e, "Batch failed");
                        tokio::time::sleep(BATCH_ERROR_PAUSE).await;
                    }
                }
            }
        }

        info!("Worker stopped");
        Ok(())
    }

    async fn process_batch(&self) -> Result<(), NatsError> {
        let batch: Vec<Delivery<J>> = self.consumer.fetch(self.config.batch_size).await?;

        if batch.is_empty() {
            tokio::time::sleep(IDLE_PAUSE).await;
            return Ok(());
        }

        let gate = Arc::new(Semaphore::new(self.config.max_concurrent_jobs));
        let mut tasks = JoinSet::new();

        for message in batch {
            let Ok(permit) = gate.clone().acquire_owned().await else {
                // The semaphore is never closed while the worker holds it
                break;
            };
            let processor = Arc::clone(&self.processor);
            let config = self.config.clone();

            tasks.spawn(async move {
                let outcome = Self::settle(message, processor.as_ref(), &config).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Err(e)) => warn!(error = %e, "Failed to settle message"),
                Err(e) => error!(error = %e, "Job task panicked"),
                Ok(Ok(())) => {}
            }
        }

        Ok(())
    }

    /// Run the processor on one message and settle it. Static so spawned
    /// tasks don't borrow `self`.
    async fn settle(
        message: Delivery<J>,
        processor: &P,
        config: &WorkerConfig,
    ) -> Result<(), NatsError> {
        let job_id = message.job_id();
        let delivery_count = message.delivery_count;

        if message.is_redelivery() {
            debug!(%job_id, delivery_count, "Redelivered job");
        }

        let started = Instant::now();
        let outcome = processor.process(&message.job).await;

        let err = match outcome {
            Ok(()) => {
                message.ack().await?;
                debug!(
                    %job_id,
                    duration_ms = started.elapsed().as_millis(),
                    "Job done"
                );
                return Ok(());
            }
            Err(err) => err,
        };

        if err.kind() == FailureKind::Permanent {
            warn!(%job_id, error = %err, "Permanent failure, terminating message");
            return message.term().await;
        }

        if (delivery_count as i64) >= config.max_deliver {
            error!(
                %job_id,
                error = %err,
                delivery_count,
                "Deliveries exhausted, terminating message"
            );
            return message.term().await;
        }

        let delay = config.redelivery_backoff.delay(delivery_count);
        warn!(
            %job_id,
            error = %err,
            delivery_count,
            delay_ms = delay.as_millis(),
            "Transient failure, nak with delay"
        );
        message.nak_with_delay(delay).await
    }
}
