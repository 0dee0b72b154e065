//! Activity-audit pipeline types.
//!
//! Mutating operations publish an [`ActivityEvent`] to a durable queue; a
//! worker consumes it, persists an [`ActivityRecord`], and appends an
//! [`AuditRecord`]. The publish is fire-and-forget from the request's point
//! of view; persistence happens on the consumer side with bounded,
//! fixed-interval redelivery.

use crate::repository::{ActivityRepository, AuditRepository};
use crate::values::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use messaging::nats::{NatsProducer, StreamConfig};
use messaging::{Job, JobError, Processor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Action recorded when a user's profile is modified.
pub const ACTION_PROFILE_MODIFIED: &str = "profile modified";

/// Action recorded when a user's preferences are modified.
pub const ACTION_PREFERENCES_MODIFIED: &str = "preferences modified";

/// Durable stream carrying user-activity events.
pub struct ActivityStream;

impl StreamConfig for ActivityStream {
    const STREAM_NAME: &'static str = "USER_ACTIVITY";
    const CONSUMER_NAME: &'static str = "activity-worker";
    const SUBJECT: &'static str = "activity.user";
}

/// A user-activity event in flight.
///
/// `message_id` is transport-level identity (stable across redeliveries);
/// the persistent record gets its own id when the consumer stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(user_id: &UserId, action: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            user_id: user_id.as_uuid(),
            action: action.into(),
            timestamp: Utc::now(),
        }
    }
}

impl Job for ActivityEvent {
    fn job_id(&self) -> String {
        self.message_id.to_string()
    }

    fn job_type(&self) -> &'static str {
        "activity_event"
    }
}

/// A persisted user-activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Build a record from an event, assigning a fresh persistent id.
    pub fn from_event(event: &ActivityEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: event.user_id,
            action: event.action.clone(),
            timestamp: event.timestamp,
        }
    }
}

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

impl AuditLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Info => "info",
            AuditLevel::Warning => "warning",
            AuditLevel::Error => "error",
        }
    }
}

/// An audit-trail entry, written synchronously by mutating operations and
/// by the activity consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: AuditLevel,
    pub event_type: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn info(user_id: Uuid, event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            level: AuditLevel::Info,
            event_type: event_type.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Failure to hand an event to the transport.
#[derive(Debug, Error)]
#[error("publish failed: {message}")]
pub struct PublishError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PublishError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Publishes activity events to the durable queue.
#[async_trait]
pub trait ActivityPublisher: Send + Sync {
    async fn publish(&self, event: &ActivityEvent) -> Result<(), PublishError>;
}

/// NATS JetStream publisher for activity events.
pub struct NatsActivityPublisher {
    producer: NatsProducer,
}

impl NatsActivityPublisher {
    /// Create a publisher and make sure the activity stream exists.
    pub async fn new(jetstream: async_nats::jetstream::Context) -> Result<Self, PublishError> {
        let producer = NatsProducer::from_stream_config::<ActivityStream>(jetstream);
        producer
            .ensure_stream()
            .await
            .map_err(|e| PublishError::with_source("failed to ensure activity stream", e))?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl ActivityPublisher for NatsActivityPublisher {
    async fn publish(&self, event: &ActivityEvent) -> Result<(), PublishError> {
        self.producer
            .publish(event)
            .await
            .map_err(|e| PublishError::with_source("failed to publish activity event", e))?;
        Ok(())
    }
}

/// In-memory publisher for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct InMemoryActivityPublisher {
    events: Arc<RwLock<Vec<ActivityEvent>>>,
}

impl InMemoryActivityPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far.
    pub async fn published(&self) -> Vec<ActivityEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl ActivityPublisher for InMemoryActivityPublisher {
    async fn publish(&self, event: &ActivityEvent) -> Result<(), PublishError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

/// Consumer-side processor: persists the activity record, then audits it.
///
/// Store failures are transient; the transport redelivers with a fixed
/// interval up to the consumer's delivery limit.
pub struct ActivityProcessor<A: ActivityRepository, D: AuditRepository> {
    activity: Arc<A>,
    audit: Arc<D>,
}

impl<A: ActivityRepository, D: AuditRepository> ActivityProcessor<A, D> {
    pub fn new(activity: Arc<A>, audit: Arc<D>) -> Self {
        Self { activity, audit }
    }
}

#[async_trait]
impl<A: ActivityRepository, D: AuditRepository> Processor<ActivityEvent>
    for ActivityProcessor<A, D>
{
    async fn process(&self, event: &ActivityEvent) -> Result<(), JobError> {
        let record = ActivityRecord::from_event(event);

        self.activity.append(&record).await.map_err(|e| {
            JobError::transient_with_source("failed to persist activity record", e)
        })?;

        let audit = AuditRecord::info(
            event.user_id,
            "user.activity",
            format!("activity recorded: {}", event.action),
        );
        self.audit.append(&audit).await.map_err(|e| {
            JobError::transient_with_source("failed to append audit entry", e)
        })?;

        tracing::info!(
            message_id = %event.message_id,
            user_id = %event.user_id,
            action = %event.action,
            record_id = %record.id,
            "Activity event processed"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "activity_processor"
    }
}
