//! Command handlers for the users domain.
//!
//! Each handler validates input, enforces business rules in a fixed order,
//! persists through the repository traits, writes an audit entry, and (for
//! mutations of existing users) publishes an activity event.

use crate::activity::{
    ActivityEvent, ActivityPublisher, AuditRecord, ACTION_PREFERENCES_MODIFIED,
    ACTION_PROFILE_MODIFIED,
};
use crate::error::{UserError, UserResult};
use crate::factory::{NewUser, UserFactory};
use crate::repository::{AuditRepository, RoleRepository, UserRepository};
use crate::user::UserPatch;
use crate::values::{RoleId, UserId};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Input for [`CreateUserHandler`].
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: String,
    pub role_id: String,
    pub preferences: Vec<String>,
}

/// Registers a new user.
///
/// Rule order is fixed: the role must exist, then the email must be free,
/// then the field values must pass validation. Only then is anything
/// persisted.
pub struct CreateUserHandler<U, R, D>
where
    U: UserRepository,
    R: RoleRepository,
    D: AuditRepository,
{
    users: Arc<U>,
    roles: Arc<R>,
    audit: Arc<D>,
}

impl<U, R, D> CreateUserHandler<U, R, D>
where
    U: UserRepository,
    R: RoleRepository,
    D: AuditRepository,
{
    pub fn new(users: Arc<U>, roles: Arc<R>, audit: Arc<D>) -> Self {
        Self { users, roles, audit }
    }

    pub async fn handle(&self, request: CreateUserRequest) -> UserResult<UserId> {
        let role_id = RoleId::new(&request.role_id)?;
        self.roles
            .find_by_id(&role_id)
            .await
            .map_err(UserError::CreateUserFailed)?
            .ok_or_else(|| UserError::RoleNotFound(request.role_id.clone()))?;

        if self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(UserError::CreateUserFailed)?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(request.email));
        }

        let user = UserFactory::create(NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            birth_date: request.birth_date,
            email: request.email,
            phone: request.phone,
            address: request.address,
            photo_url: request.photo_url,
            role_id: request.role_id,
            preferences: request.preferences,
        })?;

        self.users
            .create(&user)
            .await
            .map_err(UserError::CreateUserFailed)?;

        self.audit
            .append(&AuditRecord::info(
                user.id().as_uuid(),
                "user.created",
                format!("user created with email {}", user.email()),
            ))
            .await
            .map_err(UserError::CreateUserFailed)?;

        tracing::info!(user_id = %user.id(), "User created");
        Ok(user.id().clone())
    }
}

/// Applies a partial profile update to an existing user.
pub struct ModifyUserHandler<U, D, P>
where
    U: UserRepository,
    D: AuditRepository,
    P: ActivityPublisher,
{
    users: Arc<U>,
    audit: Arc<D>,
    publisher: Arc<P>,
}

impl<U, D, P> ModifyUserHandler<U, D, P>
where
    U: UserRepository,
    D: AuditRepository,
    P: ActivityPublisher,
{
    pub fn new(users: Arc<U>, audit: Arc<D>, publisher: Arc<P>) -> Self {
        Self { users, audit, publisher }
    }

    pub async fn handle(&self, user_id: &str, patch: UserPatch) -> UserResult<()> {
        let id = UserId::new(user_id)?;
        let mut user = self
            .users
            .find_by_id(&id)
            .await
            .map_err(UserError::ModifyUserFailed)?
            .ok_or_else(|| UserError::UserNotFound(user_id.to_string()))?;

        user.apply_patch(&patch)?;

        self.users
            .update(&user)
            .await
            .map_err(UserError::ModifyUserFailed)?;

        self.audit
            .append(&AuditRecord::info(
                id.as_uuid(),
                "user.modified",
                "user profile modified",
            ))
            .await
            .map_err(UserError::ModifyUserFailed)?;

        self.publisher
            .publish(&ActivityEvent::new(&id, ACTION_PROFILE_MODIFIED))
            .await
            .map_err(UserError::PublishFailed)?;

        tracing::info!(user_id = %id, "User modified");
        Ok(())
    }
}

/// Replaces a user's preference list.
pub struct ModifyPreferencesHandler<U, D, P>
where
    U: UserRepository,
    D: AuditRepository,
    P: ActivityPublisher,
{
    users: Arc<U>,
    audit: Arc<D>,
    publisher: Arc<P>,
}

impl<U, D, P> ModifyPreferencesHandler<U, D, P>
where
    U: UserRepository,
    D: AuditRepository,
    P: ActivityPublisher,
{
    pub fn new(users: Arc<U>, audit: Arc<D>, publisher: Arc<P>) -> Self {
        Self { users, audit, publisher }
    }

    pub async fn handle(&self, user_id: &str, preferences: Vec<String>) -> UserResult<()> {
        let id = UserId::new(user_id)?;
        let mut user = self
            .users
            .find_by_id(&id)
            .await
            .map_err(UserError::ModifyPreferencesFailed)?
            .ok_or_else(|| UserError::UserNotFound(user_id.to_string()))?;

        user.set_preferences(preferences);

        self.users
            .update(&user)
            .await
            .map_err(UserError::ModifyPreferencesFailed)?;

        self.audit
            .append(&AuditRecord::info(
                id.as_uuid(),
                "user.preferences_modified",
                "user preferences modified",
            ))
            .await
            .map_err(UserError::ModifyPreferencesFailed)?;

        self.publisher
            .publish(&ActivityEvent::new(&id, ACTION_PREFERENCES_MODIFIED))
            .await
            .map_err(UserError::PublishFailed)?;

        tracing::info!(user_id = %id, "User preferences modified");
        Ok(())
    }
}

/// Publishes an ad-hoc activity event for a user.
///
/// Returns the message id so callers can correlate with the eventual
/// stored record.
pub struct RecordActivityHandler<P: ActivityPublisher> {
    publisher: Arc<P>,
}

impl<P: ActivityPublisher> RecordActivityHandler<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    pub async fn handle(&self, user_id: &str, action: &str) -> UserResult<Uuid> {
        let id = UserId::new(user_id)?;
        let event = ActivityEvent::new(&id, action);
        let message_id = event.message_id;

        self.publisher
            .publish(&event)
            .await
            .map_err(UserError::PublishFailed)?;

        tracing::debug!(user_id = %id, %message_id, action, "Activity event published");
        Ok(message_id)
    }
}
