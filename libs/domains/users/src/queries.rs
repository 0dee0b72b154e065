//! Query handlers and their DTOs.
//!
//! Queries return plain serializable DTOs rather than aggregates, so
//! transport layers never touch value objects directly.

use crate::activity::ActivityRecord;
use crate::error::{UserError, UserResult};
use crate::repository::{ActivityRepository, RoleRepository, UserRepository};
use crate::role::Role;
use crate::user::User;
use crate::values::{RoleId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Read model for a user.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: String,
    pub role_id: Uuid,
    pub preferences: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_uuid(),
            first_name: user.first_name().as_str().to_string(),
            last_name: user.last_name().as_str().to_string(),
            birth_date: user.birth_date().as_date(),
            email: user.email().as_str().to_string(),
            phone: user.phone().as_str().to_string(),
            address: user.address().as_str().to_string(),
            photo_url: user.photo_url().as_str().to_string(),
            role_id: user.role_id().as_uuid(),
            preferences: user.preferences().to_vec(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Read model for a role.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleDto {
    pub id: Uuid,
    pub name: String,
    pub key: Option<String>,
}

impl From<&Role> for RoleDto {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id().as_uuid(),
            name: role.name().as_str().to_string(),
            key: role.key().map(|k| k.as_str().to_string()),
        }
    }
}

/// Read model for an activity record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ActivityRecord> for ActivityDto {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            action: record.action.clone(),
            timestamp: record.timestamp,
        }
    }
}

pub struct GetUserByIdHandler<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> GetUserByIdHandler<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, user_id: &str) -> UserResult<UserDto> {
        let id = UserId::new(user_id)?;
        let user = self
            .users
            .find_by_id(&id)
            .await
            .map_err(UserError::QueryFailed)?
            .ok_or_else(|| UserError::UserNotFound(user_id.to_string()))?;
        Ok(UserDto::from(&user))
    }
}

pub struct GetUserByEmailHandler<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> GetUserByEmailHandler<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, email: &str) -> UserResult<UserDto> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(UserError::QueryFailed)?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))?;
        Ok(UserDto::from(&user))
    }
}

pub struct GetAllUsersHandler<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> GetAllUsersHandler<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn handle(&self) -> UserResult<Vec<UserDto>> {
        let users = self
            .users
            .find_all()
            .await
            .map_err(UserError::QueryFailed)?;
        Ok(users.iter().map(UserDto::from).collect())
    }
}

pub struct GetRoleByIdHandler<R: RoleRepository> {
    roles: Arc<R>,
}

impl<R: RoleRepository> GetRoleByIdHandler<R> {
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }

    pub async fn handle(&self, role_id: &str) -> UserResult<RoleDto> {
        let id = RoleId::new(role_id)?;
        let role = self
            .roles
            .find_by_id(&id)
            .await
            .map_err(UserError::QueryFailed)?
            .ok_or_else(|| UserError::RoleNotFound(role_id.to_string()))?;
        Ok(RoleDto::from(&role))
    }
}

pub struct GetRoleByNameHandler<R: RoleRepository> {
    roles: Arc<R>,
}

impl<R: RoleRepository> GetRoleByNameHandler<R> {
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }

    pub async fn handle(&self, name: &str) -> UserResult<RoleDto> {
        let role = self
            .roles
            .find_by_name(name)
            .await
            .map_err(UserError::QueryFailed)?
            .ok_or_else(|| UserError::RoleNameNotFound(name.to_string()))?;
        Ok(RoleDto::from(&role))
    }
}

pub struct GetAllRolesHandler<R: RoleRepository> {
    roles: Arc<R>,
}

impl<R: RoleRepository> GetAllRolesHandler<R> {
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }

    pub async fn handle(&self) -> UserResult<Vec<RoleDto>> {
        let roles = self
            .roles
            .find_all()
            .await
            .map_err(UserError::QueryFailed)?;
        Ok(roles.iter().map(RoleDto::from).collect())
    }
}

/// Lists a user's activity within a time window.
pub struct GetUserActivityHandler<A: ActivityRepository> {
    activity: Arc<A>,
}

impl<A: ActivityRepository> GetUserActivityHandler<A> {
    pub fn new(activity: Arc<A>) -> Self {
        Self { activity }
    }

    /// With no explicit `since`, the window starts at today's midnight UTC.
    pub async fn handle(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> UserResult<Vec<ActivityDto>> {
        let id = UserId::new(user_id)?;
        let since = since.unwrap_or_else(start_of_today);
        let records = self
            .activity
            .for_user_since(&id, since)
            .await
            .map_err(UserError::QueryFailed)?;
        Ok(records.iter().map(ActivityDto::from).collect())
    }
}

fn start_of_today() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}
