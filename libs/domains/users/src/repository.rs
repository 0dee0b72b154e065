//! Repository traits and in-memory implementations.
//!
//! The traits are the seams between handlers and storage; the MongoDB
//! implementations live in [`crate::mongo`], and the in-memory ones here
//! back unit and integration tests.

use crate::activity::{ActivityRecord, AuditRecord};
use crate::error::RepositoryError;
use crate::role::Role;
use crate::user::User;
use crate::values::{RoleId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence for the [`User`] aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    /// Overwrite the mutable attributes of an existing user.
    ///
    /// A vanished user is logged and swallowed; the write is idempotent
    /// from the caller's point of view.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
}

/// Read-only access to roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Role>, RepositoryError>;
}

/// Append-only store of user-activity records.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn append(&self, record: &ActivityRecord) -> Result<(), RepositoryError>;
    /// Records for one user with a timestamp at or after `since`.
    async fn for_user_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<ActivityRecord>, RepositoryError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError>;
}

/// In-memory user store keyed by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        self.users
            .write()
            .await
            .insert(user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email().as_str() == email)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id().as_uuid()) {
            Some(existing) => *existing = user.clone(),
            None => {
                tracing::warn!(user_id = %user.id(), "Update matched no stored user");
            }
        }
        Ok(())
    }
}

/// In-memory role store, seeded through [`InMemoryRoleRepository::insert`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<HashMap<Uuid, Role>>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, role: Role) {
        self.roles.write().await.insert(role.id().as_uuid(), role);
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.read().await.get(&id.as_uuid()).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|r| r.name().as_str() == name)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.roles.read().await.values().cloned().collect())
    }
}

/// In-memory activity log.
#[derive(Debug, Default, Clone)]
pub struct InMemoryActivityRepository {
    records: Arc<RwLock<Vec<ActivityRecord>>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn append(&self, record: &ActivityRecord) -> Result<(), RepositoryError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn for_user_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id.as_uuid() && r.timestamp >= since)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<ActivityRecord>, RepositoryError> {
        Ok(self.records.read().await.clone())
    }
}

/// In-memory audit trail with an accessor for assertions.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditRepository {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{NewUser, RoleFactory, StoredRole, UserFactory};
    use chrono::Duration;

    fn sample_user(email: &str) -> User {
        UserFactory::create(NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            email: email.into(),
            phone: "+44 20 7946 0000".into(),
            address: "12 St James's Square, London".into(),
            photo_url: "".into(),
            role_id: Uuid::new_v4().to_string(),
            preferences: vec![],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("ada@example.com");
        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(user.id()).await.unwrap();
        assert_eq!(by_id.as_ref().map(|u| u.id()), Some(user.id()));

        let by_email = repo.find_by_email("ada@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_is_swallowed() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("ghost@example.com");
        repo.update(&user).await.unwrap();
        assert!(repo.find_by_id(user.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_lookup_by_name() {
        let repo = InMemoryRoleRepository::new();
        let role = RoleFactory::rehydrate(StoredRole {
            id: Uuid::new_v4().to_string(),
            name: "admin".into(),
            key: Some("kc-admin".into()),
        })
        .unwrap();
        repo.insert(role.clone()).await;

        let found = repo.find_by_name("admin").await.unwrap();
        assert_eq!(found, Some(role));
        assert!(repo.find_by_name("viewer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_activity_window_filters_by_user_and_time() {
        let repo = InMemoryActivityRepository::new();
        let user_id = UserId::generate();
        let other_id = UserId::generate();
        let now = Utc::now();

        let old = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: user_id.as_uuid(),
            action: "login".into(),
            timestamp: now - Duration::days(2),
        };
        let recent = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: user_id.as_uuid(),
            action: "profile modified".into(),
            timestamp: now,
        };
        let foreign = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: other_id.as_uuid(),
            action: "login".into(),
            timestamp: now,
        };
        for record in [&old, &recent, &foreign] {
            repo.append(record).await.unwrap();
        }

        let since = now - Duration::hours(1);
        let window = repo.for_user_since(&user_id, since).await.unwrap();
        assert_eq!(window, vec![recent]);
    }

    #[tokio::test]
    async fn test_since_boundary_is_inclusive() {
        let repo = InMemoryActivityRepository::new();
        let user_id = UserId::generate();
        let at = Utc::now();

        let record = ActivityRecord {
            id: Uuid::new_v4(),
            user_id: user_id.as_uuid(),
            action: "login".into(),
            timestamp: at,
        };
        repo.append(&record).await.unwrap();

        assert_eq!(repo.for_user_since(&user_id, at).await.unwrap().len(), 1);
    }
}
