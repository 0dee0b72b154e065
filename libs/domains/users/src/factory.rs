//! Factories assembling aggregates from raw primitives.
//!
//! Two paths with distinct intent:
//! - `create` gates new input: it generates a fresh identity and runs every
//!   value-object constructor, failing on the first invalid field.
//! - `rehydrate` assembles an aggregate from storage-derived primitives with
//!   the supplied identity; constructors still run as a consistency check.

use crate::error::FieldError;
use crate::role::Role;
use crate::user::User;
use crate::values::{
    Address, BirthDate, Email, FirstName, LastName, Phone, PhotoUrl, Preferences, RoleId, RoleKey,
    RoleName, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Input for creating a brand-new user. No identity yet.
#[derive(Debug, Clone)]
pub struct NewUser {
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

/// Primitives read back from storage for an existing user.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: String,
    pub role_id: String,
    pub preferences: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Primitives read back from storage for a role.
#[derive(Debug, Clone)]
pub struct StoredRole {
    pub id: String,
    pub name: String,
    pub key: Option<String>,
}

pub struct UserFactory;

impl UserFactory {
    /// Validate new input and build a user with a fresh identity.
    ///
    /// The first invalid field wins; nothing is persisted here.
    pub fn create(input: NewUser) -> Result<User, FieldError> {
        let now = Utc::now();
        Ok(User::from_parts(
            UserId::generate(),
            FirstName::new(input.first_name)?,
            LastName::new(input.last_name)?,
            BirthDate::new(input.birth_date)?,
            Email::new(input.email)?,
            Phone::new(input.phone)?,
            Address::new(input.address)?,
            PhotoUrl::new(input.photo_url),
            RoleId::new(&input.role_id)?,
            Preferences::new(input.preferences),
            now,
            now,
        ))
    }

    /// Assemble a user from stored primitives, keeping the stored identity.
    pub fn rehydrate(input: StoredUser) -> Result<User, FieldError> {
        Ok(User::from_parts(
            UserId::new(&input.id)?,
            FirstName::new(input.first_name)?,
            LastName::new(input.last_name)?,
            BirthDate::new(input.birth_date)?,
            Email::new(input.email)?,
            Phone::new(input.phone)?,
            Address::new(input.address)?,
            PhotoUrl::new(input.photo_url),
            RoleId::new(&input.role_id)?,
            Preferences::new(input.preferences),
            input.created_at,
            input.updated_at,
        ))
    }
}

pub struct RoleFactory;

impl RoleFactory {
    /// Assemble a role from stored primitives.
    pub fn rehydrate(input: StoredRole) -> Result<Role, FieldError> {
        let key = input.key.map(RoleKey::new).transpose()?;
        Ok(Role::from_parts(
            RoleId::new(&input.id)?,
            RoleName::new(input.name)?,
            key,
        ))
    }
}
