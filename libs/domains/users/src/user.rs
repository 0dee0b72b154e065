//! The `User` aggregate and its patch type.

use crate::error::FieldError;
use crate::values::{
    Address, BirthDate, Email, FirstName, LastName, Phone, PhotoUrl, Preferences, RoleId, UserId,
};
use chrono::{DateTime, Utc};

/// A registered user.
///
/// Owns its value objects; state changes only through [`User::apply_patch`]
/// and [`User::set_preferences`]. Construction goes through
/// [`UserFactory`](crate::factory::UserFactory).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    first_name: FirstName,
    last_name: LastName,
    birth_date: BirthDate,
    email: Email,
    phone: Phone,
    address: Address,
    photo_url: PhotoUrl,
    role_id: RoleId,
    preferences: Preferences,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: UserId,
        first_name: FirstName,
        last_name: LastName,
        birth_date: BirthDate,
        email: Email,
        phone: Phone,
        address: Address,
        photo_url: PhotoUrl,
        role_id: RoleId,
        preferences: Preferences,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            birth_date,
            email,
            phone,
            address,
            photo_url,
            role_id,
            preferences,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    pub fn birth_date(&self) -> &BirthDate {
        &self.birth_date
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn photo_url(&self) -> &PhotoUrl {
        &self.photo_url
    }

    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial update.
    ///
    /// Every present field is re-validated through its value-object
    /// constructor before anything is assigned, so a failing patch leaves
    /// the aggregate untouched. Absent fields are left as they are.
    pub fn apply_patch(&mut self, patch: &UserPatch) -> Result<(), FieldError> {
        let first_name = patch
            .first_name
            .as_deref()
            .map(FirstName::new)
            .transpose()?;
        let last_name = patch.last_name.as_deref().map(LastName::new).transpose()?;
        let phone = patch.phone.as_deref().map(Phone::new).transpose()?;
        let address = patch.address.as_deref().map(Address::new).transpose()?;
        let photo_url = patch.photo_url.as_deref().map(PhotoUrl::new);

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(photo_url) = photo_url {
            self.photo_url = photo_url;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the preference list wholesale.
    pub fn set_preferences(&mut self, preferences: Vec<String>) {
        self.preferences = Preferences::new(preferences);
        self.updated_at = Utc::now();
    }
}

/// Partial update for the mutable attributes of a [`User`].
///
/// A `None` field means "leave unchanged"; there is no sentinel value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
}

impl UserPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.photo_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{NewUser, UserFactory};

    fn sample_user() -> User {
        UserFactory::create(NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            email: "ada@example.com".into(),
            phone: "+44 20 7946 0000".into(),
            address: "12 St James's Square, London".into(),
            photo_url: "".into(),
            role_id: uuid::Uuid::new_v4().to_string(),
            preferences: vec!["math".into()],
        })
        .unwrap()
    }

    #[test]
    fn test_apply_patch_updates_present_fields_only() {
        let mut user = sample_user();
        let before = user.clone();

        let patch = UserPatch {
            phone: Some("+44 20 7946 0958".into()),
            ..Default::default()
        };
        user.apply_patch(&patch).unwrap();

        assert_eq!(user.phone().as_str(), "+44 20 7946 0958");
        assert_eq!(user.first_name(), before.first_name());
        assert_eq!(user.last_name(), before.last_name());
        assert_eq!(user.address(), before.address());
        assert_eq!(user.email(), before.email());
    }

    #[test]
    fn test_failing_patch_leaves_aggregate_untouched() {
        let mut user = sample_user();
        let before = user.clone();

        let patch = UserPatch {
            first_name: Some("Grace".into()),
            phone: Some("  ".into()), // invalid
            ..Default::default()
        };

        assert!(user.apply_patch(&patch).is_err());
        assert_eq!(user, before);
    }

    #[test]
    fn test_empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        assert!(!UserPatch {
            address: Some("new".into()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_set_preferences_replaces_wholesale() {
        let mut user = sample_user();
        user.set_preferences(vec!["poetry".into(), "music".into()]);
        assert_eq!(
            user.preferences().as_slice(),
            &["poetry".to_string(), "music".to_string()]
        );
    }

    #[test]
    fn test_patch_can_clear_photo() {
        let mut user = sample_user();
        user.apply_patch(&UserPatch {
            photo_url: Some("https://cdn.example/ada.png".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.photo_url().as_str(), "https://cdn.example/ada.png");

        user.apply_patch(&UserPatch {
            photo_url: Some("".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.photo_url().as_str(), "");
    }
}
