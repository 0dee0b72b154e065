//! Value objects for the users domain.
//!
//! Each type wraps a single primitive, validates it on construction, and is
//! immutable afterwards. Validation failures name the offending field via
//! [`FieldError`].

use crate::error::FieldError;
use chrono::{Months, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// Minimum age in months (18 years).
const ADULT_AGE_MONTHS: u32 = 216;

/// User identity (UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an id from its string form.
    ///
    /// Empty and malformed inputs are distinct failures.
    pub fn new(value: &str) -> Result<Self, FieldError> {
        if value.trim().is_empty() {
            return Err(FieldError::MissingUserId);
        }
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| FieldError::InvalidUserId(value.to_string()))
    }

    /// Generate a fresh identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role identity (UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleId(Uuid);

impl RoleId {
    pub fn new(value: &str) -> Result<Self, FieldError> {
        if value.trim().is_empty() {
            return Err(FieldError::MissingRoleId);
        }
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| FieldError::InvalidRoleId(value.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User's first name. Must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstName(String);

impl FirstName {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingFirstName);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FirstName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User's last name. Must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastName(String);

impl LastName {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingLastName);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LastName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Date of birth.
///
/// Must not be in the future and the holder must be at least 18 years old
/// at construction time. The boundary is inclusive: someone born exactly
/// 18 years ago today is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    pub fn new(value: NaiveDate) -> Result<Self, FieldError> {
        let today = Utc::now().date_naive();
        if value > today {
            return Err(FieldError::FutureBirthDate);
        }
        let cutoff = today - Months::new(ADULT_AGE_MONTHS);
        if value > cutoff {
            return Err(FieldError::Underage);
        }
        Ok(Self(value))
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address. Must be non-blank and contain an `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingEmail);
        }
        if !value.contains('@') {
            return Err(FieldError::InvalidEmail(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phone number. Must be non-blank; no format is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone(String);

impl Phone {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingPhone);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Postal address. Must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingAddress);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile photo URL. Optional in practice, so any string is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoUrl(String);

impl PhotoUrl {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role display name. Must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleName(String);

impl RoleName {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingRoleName);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External identity-provider key for a role. Must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleKey(String);

impl RoleKey {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(FieldError::MissingRoleKey);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User preference tags. Any list is accepted; duplicates are not collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences(Vec<String>);

impl Preferences {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_id_empty_vs_malformed() {
        assert_eq!(UserId::new("").unwrap_err(), FieldError::MissingUserId);
        assert_eq!(UserId::new("   ").unwrap_err(), FieldError::MissingUserId);
        assert!(matches!(
            UserId::new("not-a-uuid").unwrap_err(),
            FieldError::InvalidUserId(_)
        ));

        let id = UserId::new("8f14e45f-ceea-4f3a-9a3c-1c2d4e5f6a7b").unwrap();
        assert_eq!(id.to_string(), "8f14e45f-ceea-4f3a-9a3c-1c2d4e5f6a7b");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_role_id_variants_are_role_specific() {
        assert_eq!(RoleId::new("").unwrap_err(), FieldError::MissingRoleId);
        assert!(matches!(
            RoleId::new("xyz").unwrap_err(),
            FieldError::InvalidRoleId(_)
        ));
    }

    #[test]
    fn test_names_reject_blank() {
        assert_eq!(
            FirstName::new("  ").unwrap_err(),
            FieldError::MissingFirstName
        );
        assert_eq!(LastName::new("").unwrap_err(), FieldError::MissingLastName);
        assert_eq!(FirstName::new("Ada").unwrap().as_str(), "Ada");
    }

    #[test]
    fn test_birth_date_future_rejected() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        assert_eq!(
            BirthDate::new(tomorrow).unwrap_err(),
            FieldError::FutureBirthDate
        );
    }

    #[test]
    fn test_birth_date_exactly_eighteen_is_valid() {
        let today = Utc::now().date_naive();
        let exactly_18 = today - Months::new(216);
        assert!(BirthDate::new(exactly_18).is_ok());
    }

    #[test]
    fn test_birth_date_one_day_short_is_underage() {
        let today = Utc::now().date_naive();
        let not_quite_18 = today - Months::new(216) + Duration::days(1);
        assert_eq!(
            BirthDate::new(not_quite_18).unwrap_err(),
            FieldError::Underage
        );
    }

    #[test]
    fn test_birth_date_adult_is_valid() {
        let forty_years_ago = Utc::now().date_naive() - Months::new(480);
        assert!(BirthDate::new(forty_years_ago).is_ok());
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(Email::new("").unwrap_err(), FieldError::MissingEmail);
        assert!(matches!(
            Email::new("no-at-sign").unwrap_err(),
            FieldError::InvalidEmail(_)
        ));
        assert_eq!(Email::new("a@b.c").unwrap().as_str(), "a@b.c");
    }

    #[test]
    fn test_phone_and_address_reject_blank() {
        assert_eq!(Phone::new(" ").unwrap_err(), FieldError::MissingPhone);
        assert_eq!(Address::new("").unwrap_err(), FieldError::MissingAddress);
    }

    #[test]
    fn test_photo_url_accepts_empty() {
        assert_eq!(PhotoUrl::new("").as_str(), "");
        assert_eq!(
            PhotoUrl::new("https://cdn.example/pic.png").as_str(),
            "https://cdn.example/pic.png"
        );
    }

    #[test]
    fn test_preferences_keep_duplicates() {
        let prefs = Preferences::new(vec!["news".into(), "news".into()]);
        assert_eq!(prefs.as_slice().len(), 2);
    }

    #[test]
    fn test_role_key_rejects_blank() {
        assert_eq!(RoleKey::new("").unwrap_err(), FieldError::MissingRoleKey);
        assert_eq!(RoleKey::new("kc-admin").unwrap().as_str(), "kc-admin");
    }
}
