use thiserror::Error;

/// Validation failure for a single field value.
///
/// Raised by value-object constructors; the variant names the field so the
/// caller can report exactly what was rejected. These are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("user id is required")]
    MissingUserId,

    #[error("user id '{0}' is not a valid UUID")]
    InvalidUserId(String),

    #[error("first name is required")]
    MissingFirstName,

    #[error("last name is required")]
    MissingLastName,

    #[error("birth date cannot be in the future")]
    FutureBirthDate,

    #[error("user must be at least 18 years old")]
    Underage,

    #[error("email is required")]
    MissingEmail,

    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),

    #[error("phone number is required")]
    MissingPhone,

    #[error("address is required")]
    MissingAddress,

    #[error("role id is required")]
    MissingRoleId,

    #[error("role id '{0}' is not a valid UUID")]
    InvalidRoleId(String),

    #[error("role name is required")]
    MissingRoleName,

    #[error("role key is required")]
    MissingRoleKey,
}

/// Error raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// MongoDB driver error
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A stored document failed rehydration into a domain aggregate
    #[error("stored document is invalid: {0}")]
    Corrupt(#[source] FieldError),
}

/// Classification of a [`UserError`] for upstream callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied invalid data; never retried
    Validation,
    /// The addressed entity does not exist
    NotFound,
    /// The operation conflicts with existing state
    Conflict,
    /// Store or transport fault; the operation itself may be sound
    Infrastructure,
}

/// Umbrella error for user-registry operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("role '{0}' not found")]
    RoleNotFound(String),

    #[error("no role named '{0}'")]
    RoleNameNotFound(String),

    #[error("no user with email '{0}'")]
    EmailNotFound(String),

    #[error("email '{0}' is already registered")]
    EmailAlreadyExists(String),

    #[error("failed to create user")]
    CreateUserFailed(#[source] RepositoryError),

    #[error("failed to modify user")]
    ModifyUserFailed(#[source] RepositoryError),

    #[error("failed to modify preferences")]
    ModifyPreferencesFailed(#[source] RepositoryError),

    #[error("failed to publish activity event")]
    PublishFailed(#[source] crate::activity::PublishError),

    #[error("query failed")]
    QueryFailed(#[source] RepositoryError),
}

impl UserError {
    /// Classify the error so callers can map outcomes without matching
    /// individual variants.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::Field(_) => ErrorKind::Validation,
            UserError::UserNotFound(_)
            | UserError::RoleNotFound(_)
            | UserError::RoleNameNotFound(_)
            | UserError::EmailNotFound(_) => ErrorKind::NotFound,
            UserError::EmailAlreadyExists(_) => ErrorKind::Conflict,
            UserError::CreateUserFailed(_)
            | UserError::ModifyUserFailed(_)
            | UserError::ModifyPreferencesFailed(_)
            | UserError::PublishFailed(_)
            | UserError::QueryFailed(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type UserResult<T> = Result<T, UserError>;
