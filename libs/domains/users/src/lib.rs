//! Users domain: aggregates, validation, command/query handlers, and the
//! activity-audit pipeline.
//!
//! Layout follows the write/read split:
//! - [`values`], [`user`], [`role`], [`factory`] — the domain model
//! - [`repository`] — storage traits plus in-memory implementations
//! - [`mongo`] — MongoDB implementations
//! - [`commands`], [`queries`] — handlers over the traits
//! - [`activity`] — event publishing and consumer-side processing

pub mod activity;
pub mod commands;
pub mod error;
pub mod factory;
pub mod mongo;
pub mod queries;
pub mod repository;
pub mod role;
pub mod user;
pub mod values;

pub use activity::{
    ActivityEvent, ActivityProcessor, ActivityPublisher, ActivityRecord, ActivityStream,
    AuditLevel, AuditRecord, InMemoryActivityPublisher, NatsActivityPublisher, PublishError,
};
pub use commands::{
    CreateUserHandler, CreateUserRequest, ModifyPreferencesHandler, ModifyUserHandler,
    RecordActivityHandler,
};
pub use error::{ErrorKind, FieldError, RepositoryError, UserError, UserResult};
pub use factory::{NewUser, RoleFactory, StoredRole, StoredUser, UserFactory};
pub use mongo::{
    MongoActivityRepository, MongoAuditRepository, MongoRoleRepository, MongoUserRepository,
};
pub use queries::{
    ActivityDto, GetAllRolesHandler, GetAllUsersHandler, GetRoleByIdHandler, GetRoleByNameHandler,
    GetUserActivityHandler, GetUserByEmailHandler, GetUserByIdHandler, RoleDto, UserDto,
};
pub use repository::{
    ActivityRepository, AuditRepository, InMemoryActivityRepository, InMemoryAuditRepository,
    InMemoryRoleRepository, InMemoryUserRepository, RoleRepository, UserRepository,
};
pub use role::Role;
pub use user::{User, UserPatch};
pub use values::{
    Address, BirthDate, Email, FirstName, LastName, Phone, PhotoUrl, Preferences, RoleId, RoleKey,
    RoleName, UserId,
};
