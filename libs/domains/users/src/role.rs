//! The `Role` aggregate.

use crate::values::{RoleId, RoleKey, RoleName};

/// A role a user can hold.
///
/// Read-only in this service; roles are provisioned out of band and only
/// rehydrated here (see [`RoleFactory`](crate::factory::RoleFactory)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: RoleId,
    name: RoleName,
    key: Option<RoleKey>,
}

impl Role {
    pub(crate) fn from_parts(id: RoleId, name: RoleName, key: Option<RoleKey>) -> Self {
        Self { id, name, key }
    }

    pub fn id(&self) -> &RoleId {
        &self.id
    }

    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// External identity-provider key, if the role is linked to one.
    pub fn key(&self) -> Option<&RoleKey> {
        self.key.as_ref()
    }
}
