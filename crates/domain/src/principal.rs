use serde::{Deserialize, Serialize};

use crate::{AdminRole, RoleFlags, UserId};

/// User record as seen by access resolution and administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    display_name: String,
    email: Option<String>,
    flags: RoleFlags,
}

impl Principal {
    /// Creates a principal from directory data.
    #[must_use]
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        flags: RoleFlags,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email,
            flags,
        }
    }

    /// Returns the principal id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the stored role flags.
    #[must_use]
    pub fn flags(&self) -> RoleFlags {
        self.flags
    }

    /// Returns the derived administrative role.
    #[must_use]
    pub fn role(&self) -> AdminRole {
        self.flags.role()
    }

    /// Returns a copy carrying the canonical flags of `role`.
    #[must_use]
    pub fn with_role(mut self, role: AdminRole) -> Self {
        self.flags = role.flags();
        self
    }
}
