//! Administrative role model.
//!
//! Users carry three independent boolean flags in storage. The effective role
//! is derived from their combination exactly once, here, and everything past
//! this boundary works with [`AdminRole`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tierscope_core::{AppError, AppResult};

/// Role flags as persisted on a user record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleFlags {
    /// Administrative access flag.
    pub is_admin: bool,
    /// Manager flag.
    pub is_manager: bool,
    /// Superior manager flag.
    pub is_superiormanager: bool,
}

impl RoleFlags {
    /// Creates a flag triple.
    #[must_use]
    pub fn new(is_admin: bool, is_manager: bool, is_superiormanager: bool) -> Self {
        Self {
            is_admin,
            is_manager,
            is_superiormanager,
        }
    }

    /// Returns true when no role flag is set.
    #[must_use]
    pub fn is_end_user(&self) -> bool {
        !self.is_admin && !self.is_manager && !self.is_superiormanager
    }

    /// Returns true when the flags describe a manager that may be governed by
    /// a superior manager.
    #[must_use]
    pub fn is_plain_manager(&self) -> bool {
        self.is_manager && !self.is_superiormanager
    }

    /// Returns the derived role.
    #[must_use]
    pub fn role(&self) -> AdminRole {
        AdminRole::from_flags(*self)
    }

    /// Returns true when the triple is exactly one written by [`AdminRole::flags`].
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.role().flags() == *self
    }
}

/// Effective administrative role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Unrestricted administrator.
    FullAdmin,
    /// Governs assigned managers and their assigned users.
    SuperiorManager,
    /// Governs directly assigned users.
    Manager,
    /// No administrative access.
    None,
}

impl AdminRole {
    /// Derives the role from stored flags.
    ///
    /// Overlapping combinations resolve in the order full administrator,
    /// superior manager, manager. A superior manager flag without the admin
    /// flag matches no pattern and yields [`AdminRole::None`].
    #[must_use]
    pub fn from_flags(flags: RoleFlags) -> Self {
        match (flags.is_admin, flags.is_manager, flags.is_superiormanager) {
            (true, false, false) => Self::FullAdmin,
            (true, _, true) => Self::SuperiorManager,
            (_, true, _) => Self::Manager,
            _ => Self::None,
        }
    }

    /// Returns the canonical flag triple for this role.
    ///
    /// Managers carry the admin flag as well, matching the auto-grant applied
    /// when a user is promoted.
    #[must_use]
    pub fn flags(&self) -> RoleFlags {
        match self {
            Self::FullAdmin => RoleFlags::new(true, false, false),
            Self::SuperiorManager => RoleFlags::new(true, false, true),
            Self::Manager => RoleFlags::new(true, true, false),
            Self::None => RoleFlags::default(),
        }
    }

    /// Returns true for roles that may use admin surfaces.
    #[must_use]
    pub fn is_administrative(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns a stable transport value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullAdmin => "full_admin",
            Self::SuperiorManager => "superior_manager",
            Self::Manager => "manager",
            Self::None => "none",
        }
    }

    /// Parses a transport value into a role.
    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for AdminRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "full_admin" => Ok(Self::FullAdmin),
            "superior_manager" => Ok(Self::SuperiorManager),
            "manager" => Ok(Self::Manager),
            "none" => Ok(Self::None),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}
