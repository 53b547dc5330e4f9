use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AdminRole, Principal, RoleFlags, UserId};

/// Directed edge stating that `manager_id` governs `assigned_user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssignment {
    /// Governing principal.
    pub manager_id: UserId,
    /// Governed principal.
    pub assigned_user_id: UserId,
    /// Principal that created the edge.
    pub assigned_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Semantic type of an assignment, derived from its endpoints.
///
/// The stored row has no type tag; the same relation carries both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentEdge {
    /// Superior manager governs a manager.
    SuperiorToManager,
    /// Manager governs an end user.
    ManagerToUser,
}

impl AssignmentEdge {
    /// Classifies an edge between two principals, if it is a valid one.
    #[must_use]
    pub fn classify(manager: &Principal, target: &Principal) -> Option<Self> {
        Self::classify_flags(manager.flags(), target.flags())
    }

    /// Classifies an edge from raw endpoint flags.
    #[must_use]
    pub fn classify_flags(manager: RoleFlags, target: RoleFlags) -> Option<Self> {
        match manager.role() {
            AdminRole::SuperiorManager if target.role() == AdminRole::Manager => {
                Some(Self::SuperiorToManager)
            }
            AdminRole::Manager if target.is_end_user() => Some(Self::ManagerToUser),
            _ => None,
        }
    }

    /// Returns a stable label for logs and audit details.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperiorToManager => "superior_to_manager",
            Self::ManagerToUser => "manager_to_user",
        }
    }
}
