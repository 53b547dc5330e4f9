use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a session is opened for a principal.
    SessionStarted,
    /// Emitted when an assignment edge is created.
    HierarchyAssignmentCreated,
    /// Emitted when an assignment edge is removed.
    HierarchyAssignmentRemoved,
    /// Emitted when a user's role flags change.
    UserRoleUpdated,
    /// Emitted when a balance adjustment is applied.
    BalanceAdjusted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "session.started",
            Self::HierarchyAssignmentCreated => "hierarchy.assignment.created",
            Self::HierarchyAssignmentRemoved => "hierarchy.assignment.removed",
            Self::UserRoleUpdated => "user.role.updated",
            Self::BalanceAdjusted => "balance.adjusted",
        }
    }
}
