use serde::{Deserialize, Serialize};
use tierscope_domain::UserAssignment;
use ts_rs::TS;

/// Incoming payload for assignment creation and removal.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-request.ts"
)]
pub struct AssignmentRequest {
    pub manager_id: String,
    pub user_id: String,
}

/// API representation of an assignment edge.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-response.ts"
)]
pub struct AssignmentResponse {
    pub manager_id: String,
    pub user_id: String,
    pub assigned_by: String,
    pub created_at: String,
}

impl From<UserAssignment> for AssignmentResponse {
    fn from(assignment: UserAssignment) -> Self {
        Self {
            manager_id: assignment.manager_id.to_string(),
            user_id: assignment.assigned_user_id.to_string(),
            assigned_by: assignment.assigned_by.to_string(),
            created_at: assignment.created_at.to_rfc3339(),
        }
    }
}
