use serde::{Deserialize, Serialize};
use tierscope_domain::Principal;
use ts_rs::TS;

/// API representation of a directory user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
}

/// Incoming payload for role changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-user-role-request.ts"
)]
pub struct SetUserRoleRequest {
    pub role: String,
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.id().to_string(),
            display_name: principal.display_name().to_owned(),
            email: principal.email().map(ToOwned::to_owned),
            role: principal.role().as_str().to_owned(),
        }
    }
}
