use serde::{Deserialize, Serialize};
use tierscope_domain::AccessScope;
use ts_rs::TS;

/// Incoming payload for bootstrap-token session creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-bootstrap-request.ts"
)]
pub struct SessionBootstrapRequest {
    pub user_id: String,
    pub token: String,
}

/// API representation of a resolved access scope.
///
/// `kind` is authoritative. `user_ids` is empty for both `unrestricted`
/// and `denied`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-scope-response.ts"
)]
pub struct AccessScopeResponse {
    pub kind: String,
    pub user_ids: Vec<String>,
    pub reason: Option<String>,
}

/// API representation of the authenticated principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/me-response.ts"
)]
pub struct MeResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub scope: AccessScopeResponse,
}

impl From<AccessScope> for AccessScopeResponse {
    fn from(scope: AccessScope) -> Self {
        let reason = match &scope {
            AccessScope::Degraded { reason, .. } => Some(reason.clone()),
            _ => None,
        };

        Self {
            kind: scope.kind().to_owned(),
            user_ids: scope
                .legacy_ids()
                .into_iter()
                .map(|user_id| user_id.to_string())
                .collect(),
            reason,
        }
    }
}
