use serde::{Deserialize, Serialize};
use tierscope_application::{PresenceEntry, PresenceRecord};
use ts_rs::TS;

/// Incoming heartbeat payload.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/heartbeat-request.ts"
)]
pub struct HeartbeatRequest {
    pub status: String,
}

/// API representation of one user's presence.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/presence-response.ts"
)]
pub struct PresenceResponse {
    pub user_id: String,
    pub status: String,
    pub last_seen_at: String,
}

impl From<PresenceEntry> for PresenceResponse {
    fn from(entry: PresenceEntry) -> Self {
        Self {
            user_id: entry.user_id.to_string(),
            status: entry.status.as_str().to_owned(),
            last_seen_at: entry.last_seen_at.to_rfc3339(),
        }
    }
}

impl From<PresenceRecord> for PresenceResponse {
    fn from(record: PresenceRecord) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            status: record.status.as_str().to_owned(),
            last_seen_at: record.last_seen_at.to_rfc3339(),
        }
    }
}
