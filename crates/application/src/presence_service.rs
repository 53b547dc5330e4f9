use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::PresenceStatus;

use crate::{AccessService, PresenceEntry, PresenceRecord, PresenceRepository};

/// Application service for client heartbeats and scoped presence views.
#[derive(Clone)]
pub struct PresenceService {
    access_service: AccessService,
    repository: Arc<dyn PresenceRepository>,
    online_window_seconds: u32,
}

impl PresenceService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        repository: Arc<dyn PresenceRepository>,
        online_window_seconds: u32,
    ) -> Self {
        Self {
            access_service,
            repository,
            online_window_seconds,
        }
    }

    /// Records a heartbeat for the acting principal.
    pub async fn heartbeat(
        &self,
        actor: &UserIdentity,
        status: PresenceStatus,
    ) -> AppResult<PresenceRecord> {
        let principal = self.access_service.current_principal(actor).await?;
        self.repository
            .upsert_presence(principal.id(), status, Utc::now())
            .await
    }

    /// Lists presence for every user in the acting principal's scope.
    pub async fn list_presence(&self, actor: &UserIdentity) -> AppResult<Vec<PresenceEntry>> {
        let scope = self.access_service.scope_for(actor).await?;
        if scope.is_denied() {
            return Err(AppError::Forbidden(
                "presence is only visible to administrators".to_owned(),
            ));
        }

        let records = match scope.id_filter() {
            None => self.repository.list_presence(None).await?,
            Some(user_ids) => self.repository.list_presence(Some(user_ids.as_slice())).await?,
        };

        let now = Utc::now();
        Ok(records
            .into_iter()
            .map(|record| self.effective_entry(record, now))
            .collect())
    }

    fn effective_entry(&self, record: PresenceRecord, now: DateTime<Utc>) -> PresenceEntry {
        let window = Duration::seconds(i64::from(self.online_window_seconds));
        let status = if now - record.last_seen_at > window {
            PresenceStatus::Offline
        } else {
            record.status
        };

        PresenceEntry {
            user_id: record.user_id,
            status,
            last_seen_at: record.last_seen_at,
        }
    }
}
