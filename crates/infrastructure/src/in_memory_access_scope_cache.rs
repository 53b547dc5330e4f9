use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tierscope_application::AccessScopeCache;
use tierscope_core::AppResult;
use tierscope_domain::{AccessScope, UserId};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ScopeCacheEntry {
    scope: AccessScope,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct ScopeCacheState {
    generation: u64,
    entries: HashMap<UserId, ScopeCacheEntry>,
}

/// Process-wide access scope cache shared by every admin surface.
///
/// Writes carry the generation read before resolution started. Invalidation
/// advances the generation under the same lock, so a write that raced it is
/// discarded.
#[derive(Default)]
pub struct InMemoryAccessScopeCache {
    state: RwLock<ScopeCacheState>,
}

impl InMemoryAccessScopeCache {
    /// Creates an empty scope cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessScopeCache for InMemoryAccessScopeCache {
    async fn get_scope(&self, principal_id: UserId) -> AppResult<Option<AccessScope>> {
        {
            let state = self.state.read().await;
            match state.entries.get(&principal_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.scope.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut state = self.state.write().await;
        if state
            .entries
            .get(&principal_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            state.entries.remove(&principal_id);
        }

        Ok(None)
    }

    async fn generation(&self) -> AppResult<u64> {
        Ok(self.state.read().await.generation)
    }

    async fn set_scope(
        &self,
        principal_id: UserId,
        scope: AccessScope,
        ttl_seconds: u32,
        generation: u64,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut state = self.state.write().await;
        if state.generation != generation {
            return Ok(());
        }
        state
            .entries
            .insert(principal_id, ScopeCacheEntry { scope, expires_at });

        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
        Ok(())
    }
}
