use std::sync::Arc;

use async_trait::async_trait;

use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{AccessScope, AdminRole, Principal, UserId};
use tracing::debug;

use crate::{AccessResolver, DirectoryRepository};

/// Shared cache port for resolved access scopes.
#[async_trait]
pub trait AccessScopeCache: Send + Sync {
    /// Returns the cached scope for one principal.
    async fn get_scope(&self, principal_id: UserId) -> AppResult<Option<AccessScope>>;

    /// Returns the current invalidation generation.
    async fn generation(&self) -> AppResult<u64>;

    /// Stores a scope resolved at `generation` with ttl.
    ///
    /// The write is dropped when `invalidate_all` ran after `generation` was
    /// read, so a resolution that raced a mutation never repopulates the cache.
    async fn set_scope(
        &self,
        principal_id: UserId,
        scope: AccessScope,
        ttl_seconds: u32,
        generation: u64,
    ) -> AppResult<()>;

    /// Drops every cached scope and advances the generation.
    async fn invalidate_all(&self) -> AppResult<()>;
}

/// Entry point every admin surface uses to authorize against the hierarchy.
#[derive(Clone)]
pub struct AccessService {
    directory: Arc<dyn DirectoryRepository>,
    resolver: AccessResolver,
    cache: Arc<dyn AccessScopeCache>,
    cache_ttl_seconds: u32,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        cache: Arc<dyn AccessScopeCache>,
        cache_ttl_seconds: u32,
    ) -> Self {
        Self {
            resolver: AccessResolver::new(directory.clone()),
            directory,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Loads the acting principal with its current role flags.
    pub async fn current_principal(&self, actor: &UserIdentity) -> AppResult<Principal> {
        let principal_id = UserId::parse(actor.subject())
            .map_err(|_| AppError::Unauthorized("session subject is not a user id".to_owned()))?;

        self.registered_principal(principal_id).await
    }

    /// Loads a registered principal by id, `Unauthorized` when unknown.
    pub async fn registered_principal(&self, principal_id: UserId) -> AppResult<Principal> {
        self.directory
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(format!("principal '{principal_id}' is not registered"))
            })
    }

    /// Returns the access scope of the acting principal.
    pub async fn scope_for(&self, actor: &UserIdentity) -> AppResult<AccessScope> {
        let principal = self.current_principal(actor).await?;
        self.scope_for_principal(&principal).await
    }

    /// Returns the access scope of an already loaded principal.
    pub async fn scope_for_principal(&self, principal: &Principal) -> AppResult<AccessScope> {
        if let Some(scope) = self.cache.get_scope(principal.id()).await? {
            debug!(principal_id = %principal.id(), "access scope cache hit");
            return Ok(scope);
        }

        self.resolve_and_store(principal).await
    }

    /// Resolves the acting principal's scope while bypassing the cache.
    pub async fn refresh_scope(&self, actor: &UserIdentity) -> AppResult<AccessScope> {
        let principal = self.current_principal(actor).await?;
        self.resolve_and_store(&principal).await
    }

    /// Ensures the acting principal may access `target`.
    pub async fn require_access(
        &self,
        actor: &UserIdentity,
        target: UserId,
    ) -> AppResult<AccessScope> {
        let scope = self.scope_for(actor).await?;
        if !scope.allows(target) {
            return Err(AppError::Forbidden(format!(
                "you do not have access to user '{target}'"
            )));
        }

        Ok(scope)
    }

    /// Ensures the acting principal holds one of `allowed`.
    pub async fn require_role(
        &self,
        actor: &UserIdentity,
        allowed: &[AdminRole],
    ) -> AppResult<Principal> {
        let principal = self.current_principal(actor).await?;
        if !allowed.contains(&principal.role()) {
            return Err(AppError::Forbidden(format!(
                "role '{}' may not perform this action",
                principal.role().as_str()
            )));
        }

        Ok(principal)
    }

    /// Drops every cached scope after a hierarchy or role change.
    pub async fn invalidate_all(&self) -> AppResult<()> {
        self.cache.invalidate_all().await
    }

    async fn resolve_and_store(&self, principal: &Principal) -> AppResult<AccessScope> {
        let generation = self.cache.generation().await?;
        let scope = self.resolver.resolve(principal).await;

        if !scope.is_degraded() {
            self.cache
                .set_scope(
                    principal.id(),
                    scope.clone(),
                    self.cache_ttl_seconds,
                    generation,
                )
                .await?;
        }

        Ok(scope)
    }
}

#[cfg(test)]
mod tests;
