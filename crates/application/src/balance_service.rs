use std::sync::Arc;

use rust_decimal::Decimal;
use tierscope_core::{AppError, AppResult, UserIdentity};
use tierscope_domain::{AdminRole, AuditAction, Currency, UserId};
use tracing::info;

use crate::{
    AccessService, AdjustBalanceInput, AuditEvent, AuditRepository, BalanceAdjustment,
    BalanceEntry, BalanceRepository, BalanceTransfer, append_committed_event,
};

const MAX_NOTE_LENGTH: usize = 500;
const MAX_TRANSFER_LIMIT: usize = 200;

const ADMINISTRATIVE_ROLES: &[AdminRole] = &[
    AdminRole::FullAdmin,
    AdminRole::SuperiorManager,
    AdminRole::Manager,
];

/// Application service for per-user balances.
#[derive(Clone)]
pub struct BalanceService {
    access_service: AccessService,
    repository: Arc<dyn BalanceRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl BalanceService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        repository: Arc<dyn BalanceRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            repository,
            audit_repository,
        }
    }

    /// Returns one entry per tracked currency, zero for untouched accounts.
    pub async fn list_balances(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<BalanceEntry>> {
        self.access_service.require_access(actor, user_id).await?;

        let stored = self.repository.list_balances(user_id).await?;
        Ok(Currency::all()
            .iter()
            .map(|currency| {
                stored
                    .iter()
                    .find(|entry| entry.currency == *currency)
                    .cloned()
                    .unwrap_or(BalanceEntry {
                        user_id,
                        currency: *currency,
                        amount: Decimal::ZERO,
                        updated_at: None,
                    })
            })
            .collect())
    }

    /// Applies a signed adjustment to one account.
    pub async fn adjust_balance(
        &self,
        actor: &UserIdentity,
        input: AdjustBalanceInput,
    ) -> AppResult<BalanceTransfer> {
        let principal = self
            .access_service
            .require_role(actor, ADMINISTRATIVE_ROLES)
            .await?;
        self.access_service
            .require_access(actor, input.user_id)
            .await?;

        let note = normalize_note(input.note)?;
        let transfer = self
            .repository
            .apply_adjustment(BalanceAdjustment {
                user_id: input.user_id,
                currency: input.currency,
                delta: input.delta,
                performed_by: principal.id(),
                note,
            })
            .await?;

        append_committed_event(
            self.audit_repository.as_ref(),
            AuditEvent {
                subject: principal.id().to_string(),
                action: AuditAction::BalanceAdjusted,
                resource_type: "user_balance".to_owned(),
                resource_id: format!("{}:{}", transfer.user_id, transfer.currency.as_str()),
                detail: Some(format!(
                    "applied {} {}, balance is now {}",
                    transfer.delta,
                    transfer.currency.as_str(),
                    transfer.balance_after
                )),
            },
        )
        .await;

        info!(
            actor_id = %principal.id(),
            user_id = %transfer.user_id,
            currency = transfer.currency.as_str(),
            delta = %transfer.delta,
            "balance adjusted"
        );

        Ok(transfer)
    }

    /// Lists the newest transfers of one account owner.
    pub async fn list_transfers(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<BalanceTransfer>> {
        self.access_service.require_access(actor, user_id).await?;

        self.repository
            .list_transfers(user_id, limit.clamp(1, MAX_TRANSFER_LIMIT))
            .await
    }
}

fn normalize_note(note: Option<String>) -> AppResult<Option<String>> {
    let Some(note) = note else {
        return Ok(None);
    };

    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(AppError::Validation(format!(
            "note must be at most {MAX_NOTE_LENGTH} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}
