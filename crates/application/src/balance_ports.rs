use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tierscope_core::AppResult;
use tierscope_domain::{BalanceDelta, Currency, UserId};

/// Current balance of one user in one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Account owner.
    pub user_id: UserId,
    /// Account currency.
    pub currency: Currency,
    /// Current amount.
    pub amount: Decimal,
    /// Last change, `None` when the account was never touched.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input payload for a balance adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustBalanceInput {
    /// Account owner.
    pub user_id: UserId,
    /// Account currency.
    pub currency: Currency,
    /// Signed amount to apply.
    pub delta: BalanceDelta,
    /// Optional operator note.
    pub note: Option<String>,
}

/// Validated adjustment handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceAdjustment {
    /// Account owner.
    pub user_id: UserId,
    /// Account currency.
    pub currency: Currency,
    /// Signed amount to apply.
    pub delta: BalanceDelta,
    /// Principal that performed the adjustment.
    pub performed_by: UserId,
    /// Trimmed operator note.
    pub note: Option<String>,
}

/// Ledger row written alongside every applied adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTransfer {
    /// Stable transfer identifier.
    pub transfer_id: String,
    /// Account owner.
    pub user_id: UserId,
    /// Account currency.
    pub currency: Currency,
    /// Applied signed amount.
    pub delta: Decimal,
    /// Balance right after the adjustment.
    pub balance_after: Decimal,
    /// Principal that performed the adjustment.
    pub performed_by: UserId,
    /// Operator note.
    pub note: Option<String>,
    /// Transfer timestamp.
    pub created_at: DateTime<Utc>,
}

/// Repository port for balances and their transfer ledger.
#[async_trait]
pub trait BalanceRepository: Send + Sync {
    /// Lists existing balance rows for one user.
    async fn list_balances(&self, user_id: UserId) -> AppResult<Vec<BalanceEntry>>;

    /// Applies one adjustment atomically and records the transfer.
    ///
    /// Returns `Conflict` when the balance would become negative.
    async fn apply_adjustment(&self, adjustment: BalanceAdjustment) -> AppResult<BalanceTransfer>;

    /// Lists the newest transfers of one user.
    async fn list_transfers(&self, user_id: UserId, limit: usize)
    -> AppResult<Vec<BalanceTransfer>>;
}
