use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tierscope_application::{BalanceEntry, BalanceTransfer};
use ts_rs::TS;

/// API representation of one currency balance. Amounts are decimal strings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/balance-response.ts"
)]
pub struct BalanceResponse {
    pub currency: String,
    pub amount: String,
    pub updated_at: Option<String>,
}

/// Incoming payload for a signed balance adjustment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/adjust-balance-request.ts"
)]
pub struct AdjustBalanceRequest {
    pub currency: String,
    pub delta: String,
    pub note: Option<String>,
}

/// API representation of a ledger row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/balance-transfer-response.ts"
)]
pub struct BalanceTransferResponse {
    pub transfer_id: String,
    pub user_id: String,
    pub currency: String,
    pub delta: String,
    pub balance_after: String,
    pub performed_by: String,
    pub note: Option<String>,
    pub created_at: String,
}

fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

impl From<BalanceEntry> for BalanceResponse {
    fn from(entry: BalanceEntry) -> Self {
        Self {
            currency: entry.currency.as_str().to_owned(),
            amount: format_amount(entry.amount),
            updated_at: entry.updated_at.map(|updated_at| updated_at.to_rfc3339()),
        }
    }
}

impl From<BalanceTransfer> for BalanceTransferResponse {
    fn from(transfer: BalanceTransfer) -> Self {
        Self {
            transfer_id: transfer.transfer_id,
            user_id: transfer.user_id.to_string(),
            currency: transfer.currency.as_str().to_owned(),
            delta: format_amount(transfer.delta),
            balance_after: format_amount(transfer.balance_after),
            performed_by: transfer.performed_by.to_string(),
            note: transfer.note,
            created_at: transfer.created_at.to_rfc3339(),
        }
    }
}
