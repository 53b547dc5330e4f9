mod access;
mod audit;
mod balances;
mod common;
mod hierarchy;
mod presence;
mod users;

pub use access::{AccessScopeResponse, MeResponse, SessionBootstrapRequest};
pub use audit::AuditLogEntryResponse;
pub use balances::{AdjustBalanceRequest, BalanceResponse, BalanceTransferResponse};
pub use common::HealthResponse;
pub use hierarchy::{AssignmentRequest, AssignmentResponse};
pub use presence::{HeartbeatRequest, PresenceResponse};
pub use users::{SetUserRoleRequest, UserResponse};
