//! Application services and ports.

#![forbid(unsafe_code)]

mod access_resolver;
mod access_service;
mod audit_ports;
mod balance_ports;
mod balance_service;
mod directory_ports;
mod hierarchy_service;
mod presence_ports;
mod presence_service;
mod user_admin_service;

#[cfg(test)]
mod test_support;

pub use access_resolver::AccessResolver;
pub use access_service::{AccessScopeCache, AccessService};
pub use audit_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
};
pub use balance_ports::{
    AdjustBalanceInput, BalanceAdjustment, BalanceEntry, BalanceRepository, BalanceTransfer,
};
pub use balance_service::BalanceService;
use audit_ports::append_committed_event;
pub use directory_ports::{DirectoryRepository, HierarchyRepository, NewAssignment};
pub use hierarchy_service::HierarchyService;
pub use presence_ports::{PresenceEntry, PresenceRecord, PresenceRepository};
pub use presence_service::PresenceService;
pub use user_admin_service::UserAdminService;
