//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod assignment;
mod balance;
mod presence;
mod principal;
mod role;
mod security;
mod user;

pub use access::AccessScope;
pub use assignment::{AssignmentEdge, UserAssignment};
pub use balance::{BalanceDelta, Currency, MAX_AMOUNT};
pub use presence::PresenceStatus;
pub use principal::Principal;
pub use role::{AdminRole, RoleFlags};
pub use security::AuditAction;
pub use user::UserId;
