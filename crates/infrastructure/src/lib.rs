//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_scope_cache;
mod in_memory_activity_repository;
mod in_memory_directory_repository;
mod postgres_audit_repository;
mod postgres_balance_repository;
mod postgres_directory_repository;
mod postgres_presence_repository;

pub use in_memory_access_scope_cache::InMemoryAccessScopeCache;
pub use in_memory_activity_repository::InMemoryActivityRepository;
pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_balance_repository::PostgresBalanceRepository;
pub use postgres_directory_repository::PostgresDirectoryRepository;
pub use postgres_presence_repository::PostgresPresenceRepository;
