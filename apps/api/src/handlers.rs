pub mod access;
pub mod audit;
pub mod balances;
pub mod health;
pub mod hierarchy;
pub mod presence;
pub mod users;
