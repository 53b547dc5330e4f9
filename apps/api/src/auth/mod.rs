mod bootstrap;
mod session;

pub use bootstrap::session_bootstrap_handler;
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Session creation timestamp, unix seconds.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";

#[cfg(test)]
mod tests;
