use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tierscope_core::AppError;

/// Presence state reported by a client heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Active in the last heartbeat window.
    Online,
    /// Connected but idle.
    Away,
    /// Not connected.
    Offline,
}

impl PresenceStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }
}

impl FromStr for PresenceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "offline" => Ok(Self::Offline),
            _ => Err(AppError::Validation(format!(
                "unknown presence status '{value}'"
            ))),
        }
    }
}
