//! Resolved access scope of an acting principal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::UserId;

/// The set of user records a principal may read or mutate.
///
/// Each case is explicit. There is no empty-list encoding that means
/// "everything" for one caller and "nothing" for another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessScope {
    /// Full administrator: no filter applies.
    Unrestricted,
    /// Exact accessible set. Always contains the principal itself.
    Restricted {
        /// Accessible user ids.
        user_ids: BTreeSet<UserId>,
    },
    /// Principal has no administrative role.
    Denied,
    /// Resolution failed upstream; access is narrowed to the principal alone.
    Degraded {
        /// Principal whose resolution failed.
        principal: UserId,
        /// Failure description.
        reason: String,
    },
}

impl AccessScope {
    /// Builds a restricted scope from the principal and its reachable users.
    #[must_use]
    pub fn restricted(principal: UserId, reachable: impl IntoIterator<Item = UserId>) -> Self {
        let mut user_ids: BTreeSet<UserId> = reachable.into_iter().collect();
        user_ids.insert(principal);
        Self::Restricted { user_ids }
    }

    /// Builds the narrowest restricted scope, the principal alone.
    #[must_use]
    pub fn only_self(principal: UserId) -> Self {
        Self::restricted(principal, std::iter::empty())
    }

    /// Builds a degraded scope for a failed resolution.
    #[must_use]
    pub fn degraded(principal: UserId, reason: impl Into<String>) -> Self {
        Self::Degraded {
            principal,
            reason: reason.into(),
        }
    }

    /// Returns whether the scope grants access to `user_id`.
    #[must_use]
    pub fn allows(&self, user_id: UserId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted { user_ids } => user_ids.contains(&user_id),
            Self::Denied => false,
            Self::Degraded { principal, .. } => *principal == user_id,
        }
    }

    /// Returns true for the unrestricted scope.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns true for the denied scope.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    /// Returns true when resolution failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Returns the concrete id filter, or `None` when no filter applies.
    ///
    /// Denied scopes yield an empty filter, so a caller that applies the
    /// filter can never widen access by mistake.
    #[must_use]
    pub fn id_filter(&self) -> Option<Vec<UserId>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted { user_ids } => Some(user_ids.iter().copied().collect()),
            Self::Denied => Some(Vec::new()),
            Self::Degraded { principal, .. } => Some(vec![*principal]),
        }
    }

    /// Returns the historical list encoding of the scope.
    ///
    /// Both the unrestricted and the denied scope encode as an empty list.
    /// Only use this for display; never for authorization.
    #[must_use]
    pub fn legacy_ids(&self) -> Vec<UserId> {
        match self {
            Self::Unrestricted | Self::Denied => Vec::new(),
            Self::Restricted { user_ids } => user_ids.iter().copied().collect(),
            Self::Degraded { principal, .. } => vec![*principal],
        }
    }

    /// Returns a stable label for the scope kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Restricted { .. } => "restricted",
            Self::Denied => "denied",
            Self::Degraded { .. } => "degraded",
        }
    }
}
