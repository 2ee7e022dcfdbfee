//! The session snapshot handed to consumers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SessionStatus;
use crate::identity::Identity;

/// Point-in-time copy of the session state.
///
/// A tagged variant rather than a `(loading, user)` pair, so "no identity" and
/// "not resolved yet" cannot be confused. Serializes as
/// `{"status": "authenticated", "identity": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", content = "identity", rename_all = "snake_case")]
pub enum SessionSnapshot {
    #[default]
    Resolving,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionSnapshot {
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        match self {
            Self::Resolving => SessionStatus::Resolving,
            Self::Authenticated(_) => SessionStatus::Authenticated,
            Self::Unauthenticated => SessionStatus::Unauthenticated,
        }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Resolving | Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// `true` once the first resolution has completed.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Resolving)
    }
}
