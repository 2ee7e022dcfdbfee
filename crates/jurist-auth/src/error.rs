use thiserror::Error;

/// Failures surfaced by the identity provider, the profile store and the
/// session controller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account email is not confirmed yet")]
    UnconfirmedAccount,

    #[error("no profile record for account {id}")]
    ProfileNotFound { id: String },

    #[error("profile write failed for account {id}: {reason}")]
    ProfileWriteFailed { id: String, reason: String },

    #[error("identity service unreachable: {0}")]
    Transport(String),

    #[error("not signed in; run `jur auth login`")]
    NotAuthenticated,

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("session store error: {0}")]
    SessionStore(String),

    #[error("{0}")]
    Unknown(String),
}

impl AuthError {
    /// `true` for network-level failures where retrying may succeed.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
