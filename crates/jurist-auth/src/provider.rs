//! Seams between the session controller and the remote services it reconciles
//! against. The Supabase adapter implements both traits; tests use fakes.

use async_trait::async_trait;
use jurist_core::{Identity, NewProfile, ProfileUpdate};

use crate::error::AuthError;
use crate::session::{AccountUser, Session, SessionChanges, SignUpMetadata};

/// Remote service of record for credentials and sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The session the provider currently considers valid, if any.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Exchange credentials for a session.
    ///
    /// Fails with `InvalidCredentials`, `UnconfirmedAccount` or `Transport`.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    /// Create an account carrying `metadata`.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AccountUser, AuthError>;

    /// Terminate the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session change notifications for as long as the
    /// returned value is held.
    fn subscribe(&self) -> SessionChanges;

    /// Sequence number of the last notification sent to subscribers.
    ///
    /// Read right after a call returns, it bounds the notifications that call
    /// already accounts for.
    fn last_notification(&self) -> u64;
}

/// Remote service of record for profile rows keyed by account id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `ProfileNotFound` when no row exists for `id`.
    async fn get_profile(&self, id: &str) -> Result<Identity, AuthError>;

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Identity, AuthError>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate)
    -> Result<Identity, AuthError>;
}
