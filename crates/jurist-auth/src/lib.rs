//! # jurist-auth
//!
//! Session lifecycle for Jurist.
//!
//! [`SessionController`] owns the process-wide [`jurist_core::SessionSnapshot`]
//! and reconciles it against an [`IdentityProvider`] (credentials and
//! sessions) and a [`ProfileStore`] (profile rows). [`SupabaseClient`]
//! implements both against a hosted Supabase project; sessions are kept in the
//! OS keychain with a file fallback ([`session_store`]).

pub mod controller;
pub mod error;
pub mod provider;
pub mod refresh;
pub mod session;
pub mod session_store;
pub mod supabase;

pub use controller::SessionController;
pub use error::AuthError;
pub use provider::{IdentityProvider, ProfileStore};
pub use session::{
    AccountUser, Delivery, Session, SessionChanges, SessionEvent, SessionNotifier, SignUp,
    SignUpMetadata,
};
pub use session_store::{FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionStore};
pub use supabase::SupabaseClient;

use std::sync::Arc;

use jurist_config::JuristConfig;

/// Build a Supabase-backed controller from loaded configuration.
///
/// The controller starts in `Resolving`; call
/// [`SessionController::bootstrap`] to resolve the stored session.
///
/// # Errors
///
/// Returns `AuthError::NotConfigured` when the Supabase project is not set, or
/// `AuthError::SessionStore` if the session file location cannot be resolved.
pub fn connect(config: &JuristConfig) -> Result<(SessionController, Arc<SupabaseClient>), AuthError> {
    let client = Arc::new(SupabaseClient::from_config(config)?);
    let controller = SessionController::new(client.clone(), client.clone());
    Ok((controller, client))
}
