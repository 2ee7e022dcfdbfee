//! Supabase adapter: GoTrue for credentials and sessions, PostgREST for
//! profile rows.
//!
//! One [`SupabaseClient`] implements both [`crate::IdentityProvider`] and
//! [`crate::ProfileStore`]. The session it issues is persisted through a
//! [`SessionStore`] and every change is broadcast to subscribers.

mod errors;
mod gotrue;
mod postgrest;

use std::sync::Arc;
use std::time::Duration;

use jurist_config::{JuristConfig, SessionConfig, SupabaseConfig};

use crate::error::AuthError;
use crate::session::{SessionEvent, SessionNotifier};
use crate::session_store::{KeyringSessionStore, MemorySessionStore, SessionStore};

/// Buffered session notifications per subscriber before it starts missing them.
const EVENT_CAPACITY: usize = 16;

pub struct SupabaseClient {
    http: reqwest::Client,
    auth_url: String,
    rest_url: String,
    anon_key: String,
    schema: String,
    profiles_table: String,
    auto_refresh: bool,
    refresh_buffer_secs: i64,
    store: Arc<dyn SessionStore>,
    events: SessionNotifier,
}

impl SupabaseClient {
    /// Build a client for the given project.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` when the project URL or anon key is
    /// missing, or `AuthError::Unknown` if the HTTP client cannot be built.
    pub fn new(
        supabase: &SupabaseConfig,
        session: &SessionConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, AuthError> {
        if !supabase.is_configured() {
            return Err(AuthError::NotConfigured(
                "supabase.url and supabase.anon_key are required".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(supabase.request_timeout_secs))
            .build()
            .map_err(|e| AuthError::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            auth_url: supabase.auth_url(),
            rest_url: supabase.rest_url(),
            anon_key: supabase.anon_key.clone(),
            schema: supabase.schema.clone(),
            profiles_table: supabase.profiles_table.clone(),
            auto_refresh: session.auto_refresh_token,
            refresh_buffer_secs: session.refresh_buffer_secs,
            store,
            events: SessionNotifier::new(EVENT_CAPACITY),
        })
    }

    /// Build a client with the session store selected by `session.persist_session`.
    ///
    /// # Errors
    ///
    /// See [`Self::new`]; also fails if the fallback session file location
    /// cannot be resolved.
    pub fn from_config(config: &JuristConfig) -> Result<Self, AuthError> {
        let store: Arc<dyn SessionStore> = if config.session.persist_session {
            Arc::new(KeyringSessionStore::with_default_fallback(
                config.session.keyring_service.clone(),
            )?)
        } else {
            Arc::new(MemorySessionStore::new())
        };
        Self::new(&config.supabase, &config.session, store)
    }

    /// Where the current session is persisted, if one is stored.
    #[must_use]
    pub fn session_source(&self) -> Option<&'static str> {
        self.store.source()
    }

    fn emit(&self, event: SessionEvent) {
        let kind = event.kind();
        let seq = self.events.notify(event);
        tracing::debug!(kind, seq, "session change");
    }

    /// Token for the `Authorization` header: the user's access token when
    /// signed in, the anon key otherwise.
    fn bearer(&self) -> String {
        match self.store.load() {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.anon_key.clone(),
            Err(error) => {
                tracing::warn!(%error, "session store unreadable; using anon key");
                self.anon_key.clone()
            }
        }
    }
}
