use std::sync::Arc;

use jurist_auth::{AuthError, SessionController, SupabaseClient};
use jurist_config::JuristConfig;
use jurist_core::Identity;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: JuristConfig,
    pub session: SessionController,
    client: Arc<SupabaseClient>,
}

impl AppContext {
    /// Connect to the configured Supabase project and resolve the stored
    /// session before any command runs.
    pub async fn init(config: JuristConfig) -> anyhow::Result<Self> {
        config.require_supabase()?;
        let (session, client) = jurist_auth::connect(&config)?;

        let snapshot = session.bootstrap().await;
        tracing::debug!(status = %snapshot.status(), "session resolved");

        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Signed-in identity, or a `NotAuthenticated` error.
    pub fn require_identity(&self) -> Result<Identity, AuthError> {
        self.session
            .snapshot()
            .identity()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Which store holds the persisted session (`keyring`, `file`, `memory`).
    pub fn session_source(&self) -> Option<&'static str> {
        self.client.session_source()
    }

    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}
