//! Session persistence and refresh settings.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// Refresh a stored session this many seconds before it expires.
const fn default_refresh_buffer_secs() -> i64 {
    60
}

fn default_keyring_service() -> String {
    "jurist-cli".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Keep the session across process restarts.
    #[serde(default = "default_true")]
    pub persist_session: bool,

    /// Refresh near-expiry sessions when the current session is read.
    #[serde(default = "default_true")]
    pub auto_refresh_token: bool,

    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: i64,

    /// OS keychain service name. Tests point this at a throwaway service.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist_session: default_true(),
            auto_refresh_token: default_true(),
            refresh_buffer_secs: default_refresh_buffer_secs(),
            keyring_service: default_keyring_service(),
        }
    }
}
