//! Supabase project configuration.

use serde::{Deserialize, Serialize};

fn default_schema() -> String {
    "public".to_string()
}

fn default_profiles_table() -> String {
    "users".to_string()
}

/// Default per-request timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., `https://abcd.supabase.co`).
    #[serde(default)]
    pub url: String,

    /// Public anon key sent as `apikey` on every request.
    #[serde(default)]
    pub anon_key: String,

    /// Postgres schema exposed through PostgREST.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Table holding one profile row per account.
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,

    /// Timeout applied by the HTTP client to every remote call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            schema: default_schema(),
            profiles_table: default_profiles_table(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SupabaseConfig {
    /// Check if the Supabase config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// GoTrue endpoint root (`{url}/auth/v1`).
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.base_url())
    }

    /// PostgREST endpoint root (`{url}/rest/v1`).
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = SupabaseConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.schema, "public");
        assert_eq!(config.profiles_table, "users");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn configured_when_url_and_key_set() {
        let config = SupabaseConfig {
            url: "https://demo.supabase.co".into(),
            anon_key: "anon".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn not_configured_when_missing_key() {
        let config = SupabaseConfig {
            url: "https://demo.supabase.co".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn endpoint_roots_ignore_trailing_slash() {
        let config = SupabaseConfig {
            url: "https://demo.supabase.co/".into(),
            ..Default::default()
        };
        assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }
}
