//! PostgREST (`/rest/v1`) access to the profile table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jurist_core::{Identity, NewProfile, ProfileUpdate, Role};
use serde::Deserialize;

use super::SupabaseClient;
use super::errors::{describe_rest_failure, transport};
use crate::error::AuthError;
use crate::provider::ProfileStore;

/// One profile row as PostgREST returns it. Nullable columns are tolerated
/// and normalized when converted to an [`Identity`].
#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Identity {
    fn from(row: ProfileRow) -> Self {
        let role = match row.role.as_deref() {
            None => Role::DEFAULT,
            Some(raw) => raw.parse().unwrap_or_else(|error| {
                tracing::warn!(user_id = %row.id, %error, "unrecognized role; treating as client");
                Role::DEFAULT
            }),
        };
        Self {
            id: row.id,
            email: row.email.unwrap_or_default(),
            role,
            full_name: row.full_name.unwrap_or_default(),
            phone: row.phone.filter(|phone| !phone.trim().is_empty()),
            created_at: row.created_at,
        }
    }
}

impl SupabaseClient {
    fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url, self.profiles_table)
    }

    fn row_url(&self, id: &str) -> String {
        format!("{}?id=eq.{}", self.table_url(), urlencoding::encode(id))
    }

    async fn read_rows(
        context: &str,
        resp: reqwest::Response,
    ) -> Result<Result<Vec<ProfileRow>, String>, AuthError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(AuthError::Transport(format!(
                    "{context}: {}",
                    describe_rest_failure(status, &body)
                )));
            }
            return Ok(Err(describe_rest_failure(status, &body)));
        }
        let rows = resp.json().await.map_err(|e| transport(context, &e))?;
        Ok(Ok(rows))
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn get_profile(&self, id: &str) -> Result<Identity, AuthError> {
        let url = format!("{}&select=*", self.row_url(id));
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Accept-Profile", &self.schema)
            .send()
            .await
            .map_err(|e| transport("get profile", &e))?;

        let rows = Self::read_rows("get profile", resp)
            .await?
            .map_err(|reason| AuthError::Unknown(format!("get profile: {reason}")))?;
        rows.into_iter()
            .next()
            .map(Identity::from)
            .ok_or_else(|| AuthError::ProfileNotFound { id: id.to_string() })
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Identity, AuthError> {
        let resp = self
            .http
            .post(self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=representation")
            .json(profile)
            .send()
            .await
            .map_err(|e| transport("insert profile", &e))?;

        let write_failed = |reason: String| AuthError::ProfileWriteFailed {
            id: profile.id.clone(),
            reason,
        };
        let rows = Self::read_rows("insert profile", resp)
            .await?
            .map_err(write_failed)?;
        rows.into_iter()
            .next()
            .map(Identity::from)
            .ok_or_else(|| AuthError::ProfileWriteFailed {
                id: profile.id.clone(),
                reason: "insert returned no row".into(),
            })
    }

    async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Identity, AuthError> {
        let resp = self
            .http
            .patch(self.row_url(id))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await
            .map_err(|e| transport("update profile", &e))?;

        let rows = Self::read_rows("update profile", resp)
            .await?
            .map_err(|reason| AuthError::ProfileWriteFailed {
                id: id.to_string(),
                reason,
            })?;
        rows.into_iter()
            .next()
            .map(Identity::from)
            .ok_or_else(|| AuthError::ProfileNotFound { id: id.to_string() })
    }
}
