//! GoTrue (`/auth/v1`) calls.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::SupabaseClient;
use super::errors::{classify_auth_failure, transport};
use crate::error::AuthError;
use crate::provider::IdentityProvider;
use crate::refresh::{needs_refresh, resolve_expiry};
use crate::session::{AccountUser, Session, SessionChanges, SessionEvent, SignUpMetadata};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AccountUser,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session, AuthError> {
        let expires_at = resolve_expiry(&self.access_token, self.expires_at, self.expires_in)?;
        Ok(Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        })
    }
}

/// `/signup` returns a session when email confirmation is off, the bare
/// user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AccountUser),
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpMetadata,
}

impl SupabaseClient {
    async fn token_grant<B: Serialize + Sync>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/token?grant_type={grant_type}", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(grant_type, &e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_auth_failure(status, &body));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| transport(grant_type, &e))?;
        token.into_session()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    /// Persist a new session. A store failure is logged, not returned: the
    /// session is still valid for this process.
    fn remember(&self, session: &Session) {
        if let Err(error) = self.store.save(session) {
            tracing::warn!(%error, "failed to persist session");
        }
    }

    fn forget(&self) -> Result<(), AuthError> {
        self.store.clear()
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(stored) = self.store.load()? else {
            return Ok(None);
        };

        if !self.auto_refresh {
            if stored.is_expired() {
                tracing::debug!(expires_at = %stored.expires_at, "stored session expired");
                self.forget()?;
                return Ok(None);
            }
            return Ok(Some(stored));
        }
        if !needs_refresh(&stored, self.refresh_buffer_secs) {
            return Ok(Some(stored));
        }

        match self.refresh(&stored.refresh_token).await {
            Ok(fresh) => {
                tracing::info!(user_id = %fresh.user.id, "session refreshed");
                self.remember(&fresh);
                self.emit(SessionEvent::TokenRefreshed(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(error) if error.is_transport() && !stored.is_expired() => {
                tracing::warn!(%error, "session refresh failed; using current token until expiry");
                Ok(Some(stored))
            }
            Err(error) if error.is_transport() => Err(error),
            Err(error) => {
                tracing::warn!(%error, "stored session rejected; clearing");
                self.forget()?;
                self.emit(SessionEvent::SignedOut);
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let session = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        self.remember(&session);
        self.emit(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AccountUser, AuthError> {
        let url = format!("{}/signup", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            })
            .send()
            .await
            .map_err(|e| transport("signup", &e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_auth_failure(status, &body));
        }

        let created: SignUpResponse = resp
            .json()
            .await
            .map_err(|e| transport("signup", &e))?;
        match created {
            SignUpResponse::Session(token) => {
                let session = token.into_session()?;
                let user = session.user.clone();
                self.remember(&session);
                self.emit(SessionEvent::SignedIn(session));
                Ok(user)
            }
            SignUpResponse::User(user) => {
                tracing::debug!(user_id = %user.id, "account created; confirmation pending");
                Ok(user)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.store.load()? {
            let url = format!("{}/logout", self.auth_url);
            let resp = self
                .http
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .map_err(|e| transport("logout", &e))?;

            let status = resp.status();
            // The server no longer knows the token: already signed out.
            let gone = matches!(
                status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
            );
            if !status.is_success() && !gone {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify_auth_failure(status, &body));
            }
        }

        self.forget()?;
        self.emit(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> SessionChanges {
        self.events.subscribe()
    }

    fn last_notification(&self) -> u64 {
        self.events.last_seq()
    }
}
