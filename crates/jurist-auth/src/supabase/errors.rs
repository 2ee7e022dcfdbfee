//! Mapping of Supabase HTTP failures onto [`AuthError`].

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::AuthError;

/// Error body shapes returned by GoTrue and PostgREST. Older GoTrue releases
/// use `error`/`error_description`, newer ones `error_code`/`msg`, PostgREST
/// uses `code`/`message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn message(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

/// Classify a non-success response from a GoTrue credentials endpoint.
pub(crate) fn classify_auth_failure(status: StatusCode, body: &str) -> AuthError {
    let parsed = ErrorBody::parse(body);
    let code = parsed.error_code.as_deref().unwrap_or_default();
    let message = parsed.message().unwrap_or(body).to_string();
    let lowered = message.to_ascii_lowercase();

    if code == "email_not_confirmed" || lowered.contains("email not confirmed") {
        return AuthError::UnconfirmedAccount;
    }
    if code == "invalid_credentials"
        || parsed.error.as_deref() == Some("invalid_grant")
        || lowered.contains("invalid login credentials")
    {
        return AuthError::InvalidCredentials;
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return AuthError::Transport(format!("HTTP {status}: {message}"));
    }
    AuthError::Unknown(format!("HTTP {status}: {message}"))
}

/// Describe a non-success PostgREST response for an error variant.
pub(crate) fn describe_rest_failure(status: StatusCode, body: &str) -> String {
    let parsed = ErrorBody::parse(body);
    let message = parsed.message().unwrap_or(body);
    format!("HTTP {status}: {message}")
}

/// Network, timeout and body-decoding failures from reqwest.
pub(crate) fn transport(context: &str, error: &reqwest::Error) -> AuthError {
    if error.is_decode() {
        AuthError::Unknown(format!("{context}: unexpected response body: {error}"))
    } else {
        AuthError::Transport(format!("{context}: {error}"))
    }
}
