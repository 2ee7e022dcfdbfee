use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::AuthError;
use crate::session::Session;

/// Whether a stored session should be exchanged for a fresh one before use.
#[must_use]
pub fn needs_refresh(session: &Session, buffer_secs: i64) -> bool {
    if session.is_near_expiry(buffer_secs) {
        tracing::debug!(
            expires_at = %session.expires_at,
            "session expires within {buffer_secs}s; refreshing",
        );
        return true;
    }
    false
}

/// Expiry to record for a freshly issued access token.
///
/// Prefers the `expires_at` the auth server sent, then `expires_in`, then the
/// token's own `exp` claim.
///
/// # Errors
///
/// Returns `AuthError::Unknown` when none of the three is usable.
pub fn resolve_expiry(
    access_token: &str,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
) -> Result<DateTime<Utc>, AuthError> {
    if let Some(at) = expires_at.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        return Ok(at);
    }
    if let Some(secs) = expires_in {
        return Ok(Utc::now() + chrono::TimeDelta::seconds(secs));
    }
    decode_expiry(access_token)
}

/// Decode the JWT `exp` claim without verifying the signature.
///
/// The auth server is the only party that checks signatures; this is only used
/// to schedule refreshes.
///
/// # Errors
///
/// Returns `AuthError::Unknown` if the JWT format is invalid or the `exp` claim
/// is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Unknown("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::Unknown(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Unknown(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Unknown("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0).ok_or_else(|| AuthError::Unknown("invalid exp timestamp".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AccountUser;

    fn make_jwt_with_exp(exp: i64) -> String {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(format!(r#"{{"sub":"user-123","role":"authenticated","exp":{exp}}}"#));
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("fake_sig");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decode_expiry_valid_jwt() {
        let future_exp = Utc::now().timestamp() + 3600;
        let jwt = make_jwt_with_exp(future_exp);
        let dt = decode_expiry(&jwt).unwrap();
        assert_eq!(dt.timestamp(), future_exp);
    }

    #[test]
    fn decode_expiry_invalid_format() {
        let err = decode_expiry("not-a-jwt").unwrap_err();
        assert!(err.to_string().contains("invalid JWT format"));
    }

    #[test]
    fn decode_expiry_missing_exp_claim() {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"user-123"}"#);
        let jwt = format!("{header}.{payload}.sig");

        let err = decode_expiry(&jwt).unwrap_err();
        assert!(err.to_string().contains("missing exp claim"));
    }

    #[test]
    fn decode_expiry_bad_base64() {
        let err = decode_expiry("header.!!!invalid!!!.signature").unwrap_err();
        assert!(err.to_string().contains("base64 decode failed"));
    }

    #[test]
    fn resolve_expiry_prefers_server_timestamp() {
        let jwt = make_jwt_with_exp(1);
        let dt = resolve_expiry(&jwt, Some(2_000_000_000), Some(10)).unwrap();
        assert_eq!(dt.timestamp(), 2_000_000_000);
    }

    #[test]
    fn resolve_expiry_uses_expires_in_then_claim() {
        let before = Utc::now().timestamp();
        let dt = resolve_expiry("not-a-jwt", None, Some(3600)).unwrap();
        assert!(dt.timestamp() >= before + 3600);

        let exp = before + 120;
        let dt = resolve_expiry(&make_jwt_with_exp(exp), None, None).unwrap();
        assert_eq!(dt.timestamp(), exp);

        assert!(resolve_expiry("not-a-jwt", None, None).is_err());
    }

    #[test]
    fn needs_refresh_respects_buffer() {
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: Utc::now() + chrono::TimeDelta::seconds(30),
            user: AccountUser {
                id: "user-1".into(),
                email: String::new(),
            },
        };
        assert!(needs_refresh(&session, 60));
        assert!(!needs_refresh(&session, 0));
    }
}
