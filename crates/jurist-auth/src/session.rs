//! Remote session values and the change notifications the provider pushes.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use jurist_core::Role;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Account as known to the identity provider (not the profile record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// A session issued by the identity provider.
///
/// Serialized as-is into the session store. `Debug` redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AccountUser,
}

impl Session {
    /// Check if the access token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        let threshold = Utc::now() + chrono::TimeDelta::seconds(buffer_secs);
        self.expires_at <= threshold
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_near_expiry(0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// User metadata attached to a new account at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

/// Registration form submitted to [`crate::SessionController::sign_up`].
#[derive(Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

impl SignUp {
    /// Metadata stored on the provider account. Role is always `client`.
    #[must_use]
    pub fn metadata(&self) -> SignUpMetadata {
        SignUpMetadata {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            role: Role::DEFAULT,
        }
    }
}

impl fmt::Debug for SignUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUp")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Session change pushed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(Session),
}

impl SessionEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::UserUpdated(_) => "user_updated",
        }
    }
}

/// One item received from a [`SessionChanges`] subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A notification and the sequence number it was sent with.
    Event { seq: u64, event: SessionEvent },
    /// The subscriber fell behind and this many events were dropped.
    Missed(u64),
}

/// Sending side of the session notifications.
///
/// Every event is stamped with a sequence number, assigned in send order and
/// starting at 1, so subscribers can tell how a notification orders against
/// the provider calls around it.
#[derive(Debug)]
pub struct SessionNotifier {
    tx: broadcast::Sender<(u64, SessionEvent)>,
    last: Mutex<u64>,
}

impl SessionNotifier {
    /// `capacity` events are buffered per subscriber before it starts missing them.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            last: Mutex::new(0),
        }
    }

    /// Stamp and send `event`, returning its sequence number. Having no
    /// subscribers is fine.
    pub fn notify(&self, event: SessionEvent) -> u64 {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last += 1;
        let _ = self.tx.send((*last, event));
        *last
    }

    /// Sequence number of the most recent event sent, or 0 before the first.
    #[must_use]
    pub fn last_seq(&self) -> u64 {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn subscribe(&self) -> SessionChanges {
        SessionChanges {
            rx: self.tx.subscribe(),
        }
    }
}

/// Long-lived subscription to session change notifications.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionChanges {
    rx: broadcast::Receiver<(u64, SessionEvent)>,
}

impl SessionChanges {
    /// Wait for the next notification. `None` once the provider is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        match self.rx.recv().await {
            Ok((seq, event)) => Some(Delivery::Event { seq, event }),
            Err(broadcast::error::RecvError::Lagged(missed)) => Some(Delivery::Missed(missed)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}
