//! The session lifecycle controller.
//!
//! One instance per process, constructed at startup and passed to consumers by
//! clone (it is a thin `Arc` handle). It is the only writer of the
//! [`SessionSnapshot`]; consumers read clones through [`SessionController::snapshot`]
//! or a watch receiver from [`SessionController::subscribe`].
//!
//! Every identity-mutating trigger (an explicit operation, or a notification
//! from the identity provider) draws a sequence token when it starts. All
//! writes go through a single commit point that drops any transition whose
//! token is older than the last one applied, so the most recently initiated
//! trigger wins regardless of which remote call finishes first.
//!
//! Notifications are also ordered on the provider's side. When a provider
//! call returns, the controller records the provider's latest notification
//! sequence; the listener drops any notification at or below that mark,
//! since the call's own outcome already covers it. A late echo of an earlier
//! sign-out therefore cannot undo a sign-in that completed after it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jurist_core::{NewProfile, ProfileUpdate, Role, SessionSnapshot};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::AuthError;
use crate::provider::{IdentityProvider, ProfileStore};
use crate::session::{Delivery, Session, SessionEvent, SignUp};

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: watch::Sender<SessionSnapshot>,
    /// Token of the last transition that was published.
    applied: Mutex<u64>,
    next_token: AtomicU64,
    /// Provider notifications up to this sequence are reflected by a call
    /// that already returned.
    superseded: AtomicU64,
    bootstrapped: AtomicBool,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionController {
    /// Create a controller in the `Resolving` state. Nothing is fetched until
    /// [`Self::bootstrap`] runs.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::Resolving);
        Self {
            inner: Arc::new(Inner {
                provider,
                profiles,
                state,
                applied: Mutex::new(0),
                next_token: AtomicU64::new(0),
                superseded: AtomicU64::new(0),
                bootstrapped: AtomicBool::new(false),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Current snapshot (an owned copy).
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Subscribe to provider notifications and resolve the initial session.
    ///
    /// Runs once per controller. Later calls wait for the first resolution to
    /// settle and return the current snapshot.
    pub async fn bootstrap(&self) -> SessionSnapshot {
        if self.inner.bootstrapped.swap(true, Ordering::AcqRel) {
            return self.wait_settled().await;
        }
        self.start_listener();
        self.resolve_current_session().await
    }

    /// Re-derive the snapshot from the provider's current session and the
    /// profile store. Never fails: any error degrades to `Unauthenticated`.
    pub async fn resolve_current_session(&self) -> SessionSnapshot {
        let token = self.begin();
        self.resolve_with(token).await
    }

    /// Sign in with email and password, then resolve the profile.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection (`InvalidCredentials`,
    /// `UnconfirmedAccount`, `Transport`, `Unknown`) with the snapshot
    /// untouched. If the credentials are accepted but the profile cannot be
    /// resolved, publishes `Unauthenticated` and returns the lookup error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionSnapshot, AuthError> {
        let token = self.begin();
        let session = self
            .inner
            .provider
            .sign_in_with_password(email, password)
            .await
            .inspect_err(|error| tracing::warn!(%error, "sign-in rejected"))?;
        self.observe_provider();
        tracing::info!(user_id = %session.user.id, "signed in");

        match self.inner.profiles.get_profile(&session.user.id).await {
            Ok(identity) => Ok(self.commit(token, SessionSnapshot::Authenticated(identity), "sign_in")),
            Err(error) => {
                tracing::warn!(
                    user_id = %session.user.id,
                    %error,
                    "credentials accepted but profile could not be resolved",
                );
                self.commit(token, SessionSnapshot::Unauthenticated, "sign_in");
                Err(error)
            }
        }
    }

    /// Create an account and its profile row, then sign in with the same
    /// credentials.
    ///
    /// A failed profile insert leaves the provider account in place without a
    /// profile; the error carries the account id.
    ///
    /// # Errors
    ///
    /// Returns the provider error if account creation fails,
    /// `ProfileWriteFailed` if the profile insert fails, or the sign-in error.
    pub async fn sign_up(&self, form: &SignUp) -> Result<SessionSnapshot, AuthError> {
        let account = self
            .inner
            .provider
            .sign_up(&form.email, &form.password, &form.metadata())
            .await
            .inspect_err(|error| tracing::warn!(%error, "account creation failed"))?;
        tracing::info!(user_id = %account.id, "account created");

        let email = if account.email.is_empty() {
            form.email.clone()
        } else {
            account.email.clone()
        };
        let profile = NewProfile {
            id: account.id.clone(),
            email,
            full_name: form.full_name.clone(),
            phone: form.phone.clone(),
            role: Role::DEFAULT,
        };

        if let Err(error) = self.inner.profiles.insert_profile(&profile).await {
            tracing::warn!(
                user_id = %account.id,
                %error,
                "profile insert failed; account exists without a profile",
            );
            let reason = match error {
                AuthError::ProfileWriteFailed { reason, .. } => reason,
                other => other.to_string(),
            };
            return Err(AuthError::ProfileWriteFailed {
                id: account.id,
                reason,
            });
        }

        self.sign_in(&form.email, &form.password).await
    }

    /// Terminate the remote session and clear the identity.
    ///
    /// # Errors
    ///
    /// Returns the provider error with the snapshot untouched.
    pub async fn sign_out(&self) -> Result<SessionSnapshot, AuthError> {
        let token = self.begin();
        self.inner
            .provider
            .sign_out()
            .await
            .inspect_err(|error| tracing::warn!(%error, "sign-out failed; keeping current session"))?;
        self.observe_provider();
        tracing::info!("signed out");
        Ok(self.commit(token, SessionSnapshot::Unauthenticated, "sign_out"))
    }

    /// Write profile fields for the signed-in account and publish the result.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when no identity is held; otherwise the profile
    /// store's error with the snapshot untouched.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionSnapshot, AuthError> {
        let token = self.begin();
        let current = self.snapshot();
        let Some(identity) = current.identity() else {
            return Err(AuthError::NotAuthenticated);
        };
        if update.is_empty() {
            return Ok(current);
        }

        let updated = self.inner.profiles.update_profile(&identity.id, update).await?;
        tracing::info!(user_id = %updated.id, "profile updated");
        Ok(self.commit_with(token, "update_profile", |current| {
            current
                .identity()
                .is_some_and(|held| held.id == updated.id)
                .then(|| SessionSnapshot::Authenticated(updated))
        }))
    }

    /// Reconcile against a provider notification.
    ///
    /// The bootstrap listener calls this for every event it receives; embedders
    /// with their own event source may drive it directly.
    pub async fn handle_event(&self, event: SessionEvent) -> SessionSnapshot {
        let token = self.begin();
        self.apply_event(token, event).await
    }

    /// Stop the notification listener and drop the provider subscription.
    pub async fn shutdown(&self) {
        let listener = lock(&self.inner.listener).take();
        if let Some(Listener { shutdown, task }) = listener {
            let _ = shutdown.send(true);
            if let Err(error) = task.await {
                tracing::warn!(%error, "session listener task failed");
            }
        }
    }

    // --- internals ---

    fn begin(&self) -> u64 {
        self.inner.next_token.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark every notification the provider has sent so far as covered.
    fn observe_provider(&self) {
        let seq = self.inner.provider.last_notification();
        self.inner.superseded.fetch_max(seq, Ordering::SeqCst);
    }

    fn is_superseded(&self, seq: u64) -> bool {
        seq <= self.inner.superseded.load(Ordering::SeqCst)
    }

    async fn wait_settled(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(SessionSnapshot::is_settled)
            .await
            .map(|snapshot| snapshot.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    async fn resolve_with(&self, token: u64) -> SessionSnapshot {
        let session = self.inner.provider.current_session().await;
        if session.is_ok() {
            self.observe_provider();
        }
        let next = match session {
            Ok(Some(session)) => self.resolve_profile(&session).await,
            Ok(None) => {
                tracing::debug!("no active session");
                SessionSnapshot::Unauthenticated
            }
            Err(error) => {
                tracing::warn!(%error, "session lookup failed; treating as signed out");
                SessionSnapshot::Unauthenticated
            }
        };
        self.commit(token, next, "resolve")
    }

    async fn resolve_profile(&self, session: &Session) -> SessionSnapshot {
        match self.inner.profiles.get_profile(&session.user.id).await {
            Ok(identity) => SessionSnapshot::Authenticated(identity),
            Err(error) => {
                tracing::warn!(
                    user_id = %session.user.id,
                    %error,
                    "profile lookup failed; treating session as signed out",
                );
                SessionSnapshot::Unauthenticated
            }
        }
    }

    async fn apply_event(&self, token: u64, event: SessionEvent) -> SessionSnapshot {
        let kind = event.kind();
        tracing::debug!(kind, token, "session notification");
        match event {
            SessionEvent::SignedIn(session) | SessionEvent::UserUpdated(session) => {
                let next = self.resolve_profile(&session).await;
                self.commit(token, next, kind)
            }
            SessionEvent::SignedOut => self.commit(token, SessionSnapshot::Unauthenticated, kind),
            SessionEvent::TokenRefreshed(_) => self.snapshot(),
        }
    }

    fn start_listener(&self) {
        let mut changes = self.inner.provider.subscribe();
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            loop {
                let delivery = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    delivery = changes.recv() => delivery,
                };
                let Some(delivery) = delivery else { break };
                let Some(inner) = weak.upgrade() else { break };
                let controller = Self { inner };

                if let Delivery::Event { seq, event } = &delivery
                    && controller.is_superseded(*seq)
                {
                    tracing::debug!(seq, kind = event.kind(), "notification already reflected; skipping");
                    continue;
                }

                // Tokens are drawn here, in arrival order, before any fetch.
                let token = controller.begin();
                match delivery {
                    Delivery::Event {
                        event: SessionEvent::SignedOut,
                        ..
                    } => {
                        controller.apply_event(token, SessionEvent::SignedOut).await;
                    }
                    Delivery::Event { event, .. } => {
                        tokio::spawn(async move {
                            controller.apply_event(token, event).await;
                        });
                    }
                    Delivery::Missed(missed) => {
                        tracing::warn!(missed, "session notifications dropped; re-resolving");
                        tokio::spawn(async move {
                            controller.resolve_with(token).await;
                        });
                    }
                }
            }
            tracing::debug!("session listener stopped");
        });

        *lock(&self.inner.listener) = Some(Listener { shutdown, task });
    }

    fn commit(&self, token: u64, next: SessionSnapshot, cause: &'static str) -> SessionSnapshot {
        self.commit_with(token, cause, |_| Some(next))
    }

    /// Single write path for the snapshot. `next` sees the current snapshot
    /// and may decline by returning `None`.
    fn commit_with<F>(&self, token: u64, cause: &'static str, next: F) -> SessionSnapshot
    where
        F: FnOnce(&SessionSnapshot) -> Option<SessionSnapshot>,
    {
        let mut applied = lock(&self.inner.applied);
        if token < *applied {
            tracing::debug!(token, applied = *applied, cause, "discarding stale session transition");
            return self.snapshot();
        }

        let current = self.snapshot();
        let Some(next) = next(&current) else {
            tracing::debug!(token, cause, "session transition no longer applies");
            return current;
        };
        if let Err(error) = current.status().validate_transition(next.status()) {
            tracing::warn!(%error, cause, "refusing session transition");
            return current;
        }

        *applied = token;
        tracing::debug!(token, cause, from = %current.status(), to = %next.status(), "session transition");
        self.inner.state.send_if_modified(|held| {
            if *held == next {
                false
            } else {
                *held = next.clone();
                true
            }
        });
        next
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
