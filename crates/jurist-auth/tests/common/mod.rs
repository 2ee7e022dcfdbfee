//! In-memory identity provider and profile store for controller tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jurist_auth::{
    AccountUser, AuthError, IdentityProvider, ProfileStore, Session, SessionChanges,
    SessionController, SessionEvent, SessionNotifier, SignUpMetadata,
};
use jurist_core::{Identity, NewProfile, ProfileUpdate, Role, SessionSnapshot, SessionStatus};
use tokio::sync::{Notify, Semaphore};

// ---------------------------------------------------------------------------
// Identity provider
// ---------------------------------------------------------------------------

struct Account {
    id: String,
    password: String,
    confirmed: bool,
    metadata: Option<SignUpMetadata>,
}

pub struct FakeProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Session>>,
    events: SessionNotifier,
    next_id: AtomicU64,
    pub emit_events: AtomicBool,
    /// Accounts created through `sign_up` can sign in straight away.
    pub confirm_sign_ups: AtomicBool,
    pub offline: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub current_session_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            events: SessionNotifier::new(capacity),
            next_id: AtomicU64::new(1),
            emit_events: AtomicBool::new(true),
            confirm_sign_ups: AtomicBool::new(true),
            offline: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            current_session_calls: AtomicUsize::new(0),
        }
    }

    /// Register a confirmed account and return its id.
    pub fn register(&self, email: &str, password: &str) -> String {
        self.insert_account(email, password, true, None)
    }

    pub fn register_unconfirmed(&self, email: &str, password: &str) -> String {
        self.insert_account(email, password, false, None)
    }

    fn insert_account(
        &self,
        email: &str,
        password: &str,
        confirmed: bool,
        metadata: Option<SignUpMetadata>,
    ) -> String {
        let id = format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                id: id.clone(),
                password: password.to_string(),
                confirmed,
                metadata,
            },
        );
        id
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(email)
    }

    pub fn account_id(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .map(|account| account.id.clone())
    }

    pub fn metadata_for(&self, email: &str) -> Option<SignUpMetadata> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .and_then(|account| account.metadata.clone())
    }

    /// Pretend a session survived from a previous run.
    pub fn restore_session(&self, id: &str, email: &str) -> Session {
        let session = session_for(id, email);
        *self.current.lock().unwrap() = Some(session.clone());
        session
    }

    /// Drop the remote session without notifying anyone.
    pub fn revoke_silently(&self) {
        *self.current.lock().unwrap() = None;
    }

    /// Push a notification as the remote service would.
    pub fn emit(&self, event: SessionEvent) -> u64 {
        self.events.notify(event)
    }

    fn notify(&self, event: SessionEvent) {
        if self.emit_events.load(Ordering::SeqCst) {
            self.events.notify(event);
        }
    }

    fn check_online(&self) -> Result<(), AuthError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        self.current_session_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.check_online()?;
        let session = {
            let accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get(email)
                .filter(|account| account.password == password)
                .ok_or(AuthError::InvalidCredentials)?;
            if !account.confirmed {
                return Err(AuthError::UnconfirmedAccount);
            }
            session_for(&account.id, email)
        };
        *self.current.lock().unwrap() = Some(session.clone());
        self.notify(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AccountUser, AuthError> {
        self.check_online()?;
        if self.has_account(email) {
            return Err(AuthError::Unknown("User already registered".into()));
        }
        let confirmed = self.confirm_sign_ups.load(Ordering::SeqCst);
        let id = self.insert_account(email, password, confirmed, Some(metadata.clone()));
        Ok(AccountUser {
            id,
            email: email.to_string(),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_online()?;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Unknown("HTTP 500: logout failed".into()));
        }
        *self.current.lock().unwrap() = None;
        self.notify(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> SessionChanges {
        self.events.subscribe()
    }

    fn last_notification(&self) -> u64 {
        self.events.last_seq()
    }
}

pub fn session_for(id: &str, email: &str) -> Session {
    Session {
        access_token: format!("access-{id}"),
        refresh_token: format!("refresh-{id}"),
        expires_at: Utc::now() + chrono::TimeDelta::hours(1),
        user: AccountUser {
            id: id.to_string(),
            email: email.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Profile store
// ---------------------------------------------------------------------------

/// Holds profile lookups until released, so a test can interleave other work
/// while a lookup is in flight.
#[derive(Clone)]
pub struct LookupGate {
    pub started: Arc<Notify>,
    release: Arc<Semaphore>,
}

impl LookupGate {
    pub fn release(&self) {
        self.release.add_permits(1);
    }
}

pub struct FakeProfiles {
    rows: Mutex<HashMap<String, Identity>>,
    gate: Mutex<Option<LookupGate>>,
    pub fail_inserts: AtomicBool,
    pub fail_updates: AtomicBool,
    pub lookups: AtomicUsize,
}

impl FakeProfiles {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            gate: Mutex::new(None),
            fail_inserts: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, identity: Identity) {
        self.rows
            .lock()
            .unwrap()
            .insert(identity.id.clone(), identity);
    }

    pub fn get(&self, id: &str) -> Option<Identity> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    /// Make every following lookup wait until the gate is released.
    pub fn hold_lookups(&self) -> LookupGate {
        let gate = LookupGate {
            started: Arc::new(Notify::new()),
            release: Arc::new(Semaphore::new(0)),
        };
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn get_profile(&self, id: &str) -> Result<Identity, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.started.notify_one();
            let _permit = gate.release.acquire().await.unwrap();
        }
        self.get(id)
            .ok_or_else(|| AuthError::ProfileNotFound { id: id.to_string() })
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<Identity, AuthError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AuthError::Unknown("HTTP 403: row-level security violation".into()));
        }
        let identity = Identity {
            id: profile.id.clone(),
            email: profile.email.clone(),
            role: profile.role,
            full_name: profile.full_name.clone(),
            phone: profile.phone.clone(),
            created_at: Utc::now(),
        };
        self.put(identity.clone());
        Ok(identity)
    }

    async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Identity, AuthError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AuthError::ProfileWriteFailed {
                id: id.to_string(),
                reason: "HTTP 400: bad request".into(),
            });
        }
        let current = self
            .get(id)
            .ok_or_else(|| AuthError::ProfileNotFound { id: id.to_string() })?;
        let updated = update.apply_to(&current);
        self.put(updated.clone());
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub controller: SessionController,
    pub provider: Arc<FakeProvider>,
    pub profiles: Arc<FakeProfiles>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_provider(FakeProvider::new())
    }

    pub fn with_provider(provider: FakeProvider) -> Self {
        let provider = Arc::new(provider);
        let profiles = Arc::new(FakeProfiles::new());
        let controller = SessionController::new(provider.clone(), profiles.clone());
        Self {
            controller,
            provider,
            profiles,
        }
    }

    /// Register `email` with a client profile row; returns the account id.
    pub fn client(&self, email: &str, password: &str, full_name: &str) -> String {
        let id = self.provider.register(email, password);
        self.profiles.put(profile(&id, email, full_name, Role::Client));
        id
    }

    /// Wait (bounded) until the snapshot reaches `status`.
    pub async fn settle_on(&self, status: SessionStatus) -> SessionSnapshot {
        let mut rx = self.controller.subscribe();
        let reached = tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|snapshot| snapshot.status() == status),
        )
        .await
        .expect("snapshot did not settle in time")
        .expect("controller dropped")
        .clone();
        reached
    }
}

pub fn profile(id: &str, email: &str, full_name: &str, role: Role) -> Identity {
    Identity {
        id: id.to_string(),
        email: email.to_string(),
        role,
        full_name: full_name.to_string(),
        phone: None,
        created_at: Utc::now(),
    }
}
