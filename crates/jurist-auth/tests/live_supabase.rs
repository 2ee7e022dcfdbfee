//! # Live tests against a Supabase project
//!
//! Skipped (not failed) when credentials are missing.
//!
//! ## Required environment variables
//!
//! ```bash
//! JURIST_SUPABASE__URL=https://<project>.supabase.co
//! JURIST_SUPABASE__ANON_KEY=eyJ...
//! JURIST_TEST__EMAIL=tester@example.com      # confirmed account with a profile row
//! JURIST_TEST__PASSWORD=...
//! ```
//!
//! ## Run
//!
//! ```bash
//! cargo test -p jurist-auth --test live_supabase -- --nocapture
//! ```

use std::sync::Arc;

use jurist_auth::{AuthError, MemorySessionStore, SessionController, SupabaseClient};
use jurist_config::{SessionConfig, SupabaseConfig};
use jurist_core::SessionStatus;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_env() {
    let workspace_env = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.join(".env"));

    if let Some(env_path) = workspace_env {
        let _ = dotenvy::from_path(&env_path);
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn project() -> Option<SupabaseConfig> {
    load_env();
    Some(SupabaseConfig {
        url: non_empty("JURIST_SUPABASE__URL")?,
        anon_key: non_empty("JURIST_SUPABASE__ANON_KEY")?,
        ..SupabaseConfig::default()
    })
}

fn test_credentials() -> Option<(String, String)> {
    load_env();
    Some((
        non_empty("JURIST_TEST__EMAIL")?,
        non_empty("JURIST_TEST__PASSWORD")?,
    ))
}

fn controller(project: &SupabaseConfig) -> SessionController {
    let client = Arc::new(
        SupabaseClient::new(
            project,
            &SessionConfig::default(),
            Arc::new(MemorySessionStore::new()),
        )
        .expect("configured client"),
    );
    SessionController::new(client.clone(), client)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_process_bootstraps_signed_out() {
    let Some(project) = project() else {
        eprintln!("SKIP: JURIST_SUPABASE__URL / JURIST_SUPABASE__ANON_KEY not set");
        return;
    };

    let controller = controller(&project);
    let snapshot = controller.bootstrap().await;
    assert_eq!(snapshot.status(), SessionStatus::Unauthenticated);
    controller.shutdown().await;
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let Some(project) = project() else {
        eprintln!("SKIP: JURIST_SUPABASE__URL / JURIST_SUPABASE__ANON_KEY not set");
        return;
    };
    let Some((email, _)) = test_credentials() else {
        eprintln!("SKIP: JURIST_TEST__EMAIL / JURIST_TEST__PASSWORD not set");
        return;
    };

    let controller = controller(&project);
    controller.bootstrap().await;
    let err = controller
        .sign_in(&email, "definitely-not-the-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials), "got {err:?}");
    assert_eq!(controller.snapshot().status(), SessionStatus::Unauthenticated);
    eprintln!("  PASS: wrong password rejected: {err}");
    controller.shutdown().await;
}

#[tokio::test]
async fn sign_in_then_sign_out() {
    let Some(project) = project() else {
        eprintln!("SKIP: JURIST_SUPABASE__URL / JURIST_SUPABASE__ANON_KEY not set");
        return;
    };
    let Some((email, password)) = test_credentials() else {
        eprintln!("SKIP: JURIST_TEST__EMAIL / JURIST_TEST__PASSWORD not set");
        return;
    };

    let controller = controller(&project);
    controller.bootstrap().await;

    let snapshot = controller.sign_in(&email, &password).await.expect("sign in");
    let identity = snapshot.identity().expect("authenticated");
    assert_eq!(identity.email.to_lowercase(), email.to_lowercase());
    eprintln!("  signed in as {} ({})", identity.display_name(), identity.role);

    let snapshot = controller.sign_out().await.expect("sign out");
    assert_eq!(snapshot.status(), SessionStatus::Unauthenticated);
    controller.shutdown().await;
}
