mod login;
mod logout;
mod signup;
mod status;
mod watch;

use anyhow::Context;
use jurist_core::{Identity, SessionSnapshot, SessionStatus};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `jur auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, ctx, flags).await,
        AuthCommands::Signup(args) => signup::handle(args, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags),
        AuthCommands::Watch => watch::handle(ctx, flags).await,
    }
}

/// Response shared by commands that end with a snapshot.
#[derive(Serialize)]
struct SessionResponse {
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<Identity>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            status: snapshot.status(),
            identity: snapshot.identity().cloned(),
        }
    }
}

/// Use the `--password` value, or read one line from stdin.
async fn resolve_password(arg: Option<&str>) -> anyhow::Result<String> {
    if let Some(password) = arg {
        return Ok(password.to_string());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("failed to read password from stdin")?
        .unwrap_or_default();
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("no password given: pass --password or pipe it on stdin");
    }
    Ok(password)
}
