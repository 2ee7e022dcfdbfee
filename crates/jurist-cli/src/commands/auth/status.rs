use jurist_core::{Identity, SessionStatus};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    status: SessionStatus,
    project: String,
    identity: Option<Identity>,
    session_source: Option<&'static str>,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.session.snapshot();
    output(
        &AuthStatusResponse {
            authenticated: snapshot.is_authenticated(),
            status: snapshot.status(),
            project: ctx.config.supabase.base_url().to_string(),
            identity: snapshot.identity().cloned(),
            session_source: ctx.session_source(),
        },
        flags.format,
    )
}
