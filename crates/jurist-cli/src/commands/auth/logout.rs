use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    signed_out: bool,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.session.sign_out().await?;
    output(
        &AuthLogoutResponse {
            signed_out: !snapshot.is_authenticated(),
        },
        flags.format,
    )
}
