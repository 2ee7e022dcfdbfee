use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthLoginArgs;
use crate::context::AppContext;
use crate::output::output;

use super::{SessionResponse, resolve_password};

pub async fn handle(args: &AuthLoginArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let password = resolve_password(args.password.as_deref()).await?;
    let snapshot = ctx.session.sign_in(&args.email, &password).await?;
    output(&SessionResponse::from(snapshot), flags.format)
}
