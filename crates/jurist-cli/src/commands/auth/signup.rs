use jurist_auth::SignUp;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthSignupArgs;
use crate::context::AppContext;
use crate::output::output;

use super::{SessionResponse, resolve_password};

pub async fn handle(args: &AuthSignupArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let password = resolve_password(args.password.as_deref()).await?;
    let form = SignUp {
        email: args.email.clone(),
        password,
        full_name: args.full_name.clone(),
        phone: args.phone.clone().filter(|phone| !phone.trim().is_empty()),
    };
    let snapshot = ctx.session.sign_up(&form).await?;
    output(&SessionResponse::from(snapshot), flags.format)
}
