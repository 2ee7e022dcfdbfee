use jurist_auth::AuthError;
use jurist_core::ProfileUpdate;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileUpdateArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &ProfileUpdateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let update = to_update(args)?;
    let snapshot = ctx.session.update_profile(&update).await?;
    let identity = snapshot.identity().ok_or(AuthError::NotAuthenticated)?;
    output(identity, flags.format)
}

fn to_update(args: &ProfileUpdateArgs) -> anyhow::Result<ProfileUpdate> {
    let update = ProfileUpdate {
        full_name: args.full_name.clone(),
        phone: args.phone.clone(),
    };
    if update.is_empty() {
        anyhow::bail!("profile update: pass --full-name and/or --phone");
    }
    Ok(update)
}
