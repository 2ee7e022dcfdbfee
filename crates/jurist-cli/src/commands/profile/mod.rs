mod show;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileCommands;
use crate::context::AppContext;

/// Handle `jur profile <subcommand>`.
pub async fn handle(
    action: &ProfileCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Show => show::handle(ctx, flags),
        ProfileCommands::Update(args) => update::handle(args, ctx, flags).await,
    }
}
