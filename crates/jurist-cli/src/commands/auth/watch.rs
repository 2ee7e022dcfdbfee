use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::SessionResponse;

/// Print the current snapshot, then one line per change until Ctrl-C.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut changes = ctx.session.subscribe();
    let current = changes.borrow_and_update().clone();
    output(&SessionResponse::from(current), flags.format)?;

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = changes.borrow_and_update().clone();
                output(&SessionResponse::from(snapshot), flags.format)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
