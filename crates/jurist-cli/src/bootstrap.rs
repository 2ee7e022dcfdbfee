use std::path::Path;

use anyhow::Context;
use jurist_config::JuristConfig;

use crate::cli::GlobalFlags;

pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<JuristConfig> {
    load_dotenv(flags.env_file.as_deref())?;
    JuristConfig::load().context("failed to load jurist configuration")
}

/// An explicit `--env-file` must exist; otherwise a `.env` in the current
/// directory is picked up when present.
fn load_dotenv(env_file: Option<&str>) -> anyhow::Result<()> {
    if let Some(path) = env_file {
        let path = Path::new(path);
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load dotenv file at {}", path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
