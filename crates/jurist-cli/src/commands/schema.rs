use jurist_core::{Identity, ProfileUpdate, SessionSnapshot};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `jur schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Snapshot => schema_for!(SessionSnapshot),
        SchemaType::Identity => schema_for!(Identity),
        SchemaType::ProfileUpdate => schema_for!(ProfileUpdate),
    };
    output(&schema, flags.format)
}
