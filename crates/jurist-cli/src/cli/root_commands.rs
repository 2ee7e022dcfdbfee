use clap::{Args, Subcommand, ValueEnum};

use crate::cli::subcommands::{AuthCommands, ProfileCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, register, sign out and inspect the session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// The signed-in user's profile.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Print the JSON Schema of an output type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Snapshot,
    Identity,
    ProfileUpdate,
}
