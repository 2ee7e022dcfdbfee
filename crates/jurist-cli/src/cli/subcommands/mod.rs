pub mod auth;
pub mod profile;

pub use auth::{AuthCommands, AuthLoginArgs, AuthSignupArgs};
pub use profile::{ProfileCommands, ProfileUpdateArgs};
