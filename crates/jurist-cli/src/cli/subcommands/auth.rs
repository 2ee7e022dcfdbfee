use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password.
    Login(AuthLoginArgs),
    /// Create a client account and sign in.
    Signup(AuthSignupArgs),
    /// Sign out and clear the stored session.
    Logout,
    /// Show the current session.
    Status,
    /// Print every session change until interrupted.
    Watch,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    #[arg(long)]
    pub email: String,
    /// Read from stdin when omitted.
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthSignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// Read from stdin when omitted.
    #[arg(long)]
    pub password: Option<String>,
}
