use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Log in with email and password
    Login(LoginArgs),

    /// Create an account and log in
    Register(RegisterArgs),

    /// Log out (clear the stored token)
    Logout,

    /// Show the current session
    Session(JsonArgs),

    /// List dreams, pending first
    Dreams(JsonArgs),

    /// Show one dream
    Show(ShowArgs),

    /// Submit a new dream and follow it until generation finishes
    Create(CreateArgs),

    /// Follow generation progress of an existing dream
    Watch(WatchArgs),

    /// Check backend service health
    Health(JsonArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "DREAMECHO_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "DREAMECHO_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Args)]
pub(crate) struct JsonArgs {
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct ShowArgs {
    pub(crate) dream_id: String,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long)]
    pub(crate) description: String,
    #[arg(long, default_value = "")]
    pub(crate) mood: String,
    #[arg(long, default_value = "")]
    pub(crate) style: String,
}

#[derive(Args)]
pub(crate) struct WatchArgs {
    pub(crate) dream_id: String,
}
