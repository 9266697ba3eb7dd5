use clap::{Args, Parser, Subcommand};
use models::{DebtFilter, ExportFormat};

#[derive(Parser)]
#[command(name = "debts")]
#[command(about = "Personal debt tracker: manage your debts from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config.toml and API_URL)
    #[arg(long, global = true, env = "DEBTS_API_URL")]
    pub api_url: Option<String>,

    /// Account email used to open a session for this command
    #[arg(long, global = true, env = "DEBTS_EMAIL")]
    pub email: Option<String>,

    /// Account password used to open a session for this command
    #[arg(long, global = true, env = "DEBTS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check credentials and show who you are
    Login,
    /// Open a session and close it again
    Logout,
    /// Create an account
    Register(RegisterArgs),
    /// Show the signed-in user
    Whoami,
    /// List debts
    List(ListArgs),
    /// Show paid vs pending totals
    Summary,
    /// Show one debt
    Show(IdArgs),
    /// Register a new debt
    Create(CreateArgs),
    /// Change title and/or amount of a pending debt
    Edit(EditArgs),
    /// Mark a pending debt as paid
    Pay(IdArgs),
    /// Delete a pending debt
    Delete(DeleteArgs),
    /// Export all debts to a file
    Export(ExportArgs),
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Password for the new account (defaults to --password)
    #[arg(long = "new-password")]
    pub new_password: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// all, pending or paid
    #[arg(short, long, default_value = "all")]
    pub filter: DebtFilter,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub amount: f64,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// csv or json
    #[arg(short, long)]
    pub format: ExportFormat,
    /// Target directory (defaults to [export] dir in config.toml)
    #[arg(long)]
    pub dir: Option<String>,
}
