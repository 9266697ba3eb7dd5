mod cli;
mod format;

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client::ApiClient;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use models::{CreateDebtInput, DebtFilter, RegisterInput, UpdateDebtInput};
use service::auth::guards;
use service::routes::Navigator;
use service::{DebtActions, DebtListPipeline, DebtQueries, History, Route, SessionCache};
use tracing::{error, info};
use uuid::Uuid;

use cli::{Cli, Commands};

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Json => common::utils::logging::init_logging_json(),
        LogFormat::Compact => common::utils::logging::init_logging_default(),
    }
    info!(service = "debts", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG, API_URL and DEBTS_* are visible
    dotenv().ok();
    let cli = Cli::parse();

    let mut cfg = match AppConfig::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            format::print_error(&format!("{e:#}"));
            return std::process::ExitCode::FAILURE;
        }
    };
    if let Some(url) = &cli.api_url {
        cfg.api.base_url = url.clone();
    }
    init_logging(cfg.logging.format);
    if let Err(e) = cfg.normalize_and_validate() {
        format::print_error(&format!("{e:#}"));
        return std::process::ExitCode::FAILURE;
    }

    let run_id = Uuid::new_v4();
    let pid = std::process::id();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "debts", event = "panic", %run_id, pid, message = %info, "unhandled panic occurred");
    }));

    // single-threaded event loop
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "debts", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "debts", event = "start", %run_id, pid, version = env!("CARGO_PKG_VERSION"), api = %cfg.api.base_url, "debts starting");
    match rt.block_on(run(cli, cfg)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            format::print_error(&format!("{e:#}"));
            std::process::ExitCode::FAILURE
        }
    }
}

struct App {
    api: Arc<ApiClient>,
    session: SessionCache<ApiClient>,
    nav: History,
    cfg: AppConfig,
}

impl App {
    fn new(cfg: AppConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&cfg.api.base_url)?);
        let session = SessionCache::new(Arc::clone(&api));
        Ok(Self { api, session, nav: History::new(), cfg })
    }

    /// Log in with the global credentials and enter the debt list route.
    async fn open_session(&self, cli: &Cli) -> Result<()> {
        let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
            bail!("this command needs --email and --password (or DEBTS_EMAIL / DEBTS_PASSWORD)");
        };
        if let Err(e) = self.session.login(email, password).await {
            bail!("Error de autenticación: {}", e.user_message("Credenciales incorrectas"));
        }
        match guards::enter(Route::Debts.path(), &self.session, &self.nav).await {
            Some(_) => Ok(()),
            None => Err(anyhow!("not authenticated; redirected to {}", self.nav.current().unwrap_or(Route::Login).path())),
        }
    }

    /// Read-only requests; no list is loaded.
    fn queries(&self) -> DebtQueries<ApiClient> {
        DebtQueries::new(Arc::clone(&self.api))
    }

    /// Mutations over a freshly loaded list.
    fn debts(&self, filter: DebtFilter) -> DebtActions<ApiClient> {
        let list = DebtListPipeline::spawn(Arc::clone(&self.api), filter);
        DebtActions::new(Arc::clone(&self.api), list)
    }

    async fn show_list(&self, actions: &DebtActions<ApiClient>) {
        actions.list().wait_idle().await;
        format::print_debts(&actions.list().snapshot());
    }
}

async fn run(cli: Cli, cfg: AppConfig) -> Result<()> {
    let app = App::new(cfg)?;

    match &cli.command {
        Commands::Register(args) => {
            if guards::enter(Route::Register.path(), &app.session, &app.nav).await.is_none() {
                bail!("already signed in");
            }
            let email = cli.email.clone().context("--email is required to register")?;
            let password = args
                .new_password
                .clone()
                .or_else(|| cli.password.clone())
                .context("--new-password (or --password) is required to register")?;
            let input = RegisterInput {
                first_name: args.first_name.clone(),
                last_name: args.last_name.clone(),
                email,
                password,
            };
            if let Err(e) = app.session.register(input).await {
                bail!("Registro no permitido: {}", e.user_message("Error al registrar"));
            }
            format::print_success("Registro exitoso. Ya puedes iniciar sesión.");
        }
        Commands::Login | Commands::Whoami => {
            app.open_session(&cli).await?;
            let user = app.session.fetch_current_identity().await?;
            println!("{} <{}>", user.full_name(), user.email);
        }
        Commands::Logout => {
            app.open_session(&cli).await?;
            app.session.logout().await?;
            app.nav.navigate(Route::Login);
            format::print_success("Sesión cerrada");
        }
        Commands::List(args) => {
            app.open_session(&cli).await?;
            let actions = app.debts(args.filter);
            if let Some(user) = app.session.current_user() {
                println!("{}", user.full_name());
            }
            app.show_list(&actions).await;
        }
        Commands::Summary => {
            app.open_session(&cli).await?;
            let summary = app.queries().summary().await?;
            format::print_summary(&summary);
        }
        Commands::Show(args) => {
            app.open_session(&cli).await?;
            let debt = app
                .queries()
                .detail(&args.id)
                .await
                .map_err(|e| anyhow!(e.user_message("No fue posible obtener el detalle de la deuda")))?;
            format::print_detail(&debt);
        }
        Commands::Create(args) => {
            app.open_session(&cli).await?;
            let actions = app.debts(DebtFilter::All);
            let input = CreateDebtInput { title: args.title.clone(), amount: args.amount };
            actions
                .create(input)
                .await
                .map_err(|e| anyhow!(e.user_message("No fue posible registrar la deuda. Por favor, intenta nuevamente.")))?;
            format::print_success("Deuda creada");
            app.show_list(&actions).await;
        }
        Commands::Edit(args) => {
            app.open_session(&cli).await?;
            let debt = app.queries().detail(&args.id).await?;
            let actions = app.debts(DebtFilter::All);
            let input = UpdateDebtInput { title: args.title.clone(), amount: args.amount };
            actions
                .edit(&debt, input)
                .await
                .map_err(|e| anyhow!(e.user_message("No fue posible actualizar la deuda.")))?;
            format::print_success("Deuda actualizada");
            app.show_list(&actions).await;
        }
        Commands::Pay(args) => {
            app.open_session(&cli).await?;
            let debt = app.queries().detail(&args.id).await?;
            let actions = app.debts(DebtFilter::All);
            actions
                .pay(&debt)
                .await
                .map_err(|e| anyhow!(e.user_message("No fue posible pagar la deuda.")))?;
            format::print_success("Deuda pagada");
            app.show_list(&actions).await;
        }
        Commands::Delete(args) => {
            app.open_session(&cli).await?;
            let debt = app.queries().detail(&args.id).await?;
            if !args.yes {
                bail!("¿Eliminar \"{}\"? Repite el comando con --yes para confirmar", debt.title);
            }
            let actions = app.debts(DebtFilter::All);
            actions
                .delete(&debt)
                .await
                .map_err(|e| anyhow!(e.user_message("No fue posible eliminar la deuda.")))?;
            format::print_success("La deuda fue eliminada correctamente");
            app.show_list(&actions).await;
        }
        Commands::Export(args) => {
            app.open_session(&cli).await?;
            let dir = args.dir.clone().unwrap_or_else(|| app.cfg.export.dir.clone());
            let path = app.queries().export(args.format, dir).await?;
            format::print_success(&format!("Exportado a {}", path.display()));
        }
    }
    Ok(())
}
