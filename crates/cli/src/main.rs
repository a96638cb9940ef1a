use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stockdesk_api::{ApiErrorKind, ClassifiedError};
use stockdesk_retrieval::RetrievalError;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod output;

use app::App;
use commands::cart::CartCommands;
use commands::stock::StockCommands;
use commands::ListArgs;

#[derive(Parser)]
#[command(name = "stockdesk")]
#[command(about = "Inventory console client for the stockdesk API", long_about = None)]
struct Cli {
    /// Overrides STOCKDESK_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from STOCKDESK_PASSWORD or stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// End the session on the server and locally
    Logout,
    /// Show the signed-in user
    Whoami,
    #[command(subcommand)]
    Stock(StockCommands),
    /// List console users
    Users {
        #[command(flatten)]
        list: ListArgs,
    },
    #[command(subcommand)]
    Cart(CartCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    let cli = Cli::parse();
    let app = match App::bootstrap(cli.api_url.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    match run(&app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&app, &e).await;
            ExitCode::FAILURE
        },
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();
    Ok(())
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            commands::auth::run_login(app, &username, password).await
        },
        Commands::Logout => commands::auth::run_logout(app).await,
        Commands::Whoami => commands::auth::run_whoami(app),
        Commands::Stock(cmd) => commands::stock::run(app, cmd).await,
        Commands::Users { list } => commands::users::run_list(app, list).await,
        Commands::Cart(cmd) => commands::cart::run(app, cmd).await,
    }
}

/// Failures from the API were already announced by the error pipeline.
/// Everything else is printed here. A rejected session waits for the
/// sign-in redirect so the user sees where to go next.
async fn report(app: &App, error: &anyhow::Error) {
    let classified = error.downcast_ref::<ClassifiedError>().or_else(|| {
        match error.downcast_ref::<RetrievalError>() {
            Some(RetrievalError::Api(e)) => Some(e),
            _ => None,
        }
    });
    match classified {
        Some(e) => {
            tracing::debug!(kind = ?e.kind, status = ?e.status, "command failed");
            if e.kind == ApiErrorKind::Unauthorized {
                app.wait_for_redirect().await;
            }
        },
        None => eprintln!("error: {error:#}"),
    }
}
