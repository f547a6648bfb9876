//! CLI binary that runs the Clover backend-for-frontend.

use core::fmt::Display;
use core::net::SocketAddr;
use std::io::{self, Write as _};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clover_bff::bff::CloverBff;
use clover_bff::config::Config;
use clover_bff::storage::SqliteStorage;
use owo_colors::OwoColorize;
use tokio::net::TcpListener;

/// Clover POS backend-for-frontend.
#[derive(Debug, Parser)]
#[command(name = "clover-bff", version, about)]
struct Cli {
    /// Database URL (overrides `DATABASE_URL`; default: XDG data dir).
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,
    /// Subcommand to execute (default: `serve`).
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API.
    Serve {
        /// Listen address (overrides `CLOVER_BFF_BIND`).
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Apply pending database migrations and exit.
    Migrate,
}

/// Prints an error line to stderr and returns a failing exit code.
fn fail<E: Display>(context: &str, err: &E) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Opens the database at `database_url`, or the default location, and
/// brings its schema up to date.
async fn open_storage(database_url: Option<String>) -> clover_bff::error::Result<SqliteStorage> {
    let url = match database_url {
        Some(url) => url,
        None => SqliteStorage::default_database_url()?,
    };
    let storage = SqliteStorage::connect(&url).await?;
    storage.migrate().await?;
    Ok(storage)
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => return fail("invalid configuration", &err),
    };
    if cli.database_url.is_some() {
        config.database_url = cli.database_url;
    }

    let storage = match open_storage(config.database_url.take()).await {
        Ok(storage) => storage,
        Err(err) => return fail("failed to initialize storage", &err),
    };

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Migrate => {
            writeln!(
                io::stdout().lock(),
                "{} database schema is up to date",
                "ok:".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { bind } => cmd_serve(config, storage, bind).await,
    }
}

/// Executes the `serve` subcommand.
async fn cmd_serve(
    config: Config,
    storage: SqliteStorage,
    bind: Option<SocketAddr>,
) -> io::Result<ExitCode> {
    let mut builder = CloverBff::builder()
        .base_url(config.clover_base_url)
        .storage(storage);
    if let Some(token) = config.clover_access_token {
        builder = builder.fallback_token(token);
    }
    if let Some(merchant_id) = config.clover_merchant_id {
        builder = builder.fallback_merchant(merchant_id);
    }
    let bff = match builder.build() {
        Ok(bff) => bff,
        Err(err) => return fail("failed to build service", &err),
    };

    let address = bind.unwrap_or(config.bind_addr);
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(err) => return fail(&format!("failed to bind {address}"), &err),
    };

    clover_bff::server::serve(listener, Arc::new(bff)).await?;
    Ok(ExitCode::SUCCESS)
}

/// Entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // If stderr itself failed, nothing is left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
