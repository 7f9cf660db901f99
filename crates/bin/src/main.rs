use std::process::ExitCode;

use clap::Parser;
use haus_auth::AuthConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod store;

use cli::{Cli, Commands, UserCommands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haus_auth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    // The catalog is static; no store or config needed
    if let Commands::Scopes = cli.command {
        commands::scopes::run(format)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => AuthConfig::load_from_file(path)?,
        None => AuthConfig::default(),
    };
    let store = store::open_store(&cli.store).await?;

    match &cli.command {
        Commands::Scopes => {}
        Commands::User(UserCommands::Create(args)) => {
            commands::user::create(&store, args, format).await?
        }
        Commands::User(UserCommands::List) => commands::user::list(&store, format).await?,
        Commands::User(UserCommands::Delete(args)) => commands::user::delete(&store, args).await?,
        Commands::User(UserCommands::Grant(args)) => {
            commands::user::grant(&store, args, format).await?
        }
        Commands::Check(args) => {
            if !commands::check::run(&store, args, format).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Bootstrap => commands::bootstrap::run(&store, &config, format).await?,
    }
    Ok(ExitCode::SUCCESS)
}
