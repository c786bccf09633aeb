//! HackConf administrative CLI
//!
//! Runs check-ins and user removal against the configured database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use hackconf::{
    config::Settings,
    database::{create_pool, run_migrations, PgStore},
    services::ServiceFactory,
    utils::errors::{ErrorSeverity, HackConfError},
    utils::logging,
};

#[derive(Parser, Debug)]
#[command(name = "hackconf", author, version, about = "HackConf check-in and user administration")]
struct Cli {
    /// Configuration file; defaults to ./config.toml when present
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Check a user into an event
    CheckIn {
        #[arg(long)]
        event: i64,
        #[arg(long)]
        user: i64,
    },
    /// List the check-ins of an event
    Attendees {
        #[arg(long)]
        event: i64,
    },
    /// Delete a user and everything they own
    DeleteUser {
        #[arg(long)]
        user: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Settings::new().context("Failed to load configuration")?,
    };
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", hackconf::info());

    // Initialize database connection
    let pool = create_pool(&settings.database).await?;
    if settings.database.run_migrations || matches!(cli.command, Commands::Migrate) {
        run_migrations(&pool).await?;
    }

    let services = ServiceFactory::new(PgStore::new(pool));

    match cli.command {
        Commands::Migrate => {
            info!("Migrations are up to date");
        }
        Commands::CheckIn { event, user } => {
            let response = services.check_ins.check_in(event, user).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Attendees { event } => {
            let attendees = services.check_ins.attendees(event).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&attendees)?);
        }
        Commands::DeleteUser { user } => {
            let response = services.users.delete_by_id(user).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// Log a failed command with the status the HTTP layer would answer with
fn report(e: HackConfError) -> anyhow::Error {
    match e.severity() {
        ErrorSeverity::Info | ErrorSeverity::Warning => {
            warn!(severity = %e.severity(), status = e.status_code(), "{}", e)
        }
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(severity = %e.severity(), status = e.status_code(), "{}", e)
        }
    }
    e.into()
}
