//! Command dispatcher that routes parsed clap commands to their handlers.
//!
//! Every handler opens the configured database (creating the schema when
//! needed), runs its store or report calls and prints either a table or JSON.

mod accounts;
mod balances;
mod milestones;
pub mod networth;

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use crate::cli::Commands;
use crate::config::Config;
use crate::db;
use crate::error::TallyError;

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, json_output: bool) -> Result<()> {
    match command {
        Commands::Accounts { action } => accounts::dispatch_accounts(action, json_output).await,
        Commands::Balances { action } => balances::dispatch_balances(action, json_output).await,
        Commands::Networth { action } => networth::dispatch_networth(action, json_output).await,
        Commands::Milestones { action } => {
            milestones::dispatch_milestones(action, json_output).await
        }
        Commands::Config => dispatch_config(json_output).await,
    }
}

/// Load config, make sure the schema exists and open a connection
pub(crate) fn open_store() -> Result<(Config, Connection)> {
    let config = Config::load()?;
    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent).map_err(TallyError::Io)?;
    }
    debug!("Using database {:?}", config.database);

    db::init_database(&config.database)?;
    let conn = db::open_db(&config.database)?;
    Ok((config, conn))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn dispatch_config(json_output: bool) -> Result<()> {
    let config = Config::load()?;

    if json_output {
        return print_json(&config);
    }

    println!("Data directory:   {}", config.data_dir.display());
    println!(
        "Config file:      {}{}",
        config.config_file.display(),
        if config.config_file.exists() {
            ""
        } else {
            " (not present, using defaults)"
        }
    );
    println!("Database:         {}", config.database.display());
    println!("Default currency: {}", config.default_currency);
    Ok(())
}
