//! Taskdeck command-line host.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use log::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("taskdeck {}", taskdeck_core::core_version());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    let log_dir = config.log_dir()?;
    if let Err(err) = taskdeck_core::init_logging(config.log_level(), &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let db_path = config.db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = taskdeck_core::open_db(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Commands::Project { command } => cli::project::run(&conn, command),
        Commands::Task { command } => cli::task::run(&conn, &config, command),
        Commands::Note { command } => cli::note::run(&conn, command),
        Commands::Reminders(args) => cli::reminders::run(&conn, &config, args),
        Commands::Overdue(args) => cli::report::overdue(&conn, args),
        Commands::Week(args) => cli::report::week(&conn, args),
        Commands::Dashboard(args) => cli::report::dashboard(&conn, args),
        Commands::Export { command } => cli::export::run(&conn, command),
        Commands::Version => Ok(()),
    }
}
