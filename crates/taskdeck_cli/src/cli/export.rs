//! `taskdeck export` subcommands implementation

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use taskdeck_core::db::Connection;
use taskdeck_core::export::json::bundles_to_json;
use taskdeck_core::export::{export_collections, ExportFormat};
use taskdeck_core::ProjectScope;

use super::project_service;

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Write projects.csv, tasks.csv and notes.csv
    Csv(ExportArgs),

    /// Write projects.json, tasks.json and notes.json
    Json(ExportJsonArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Target directory
    #[arg(long, short, default_value = ".")]
    out: PathBuf,
}

#[derive(Args)]
pub struct ExportJsonArgs {
    #[command(flatten)]
    target: ExportArgs,

    /// Also write bundles.json with each project's tasks and notes nested
    #[arg(long)]
    bundles: bool,
}

pub fn run(conn: &Connection, command: ExportCommands) -> Result<()> {
    match command {
        ExportCommands::Csv(args) => write_collections(conn, ExportFormat::Csv, &args.out, false),
        ExportCommands::Json(args) => {
            write_collections(conn, ExportFormat::Json, &args.target.out, args.bundles)
        }
    }
}

fn write_collections(
    conn: &Connection,
    format: ExportFormat,
    out: &Path,
    with_bundles: bool,
) -> Result<()> {
    let bundles = project_service(conn)?.project_bundles(ProjectScope::All)?;
    let projects: Vec<_> = bundles.iter().map(|bundle| bundle.project.clone()).collect();
    let tasks: Vec<_> = bundles.iter().flat_map(|bundle| bundle.tasks.clone()).collect();
    let notes: Vec<_> = bundles.iter().flat_map(|bundle| bundle.notes.clone()).collect();

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let mut files = export_collections(format, &projects, &tasks, &notes)?;
    if with_bundles {
        files.push(taskdeck_core::export::ExportFile {
            file_name: "bundles.json".to_string(),
            contents: bundles_to_json(&bundles)?,
        });
    }

    for file in files {
        let path = out.join(&file.file_name);
        fs::write(&path, file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
