//! Export and import of tracker records.
//!
//! # Responsibility
//! - Render task lists as the task CSV format.
//! - Dump the projects/tasks/notes collections as CSV or JSON files.
//! - Parse task CSV files back into import rows.
//!
//! # Invariants
//! - Rendering is pure: callers decide where bytes go.
//! - Collection exports always produce one file per collection, in
//!   `projects`, `tasks`, `notes` order.

pub mod csv;
pub mod import;
pub mod json;

use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug)]
pub enum ExportError {
    Serialize(serde_json::Error),
    /// Record did not serialize to a flat JSON object.
    UnsupportedShape(&'static str),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize export: {err}"),
            Self::UnsupportedShape(details) => write!(f, "unsupported export shape: {details}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::UnsupportedShape(_) => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format `{other}`; expected csv|json")),
        }
    }
}

/// One rendered export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Renders the three collections as `projects.<ext>`, `tasks.<ext>` and
/// `notes.<ext>`.
pub fn export_collections(
    format: ExportFormat,
    projects: &[Project],
    tasks: &[Task],
    notes: &[Note],
) -> Result<Vec<ExportFile>, ExportError> {
    let render = |name: &str, contents: String| ExportFile {
        file_name: format!("{name}.{}", format.extension()),
        contents,
    };

    let files = match format {
        ExportFormat::Csv => vec![
            render("projects", csv::records_to_csv(projects)?),
            render("tasks", csv::records_to_csv(tasks)?),
            render("notes", csv::records_to_csv(notes)?),
        ],
        ExportFormat::Json => vec![
            render("projects", json::to_pretty_json(projects)?),
            render("tasks", json::to_pretty_json(tasks)?),
            render("notes", json::to_pretty_json(notes)?),
        ],
    };
    Ok(files)
}
