//! Task CSV import.
//!
//! # Invariants
//! - Only the header row is mandatory; a missing `Title` column fails the
//!   whole import.
//! - Row problems never abort the import: each bad row is reported with its
//!   1-based line number and skipped.

use crate::model::task::{Priority, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date regex"));
static US_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid us date regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Input has no header row.
    Empty,
    MissingColumn(&'static str),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "csv input is empty"),
            Self::MissingColumn(name) => write!(f, "csv header is missing the `{name}` column"),
        }
    }
}

impl Error for ImportError {}

/// One accepted import row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTask {
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTasks {
    pub rows: Vec<ImportedTask>,
    /// `(line number, reason)` per rejected row.
    pub errors: Vec<(usize, String)>,
    /// `(line number, reason)` per row imported with a field dropped.
    pub warnings: Vec<(usize, String)>,
}

struct Columns {
    title: usize,
    status: Option<usize>,
    priority: Option<usize>,
    due: Option<usize>,
}

/// Parses task CSV text with a `Title,Status,Priority,Due Date` style header.
///
/// Header names match case-insensitively in any order. Blank status and
/// priority fall back to `todo` and `medium`. An unrecognized due date is
/// dropped with a warning and the task is kept undated.
pub fn parse_tasks_csv(text: &str) -> Result<ParsedTasks, ImportError> {
    let mut records = split_records(text)
        .into_iter()
        .filter(|(_, fields)| fields.iter().any(|field| !field.trim().is_empty()));

    let Some((_, header)) = records.next() else {
        return Err(ImportError::Empty);
    };
    let columns = locate_columns(&header)?;

    let mut parsed = ParsedTasks::default();
    for (line, fields) in records {
        match parse_row(&columns, &fields) {
            Ok((row, warning)) => {
                if let Some(reason) = warning {
                    parsed.warnings.push((line, reason));
                }
                parsed.rows.push(row);
            }
            Err(reason) => parsed.errors.push((line, reason)),
        }
    }
    Ok(parsed)
}

/// Parses `YYYY-MM-DD` or `M/D/YYYY` into midnight of that day.
pub fn parse_import_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let (year, month, day): (i32, u32, u32) = if let Some(caps) = ISO_DATE_RE.captures(value) {
        (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    } else if let Some(caps) = US_DATE_RE.captures(value) {
        (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn locate_columns(header: &[String]) -> Result<Columns, ImportError> {
    let find = |name: &str| {
        header
            .iter()
            .position(|field| field.trim().eq_ignore_ascii_case(name))
    };
    Ok(Columns {
        title: find("title").ok_or(ImportError::MissingColumn("Title"))?,
        status: find("status"),
        priority: find("priority"),
        due: find("due date"),
    })
}

fn parse_row(
    columns: &Columns,
    fields: &[String],
) -> Result<(ImportedTask, Option<String>), String> {
    let cell = |index: Option<usize>| {
        index
            .and_then(|i| fields.get(i))
            .map(|value| value.trim())
            .unwrap_or("")
    };

    let title = cell(Some(columns.title));
    if title.is_empty() {
        return Err("title is empty".to_string());
    }

    let status = match cell(columns.status) {
        "" => TaskStatus::Todo,
        value => value.parse::<TaskStatus>()?,
    };
    let priority = match cell(columns.priority) {
        "" => Priority::Medium,
        value => value.parse::<Priority>()?,
    };
    let (due_at, warning) = match cell(columns.due) {
        "" => (None, None),
        value => match parse_import_date(value) {
            Some(due_at) => (Some(due_at), None),
            None => (None, Some(format!("unrecognized due date `{value}`, imported undated"))),
        },
    };

    let task = ImportedTask {
        title: title.to_string(),
        status,
        priority,
        due_at,
    };
    Ok((task, warning))
}

/// Splits CSV text into records, tracking the line each record starts on.
///
/// Quoted fields may contain commas, doubled quotes and line breaks.
fn split_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' => {
                line += 1;
                if in_quotes {
                    field.push('\n');
                } else {
                    fields.push(std::mem::take(&mut field));
                    records.push((record_line, std::mem::take(&mut fields)));
                    record_line = line;
                }
            }
            other => field.push(other),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }
    records
}
