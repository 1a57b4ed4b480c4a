//! CSV rendering.

use super::ExportError;
use crate::model::task::Task;
use serde::Serialize;
use serde_json::Value;

/// Header of the task CSV format, shared with import.
pub const TASK_CSV_HEADER: [&str; 4] = ["Title", "Status", "Priority", "Due Date"];

/// Wraps a field in double quotes, doubling embedded quotes.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Renders tasks as `Title,Status,Priority,Due Date` rows.
///
/// Due dates are written as `YYYY-MM-DD`; undated tasks get an empty field.
pub fn tasks_to_csv(tasks: &[Task]) -> String {
    let mut out = TASK_CSV_HEADER.join(",");
    out.push('\n');
    for task in tasks {
        let due = task
            .due_at
            .map(|due| due.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let row = [
            quote_field(&task.title),
            quote_field(task.status.label()),
            quote_field(task.priority.code()),
            quote_field(&due),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Renders serializable records with a header taken from the first record's
/// field names. An empty slice renders as an empty string.
pub fn records_to_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::to_value(record)? {
            Value::Object(map) => rows.push(map),
            _ => return Err(ExportError::UnsupportedShape("record is not an object")),
        }
    }

    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let keys: Vec<String> = first.keys().cloned().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(keys.join(","));
    for row in &rows {
        let fields: Vec<String> = keys
            .iter()
            .map(|key| render_value(row.get(key).unwrap_or(&Value::Null)))
            .collect();
        lines.push(fields.join(","));
    }
    Ok(lines.join("\n"))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => quote_field(""),
        Value::String(text) => quote_field(text),
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(";");
            quote_field(&joined)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{quote_field, records_to_csv, tasks_to_csv};
    use crate::model::note::Note;
    use crate::model::task::{Priority, Task, TaskStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_field(r#"say "hi", then"#), r#""say ""hi"", then""#);
    }

    #[test]
    fn task_csv_renders_dates_and_blank_due() {
        let created = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let tasks = vec![
            Task::new(Uuid::new_v4(), "Ship, then rest", created)
                .with_due(due)
                .with_status(TaskStatus::InProgress)
                .with_priority(Priority::High),
            Task::new(Uuid::new_v4(), "Someday", created),
        ];

        assert_eq!(
            tasks_to_csv(&tasks),
            "Title,Status,Priority,Due Date\n\
             \"Ship, then rest\",\"in progress\",\"high\",\"2024-06-10\"\n\
             \"Someday\",\"todo\",\"medium\",\"\"\n"
        );
    }

    #[test]
    fn record_csv_uses_field_names_and_handles_empty_input() {
        assert_eq!(records_to_csv::<Note>(&[]).unwrap(), "");

        let created = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let note = Note::new(Uuid::nil(), "hello", created);
        let csv = records_to_csv(&[note.clone()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("content,created_at,id,project_id"));
        assert_eq!(
            lines.next().map(str::to_string),
            Some(format!(
                "\"hello\",\"2024-06-01T09:00:00\",\"{}\",\"{}\"",
                note.id,
                Uuid::nil()
            ))
        );
    }
}
