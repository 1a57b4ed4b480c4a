//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its status/priority/cadence vocabularies.
//! - Provide stable text codes used by storage, CSV export and import.
//!
//! # Invariants
//! - `title` is non-blank.
//! - `recurrence` and `recurrence_end` are only meaningful when
//!   `is_recurring` is set.
//! - A task without `due_at` never takes part in date-based logic.

use super::project::ProjectId;
use super::ValidationError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Display label, matching the wording users type and export.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in progress",
            Self::Done => "done",
        }
    }

    /// Storage code for the `tasks.status` column.
    pub fn code(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts labels case-insensitively; `in progress`, `in-progress` and
    /// `in_progress` are all the same state.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "todo" | "to do" => Ok(Self::Todo),
            "in progress" | "in-progress" | "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!(
                "unknown task status `{other}`; expected todo|in progress|done"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::from_code(normalized.as_str()).ok_or_else(|| {
            format!("unknown priority `{normalized}`; expected low|medium|high")
        })
    }
}

/// Step size between occurrences of a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn code(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::from_code(normalized.as_str()).ok_or_else(|| {
            format!("unknown cadence `{normalized}`; expected daily|weekly|monthly")
        })
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Wall-clock due instant. `None` excludes the task from reminders.
    pub due_at: Option<NaiveDateTime>,
    pub is_recurring: bool,
    pub recurrence: Cadence,
    pub recurrence_end: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Task {
    /// Creates a `todo`/`medium` task with a generated ID and no due date.
    pub fn new(project_id: ProjectId, title: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            due_at: None,
            is_recurring: false,
            recurrence: Cadence::Daily,
            recurrence_end: None,
            created_at,
        }
    }

    pub fn with_due(mut self, due_at: NaiveDateTime) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Cadence, Priority, TaskStatus};

    #[test]
    fn status_parse_accepts_label_variants() {
        assert_eq!("In Progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(" DONE ".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_codes_round_trip_through_storage_vocabulary() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn priority_and_cadence_default_to_form_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Cadence::default(), Cadence::Daily);
        assert_eq!("Weekly".parse::<Cadence>(), Ok(Cadence::Weekly));
        assert!("yearly".parse::<Cadence>().is_err());
    }
}
