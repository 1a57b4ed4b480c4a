//! Task use-case service.
//!
//! # Responsibility
//! - Turn add-task requests into persisted occurrences.
//! - Provide paged listing, status tallies and date views over tasks.
//! - Refresh attached change-feed subscribers after every write.
//!
//! # Invariants
//! - Blank titles are rejected before any storage call.
//! - A recurring request is stored as one batch: all occurrences or none.
//! - Feed refresh runs only after the write succeeded.

use crate::export::import::{parse_tasks_csv, ImportError, ImportedTask};
use crate::model::project::ProjectId;
use crate::model::task::{Cadence, Priority, Task, TaskId, TaskStatus};
use crate::model::ValidationError;
use crate::repo::bundle::StatusCounts;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoError;
use crate::schedule::{build_weekly_agenda, classify_due, expand_occurrences, DueBuckets, WeeklyAgenda};
use crate::watch::{ChangeFeed, SubscriptionId};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is empty after trimming.
    InvalidTitle,
    TaskNotFound(TaskId),
    /// CSV payload could not be read at all.
    Import(ImportError),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title cannot be empty"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(ValidationError::BlankTitle) => Self::InvalidTitle,
            other => Self::Repo(other),
        }
    }
}

impl From<ImportError> for TaskServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Input for [`TaskService::add_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskRequest {
    pub project_id: ProjectId,
    pub title: String,
    pub priority: Priority,
    /// First due date; the current instant when absent.
    pub due_at: Option<NaiveDateTime>,
    pub is_recurring: bool,
    pub recurrence: Cadence,
    pub recurrence_end: Option<NaiveDateTime>,
}

impl AddTaskRequest {
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            priority: Priority::Medium,
            due_at: None,
            is_recurring: false,
            recurrence: Cadence::Daily,
            recurrence_end: None,
        }
    }

    pub fn recurring(mut self, cadence: Cadence, until: NaiveDateTime) -> Self {
        self.is_recurring = true;
        self.recurrence = cadence;
        self.recurrence_end = Some(until);
        self
    }
}

/// Editable task fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the due date.
    pub due_at: Option<Option<NaiveDateTime>>,
}

/// One page of a task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub items: Vec<Task>,
    /// One-based page number actually served.
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u32,
}

/// Listing filters accepted by [`TaskService::list_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<TaskId>,
    /// `(line number, reason)` for every rejected row.
    pub rejected: Vec<(usize, String)>,
    /// `(line number, reason)` for rows imported without their due date.
    pub warnings: Vec<(usize, String)>,
}

pub struct TaskService<R: TaskRepository> {
    repo: R,
    feed: ChangeFeed,
    page_size: u32,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            feed: ChangeFeed::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the listing page size; zero falls back to the default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Replaces the service's feed with a shared one.
    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = feed;
        self
    }

    /// Handle to this service's feed, for sharing with other services.
    pub fn feed(&self) -> ChangeFeed {
        self.feed.clone()
    }

    /// Registers a change subscription and delivers the current snapshot.
    pub fn subscribe<F>(
        &mut self,
        query: TaskListQuery,
        callback: F,
    ) -> Result<SubscriptionId, TaskServiceError>
    where
        F: FnMut(&[Task]) + 'static,
    {
        Ok(self.feed.subscribe(&self.repo, query, callback)?)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.feed.unsubscribe(id)
    }

    /// Creates one task per occurrence of the request.
    ///
    /// Returns the stored occurrences in due-date order.
    pub fn add_task(
        &mut self,
        request: &AddTaskRequest,
        now: NaiveDateTime,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TaskServiceError::InvalidTitle);
        }

        let base = request.due_at.unwrap_or(now);
        let dates = if request.is_recurring {
            expand_occurrences(base, request.recurrence, request.recurrence_end)
        } else {
            vec![base]
        };

        let tasks: Vec<Task> = dates
            .into_iter()
            .map(|due_at| Task {
                id: Uuid::new_v4(),
                project_id: request.project_id,
                title: title.to_string(),
                status: TaskStatus::Todo,
                priority: request.priority,
                due_at: Some(due_at),
                is_recurring: request.is_recurring,
                recurrence: request.recurrence,
                recurrence_end: request.recurrence_end,
                created_at: now,
            })
            .collect();

        self.repo.create_tasks(&tasks)?;
        info!(
            "event=task_add module=service status=ok occurrences={} recurring={}",
            tasks.len(),
            request.is_recurring
        );
        self.refresh_feed();
        Ok(tasks)
    }

    /// Applies an edit to title, priority and due date.
    pub fn edit_task(&mut self, id: TaskId, edit: &TaskEdit) -> Result<Task, TaskServiceError> {
        let mut task = self
            .repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        if let Some(title) = &edit.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(TaskServiceError::InvalidTitle);
            }
            task.title = trimmed.to_string();
        }
        if let Some(priority) = edit.priority {
            task.priority = priority;
        }
        if let Some(due_at) = edit.due_at {
            task.due_at = due_at;
        }

        self.repo.update_task(&task)?;
        self.refresh_feed();
        Ok(task)
    }

    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), TaskServiceError> {
        self.repo.set_task_status(id, status)?;
        debug!(
            "event=task_status module=service status=ok value={}",
            status.code()
        );
        self.refresh_feed();
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        self.refresh_feed();
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Lists one page of tasks. `page` is one-based and clamped into range.
    pub fn list_tasks(&self, filter: &TaskFilter, page: u32) -> Result<TaskPage, TaskServiceError> {
        let mut query = TaskListQuery {
            project_id: filter.project_id,
            status: filter.status,
            title_contains: filter.search.clone(),
            limit: None,
            offset: 0,
        };
        let total_items = self.repo.count_tasks(&query)?;
        let total_pages = total_items.div_ceil(self.page_size).max(1);
        let page = page.clamp(1, total_pages);

        query.limit = Some(self.page_size);
        query.offset = (page - 1) * self.page_size;
        let items = self.repo.list_tasks(&query)?;

        Ok(TaskPage {
            items,
            page,
            total_pages,
            total_items,
        })
    }

    /// Every task matching the filter, unpaged.
    pub fn all_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(&TaskListQuery {
            project_id: filter.project_id,
            status: filter.status,
            title_contains: filter.search.clone(),
            limit: None,
            offset: 0,
        })?)
    }

    pub fn status_counts(&self, project_id: Option<ProjectId>) -> Result<StatusCounts, TaskServiceError> {
        let tasks = self.all_tasks(&TaskFilter {
            project_id,
            ..TaskFilter::default()
        })?;
        Ok(StatusCounts::from_tasks(&tasks))
    }

    /// Overdue / today / tomorrow buckets across all tasks.
    pub fn due_buckets(&self, now: NaiveDateTime) -> Result<DueBuckets, TaskServiceError> {
        let tasks = self.all_tasks(&TaskFilter::default())?;
        Ok(classify_due(&tasks, now))
    }

    pub fn weekly_agenda(&self, now: NaiveDateTime) -> Result<WeeklyAgenda, TaskServiceError> {
        let tasks = self.all_tasks(&TaskFilter::default())?;
        Ok(build_weekly_agenda(&tasks, now))
    }

    /// Imports tasks from CSV text into `project_id`.
    ///
    /// Valid rows are stored in one batch; invalid rows are reported by line
    /// and skipped.
    pub fn import_csv(
        &mut self,
        project_id: ProjectId,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<ImportReport, TaskServiceError> {
        let parsed = parse_tasks_csv(text)?;
        let tasks: Vec<Task> = parsed
            .rows
            .into_iter()
            .map(|row: ImportedTask| {
                let mut task = Task::new(project_id, row.title, now)
                    .with_status(row.status)
                    .with_priority(row.priority);
                task.due_at = row.due_at;
                task
            })
            .collect();

        let imported = if tasks.is_empty() {
            Vec::new()
        } else {
            self.repo.create_tasks(&tasks)?
        };
        info!(
            "event=task_import module=service status=ok imported={} rejected={} warnings={}",
            imported.len(),
            parsed.errors.len(),
            parsed.warnings.len()
        );
        if !imported.is_empty() {
            self.refresh_feed();
        }
        Ok(ImportReport {
            imported,
            rejected: parsed.errors,
            warnings: parsed.warnings,
        })
    }

    fn refresh_feed(&mut self) {
        if self.feed.is_empty() {
            return;
        }
        let delivered = self.feed.publish(&self.repo);
        debug!("event=feed_refresh module=service status=ok delivered={delivered}");
    }
}
