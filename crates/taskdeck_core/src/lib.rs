//! Core domain logic for Taskdeck.
//! This crate is the single source of truth for tracker invariants: recurrence
//! expansion, due-date bucketing, storage and export.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod notify;
pub mod palette;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod watch;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId};
pub use model::project::{Project, ProjectId};
pub use model::task::{Cadence, Priority, Task, TaskId, TaskStatus};
pub use model::ValidationError;
pub use repo::bundle::{ProjectBundle, ProjectOverview, StatusCounts};
pub use repo::note_repo::{NoteListQuery, NoteRepository, SqliteNoteRepository};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRepository, ProjectScope, SqliteProjectRepository,
};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::{
    build_weekly_agenda, classify_due, expand_occurrences, AgendaDay, DueBuckets, WeeklyAgenda,
};
pub use service::dashboard_service::{
    ActivityEntry, ActivityKind, DashboardService, DashboardSummary, ACTIVITY_FEED_LEN,
};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::project_service::{ProjectDraft, ProjectEdit, ProjectService, ProjectServiceError};
pub use service::task_service::{
    AddTaskRequest, ImportReport, TaskEdit, TaskFilter, TaskPage, TaskService, TaskServiceError,
};
pub use watch::{ChangeFeed, SubscriptionId, TaskSource};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
