//! Dashboard statistics and activity feed.
//!
//! # Invariants
//! - Weekly counts start at Monday 00:00 of `now`'s week.
//! - The activity feed takes the newest few records of each kind, merges
//!   them newest first and truncates the merged list.

use crate::model::project::Project;
use crate::repo::note_repo::NoteRepository;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, ProjectScope};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;
use crate::schedule::days::start_of_week;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Records pulled per kind, newest `created_at` first, before merging.
pub const ACTIVITY_PER_KIND: u32 = 5;
/// Length of the merged activity feed.
pub const ACTIVITY_FEED_LEN: usize = 10;
/// Note excerpts in the feed are cut to this many characters.
pub const NOTE_EXCERPT_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub active_projects: usize,
    pub trashed_projects: usize,
    pub tasks_this_week: u32,
    pub notes_this_week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProjectAdded,
    ProjectTrashed,
    TaskCreated,
    NoteCreated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub message: String,
    pub at: NaiveDateTime,
}

pub struct DashboardService<P, T, N>
where
    P: ProjectRepository,
    T: TaskRepository,
    N: NoteRepository,
{
    projects: P,
    tasks: T,
    notes: N,
}

impl<P, T, N> DashboardService<P, T, N>
where
    P: ProjectRepository,
    T: TaskRepository,
    N: NoteRepository,
{
    pub fn new(projects: P, tasks: T, notes: N) -> Self {
        Self {
            projects,
            tasks,
            notes,
        }
    }

    pub fn summary(&self, now: NaiveDateTime) -> RepoResult<DashboardSummary> {
        let week_start = start_of_week(now);
        let active = self.projects.list_projects(&ProjectListQuery::default())?;
        let trashed = self.projects.list_projects(&ProjectListQuery {
            scope: ProjectScope::Trashed,
            tag: None,
        })?;

        Ok(DashboardSummary {
            active_projects: active.len(),
            trashed_projects: trashed.len(),
            tasks_this_week: self.tasks.count_tasks_created_since(week_start)?,
            notes_this_week: self.notes.count_notes_created_since(week_start)?,
        })
    }

    /// Merges recent projects, tasks and notes newest first, keeping at most
    /// `limit` entries.
    pub fn activity_feed(&self, limit: usize) -> RepoResult<Vec<ActivityEntry>> {
        let mut entries = Vec::new();

        for project in self.projects.list_recent_projects(ACTIVITY_PER_KIND)? {
            entries.push(project_entry(&project));
        }
        for task in self.tasks.list_recent_tasks(ACTIVITY_PER_KIND)? {
            entries.push(ActivityEntry {
                kind: ActivityKind::TaskCreated,
                message: task.title,
                at: task.created_at,
            });
        }
        for note in self.notes.list_recent_notes(ACTIVITY_PER_KIND)? {
            entries.push(ActivityEntry {
                kind: ActivityKind::NoteCreated,
                message: excerpt(&note.content, NOTE_EXCERPT_CHARS),
                at: note.created_at,
            });
        }

        // Stable sort keeps project, task, note order on equal timestamps.
        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries.truncate(limit);
        Ok(entries)
    }
}

fn project_entry(project: &Project) -> ActivityEntry {
    let kind = if project.is_deleted {
        ActivityKind::ProjectTrashed
    } else {
        ActivityKind::ProjectAdded
    };
    ActivityEntry {
        kind,
        message: project.title.clone(),
        at: project.created_at,
    }
}

fn excerpt(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
