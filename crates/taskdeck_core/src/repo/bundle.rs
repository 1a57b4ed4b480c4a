//! Read-time join of a project with its tasks and notes.
//!
//! # Invariants
//! - Bundles are assembled from repository reads only; nothing is cached.
//! - `last_updated` is the newest `created_at` among the project's tasks and
//!   notes, `None` when it has neither.

use super::note_repo::{NoteListQuery, NoteRepository};
use super::task_repo::{TaskListQuery, TaskRepository};
use super::RepoResult;
use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::task::{Task, TaskStatus};
use chrono::NaiveDateTime;
use serde::Serialize;

/// A project together with every task and note that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBundle {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
}

impl ProjectBundle {
    pub fn overview(&self) -> ProjectOverview {
        let last_updated = self
            .tasks
            .iter()
            .map(|task| task.created_at)
            .chain(self.notes.iter().map(|note| note.created_at))
            .max();

        ProjectOverview {
            project: self.project.clone(),
            counts: StatusCounts::from_tasks(&self.tasks),
            note_count: self.notes.len(),
            last_updated,
        }
    }
}

/// Per-status task tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Todo => self.todo += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Done => self.done += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            counts.add(task.status);
        }
        counts
    }
}

/// Summary row for project listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectOverview {
    pub project: Project,
    pub counts: StatusCounts,
    pub note_count: usize,
    pub last_updated: Option<NaiveDateTime>,
}

/// Loads the tasks and notes of `project` and joins them.
pub fn join_project<T, N>(project: Project, tasks: &T, notes: &N) -> RepoResult<ProjectBundle>
where
    T: TaskRepository,
    N: NoteRepository,
{
    let task_list = tasks.list_tasks(&TaskListQuery::for_project(project.id))?;
    let note_list = notes.list_notes(&NoteListQuery {
        project_id: Some(project.id),
        search: None,
    })?;
    Ok(ProjectBundle {
        project,
        tasks: task_list,
        notes: note_list,
    })
}
