//! Project use-case service.
//!
//! # Responsibility
//! - Create, edit and move projects through the trash lifecycle.
//! - Assemble project bundles and overviews from the three repositories.
//! - Surface the projects whose reminder falls on a given day.
//!
//! # Invariants
//! - Tags are normalized before they reach storage.
//! - Purge only succeeds for projects already in the trash.
//! - A purge refreshes the attached task feed.

use crate::model::project::{normalize_tag, normalize_tags, Project, ProjectId};
use crate::model::ValidationError;
use crate::repo::bundle::{join_project, ProjectBundle, ProjectOverview};
use crate::repo::note_repo::NoteRepository;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, ProjectScope};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::watch::ChangeFeed;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProjectServiceError {
    InvalidTitle,
    ProjectNotFound(ProjectId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "project title cannot be empty"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            RepoError::Validation(ValidationError::BlankTitle) => Self::InvalidTitle,
            other => Self::Repo(other),
        }
    }
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub reminder_date: Option<NaiveDate>,
    pub notify: bool,
}

/// Editable project fields; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the reminder.
    pub reminder_date: Option<Option<NaiveDate>>,
    pub notify: Option<bool>,
}

pub struct ProjectService<P, T, N>
where
    P: ProjectRepository,
    T: TaskRepository,
    N: NoteRepository,
{
    projects: P,
    tasks: T,
    notes: N,
    feed: Option<ChangeFeed>,
}

impl<P, T, N> ProjectService<P, T, N>
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
            feed: None,
        }
    }

    /// Attaches the task feed refreshed after a purge.
    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn create_project(
        &self,
        draft: &ProjectDraft,
        now: NaiveDateTime,
    ) -> Result<Project, ProjectServiceError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ProjectServiceError::InvalidTitle);
        }

        let mut project = Project::new(title, now);
        project.description = draft.description.trim().to_string();
        project.set_tags(&draft.tags);
        project.reminder_date = draft.reminder_date;
        project.notify = draft.notify;

        self.projects.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok tags={}",
            project.tags.len()
        );
        Ok(project)
    }

    pub fn update_project(
        &self,
        id: ProjectId,
        edit: &ProjectEdit,
    ) -> Result<Project, ProjectServiceError> {
        let mut project = self.require_project(id, false)?;

        if let Some(title) = &edit.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(ProjectServiceError::InvalidTitle);
            }
            project.title = trimmed.to_string();
        }
        if let Some(description) = &edit.description {
            project.description = description.trim().to_string();
        }
        if let Some(tags) = &edit.tags {
            project.tags = normalize_tags(tags);
        }
        if let Some(reminder_date) = edit.reminder_date {
            project.reminder_date = reminder_date;
        }
        if let Some(notify) = edit.notify {
            project.notify = notify;
        }

        self.projects.update_project(&project)?;
        Ok(project)
    }

    pub fn get_project(
        &self,
        id: ProjectId,
        include_deleted: bool,
    ) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.projects.get_project(id, include_deleted)?)
    }

    pub fn trash_project(&self, id: ProjectId, now: NaiveDateTime) -> Result<(), ProjectServiceError> {
        self.projects.trash_project(id, now)?;
        info!("event=project_trash module=service status=ok");
        Ok(())
    }

    pub fn restore_project(&self, id: ProjectId) -> Result<(), ProjectServiceError> {
        self.projects.restore_project(id)?;
        info!("event=project_restore module=service status=ok");
        Ok(())
    }

    /// Permanently removes a trashed project with its tasks and notes.
    pub fn purge_project(&self, id: ProjectId) -> Result<(), ProjectServiceError> {
        self.projects.purge_project(id)?;
        info!("event=project_purge module=service status=ok");
        if let Some(feed) = &self.feed {
            let delivered = feed.publish(&self.tasks);
            debug!("event=feed_refresh module=service status=ok delivered={delivered}");
        }
        Ok(())
    }

    /// Lists active projects, or the trash when `trashed` is set.
    pub fn list_projects(
        &self,
        tag: Option<&str>,
        trashed: bool,
    ) -> Result<Vec<Project>, ProjectServiceError> {
        let query = ProjectListQuery {
            scope: if trashed {
                ProjectScope::Trashed
            } else {
                ProjectScope::Active
            },
            tag: tag.and_then(normalize_tag),
        };
        Ok(self.projects.list_projects(&query)?)
    }

    pub fn available_tags(&self) -> Result<Vec<String>, ProjectServiceError> {
        Ok(self.projects.list_tags()?)
    }

    pub fn project_bundle(&self, id: ProjectId) -> Result<ProjectBundle, ProjectServiceError> {
        let project = self.require_project(id, true)?;
        Ok(join_project(project, &self.tasks, &self.notes)?)
    }

    /// Bundles for every project in `scope`.
    pub fn project_bundles(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<ProjectBundle>, ProjectServiceError> {
        let projects = self.projects.list_projects(&ProjectListQuery {
            scope,
            tag: None,
        })?;
        let mut bundles = Vec::with_capacity(projects.len());
        for project in projects {
            bundles.push(join_project(project, &self.tasks, &self.notes)?);
        }
        Ok(bundles)
    }

    /// Overviews of active projects, optionally filtered by tag.
    pub fn project_overviews(
        &self,
        tag: Option<&str>,
    ) -> Result<Vec<ProjectOverview>, ProjectServiceError> {
        let projects = self.list_projects(tag, false)?;
        let mut overviews = Vec::with_capacity(projects.len());
        for project in projects {
            overviews.push(join_project(project, &self.tasks, &self.notes)?.overview());
        }
        Ok(overviews)
    }

    /// Active projects with notification enabled whose reminder is `today`.
    pub fn due_project_reminders(&self, today: NaiveDate) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.projects.list_reminders(today)?)
    }

    fn require_project(
        &self,
        id: ProjectId,
        include_deleted: bool,
    ) -> Result<Project, ProjectServiceError> {
        self.projects
            .get_project(id, include_deleted)?
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }
}
