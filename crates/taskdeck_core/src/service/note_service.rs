//! Note use-case service.
//!
//! # Invariants
//! - Note content is trimmed; blank content never reaches storage.
//! - Note lists are newest first.

use crate::model::note::{Note, NoteId};
use crate::model::project::ProjectId;
use crate::model::ValidationError;
use crate::repo::note_repo::{NoteListQuery, NoteRepository};
use crate::repo::RepoError;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NoteServiceError {
    EmptyContent,
    NoteNotFound(NoteId),
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the note.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content cannot be empty"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(ValidationError::BlankContent) => Self::EmptyContent,
            other => Self::Repo(other),
        }
    }
}

pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_note(
        &self,
        project_id: ProjectId,
        content: &str,
        now: NaiveDateTime,
    ) -> Result<Note, NoteServiceError> {
        if content.trim().is_empty() {
            return Err(NoteServiceError::EmptyContent);
        }
        let note = Note::new(project_id, content, now);
        self.repo.create_note(&note)?;
        Ok(note)
    }

    /// Replaces the note body.
    pub fn edit_note(&self, id: NoteId, content: &str) -> Result<Note, NoteServiceError> {
        if content.trim().is_empty() {
            return Err(NoteServiceError::EmptyContent);
        }
        self.repo.update_note_content(id, content)?;
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "edited note not found in read-back",
            ))
    }

    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        Ok(())
    }

    pub fn list_notes(
        &self,
        project_id: Option<ProjectId>,
        search: Option<&str>,
    ) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes(&NoteListQuery {
            project_id,
            search: search.map(str::to_string),
        })?)
    }
}
