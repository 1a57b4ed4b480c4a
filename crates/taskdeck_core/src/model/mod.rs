//! Domain model for projects, tasks and notes.
//!
//! # Responsibility
//! - Define canonical records used by scheduling, storage and export.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Projects are soft-deleted via tombstones; tasks and notes are hard-deleted.
//! - Titles and note content are non-blank after trimming.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note;
pub mod project;
pub mod task;

/// Field-level validation failure raised before any persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Project or task title is blank after trim.
    BlankTitle,
    /// Note content is blank after trim.
    BlankContent,
    /// A tag value is blank after trim.
    BlankTag,
    /// `deleted_at` is set on a live project or missing on a trashed one.
    TombstoneMismatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::BlankContent => write!(f, "note content must not be blank"),
            Self::BlankTag => write!(f, "tag must not be blank"),
            Self::TombstoneMismatch => {
                write!(f, "deleted_at must be set exactly when the project is trashed")
            }
        }
    }
}

impl Error for ValidationError {}
