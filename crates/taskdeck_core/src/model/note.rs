//! Project note model.

use super::project::ProjectId;
use super::ValidationError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable note identifier.
pub type NoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub project_id: ProjectId,
    /// Plain text body, stored trimmed.
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl Note {
    pub fn new(project_id: ProjectId, content: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            content: content.into().trim().to_string(),
            created_at,
        }
    }

    /// Case-insensitive substring match used by note search.
    pub fn matches(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::BlankContent);
        }
        Ok(())
    }
}
