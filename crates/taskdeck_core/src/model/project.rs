//! Project domain model.
//!
//! # Responsibility
//! - Define the project record and its soft-delete lifecycle.
//! - Normalize tag sets so filtering and storage agree on spelling.
//!
//! # Invariants
//! - `tags` is lowercase, trimmed, deduplicated and sorted.
//! - `is_deleted` is the source of truth for trash state; `deleted_at` is set
//!   exactly when `is_deleted` is true.

use super::ValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Calendar day on which a reminder should surface.
    pub reminder_date: Option<NaiveDate>,
    /// Whether the reminder on `reminder_date` is enabled.
    pub notify: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Project {
    pub fn new(title: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            reminder_date: None,
            notify: false,
            is_deleted: false,
            deleted_at: None,
            created_at,
        }
    }

    /// Replaces the tag set with its normalized form.
    pub fn set_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.tags = normalize_tags(tags);
    }

    /// Moves the project to trash.
    pub fn soft_delete(&mut self, at: NaiveDateTime) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|needle| self.tags.iter().any(|t| *t == needle))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::BlankTag);
        }
        if self.is_deleted != self.deleted_at.is_some() {
            return Err(ValidationError::TombstoneMismatch);
        }
        Ok(())
    }
}

/// Normalizes one tag value: trimmed and lowercased, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values, dropping blanks.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag.as_ref()) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}
