//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI host decoupled from storage details.

pub mod dashboard_service;
pub mod note_service;
pub mod project_service;
pub mod task_service;
