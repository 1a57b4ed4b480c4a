//! JSON rendering.

use super::ExportError;
use crate::repo::bundle::ProjectBundle;
use serde::Serialize;

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Renders project bundles with their nested tasks and notes.
pub fn bundles_to_json(bundles: &[ProjectBundle]) -> Result<String, ExportError> {
    to_pretty_json(bundles)
}
