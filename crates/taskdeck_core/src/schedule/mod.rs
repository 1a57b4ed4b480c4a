//! Date-driven task logic: recurrence expansion and due-date bucketing.
//!
//! # Responsibility
//! - Turn one recurring task request into its concrete occurrence dates.
//! - Classify tasks into overdue / due-today / due-tomorrow buckets.
//! - Lay tasks out over a seven-day agenda.
//!
//! # Invariants
//! - Every function here is pure: inputs plus an explicit `now`, no clock
//!   reads, no storage access.
//! - Day comparisons use the wall-clock calendar day of each instant.

pub mod days;
pub mod due;
pub mod recurrence;
pub mod week;

pub use due::{classify_due, DueBuckets};
pub use recurrence::expand_occurrences;
pub use week::{build_weekly_agenda, AgendaDay, WeeklyAgenda};
