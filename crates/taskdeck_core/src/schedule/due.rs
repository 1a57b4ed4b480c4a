//! Due-date classification into reminder buckets.
//!
//! # Invariants
//! - Tasks without a due date or with status `done` land in no bucket.
//! - Buckets are mutually exclusive and keep input order.
//! - Comparison is by calendar day: a task due earlier on the current day is
//!   "due today", never "overdue".

use crate::model::task::{Task, TaskId};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Task identifiers partitioned relative to one reference instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueBuckets {
    pub overdue: Vec<TaskId>,
    pub today: Vec<TaskId>,
    pub tomorrow: Vec<TaskId>,
}

impl DueBuckets {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.tomorrow.is_empty()
    }

    pub fn total(&self) -> usize {
        self.overdue.len() + self.today.len() + self.tomorrow.len()
    }
}

/// Classifies tasks against the calendar day of `now`.
pub fn classify_due(tasks: &[Task], now: NaiveDateTime) -> DueBuckets {
    let today = now.date();
    let tomorrow = today.succ_opt();
    let mut buckets = DueBuckets::default();

    for task in tasks {
        if task.is_done() {
            continue;
        }
        let Some(due_at) = task.due_at else {
            continue;
        };

        let due_day = due_at.date();
        if due_day < today {
            buckets.overdue.push(task.id);
        } else if due_day == today {
            buckets.today.push(task.id);
        } else if Some(due_day) == tomorrow {
            buckets.tomorrow.push(task.id);
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::classify_due;
    use crate::model::task::{Task, TaskStatus};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn task(due: Option<NaiveDateTime>, status: TaskStatus) -> Task {
        let mut task = Task::new(Uuid::new_v4(), "t", at(6, 1, 0)).with_status(status);
        task.due_at = due;
        task
    }

    #[test]
    fn scenario_partitions_overdue_today_tomorrow() {
        let tasks = vec![
            task(Some(at(6, 8, 0)), TaskStatus::Todo),
            task(Some(at(6, 10, 0)), TaskStatus::Todo),
            task(Some(at(6, 11, 0)), TaskStatus::Todo),
            task(Some(at(6, 10, 0)), TaskStatus::Done),
        ];
        let buckets = classify_due(&tasks, at(6, 10, 8));
        assert_eq!(buckets.overdue, vec![tasks[0].id]);
        assert_eq!(buckets.today, vec![tasks[1].id]);
        assert_eq!(buckets.tomorrow, vec![tasks[2].id]);
        assert_eq!(buckets.total(), 3);
    }

    #[test]
    fn done_and_undated_tasks_are_never_bucketed() {
        let tasks = vec![
            task(None, TaskStatus::Todo),
            task(Some(at(1, 1, 0)), TaskStatus::Done),
            task(Some(at(6, 11, 0)), TaskStatus::Done),
        ];
        assert!(classify_due(&tasks, at(6, 10, 8)).is_empty());
    }

    #[test]
    fn earlier_today_counts_as_today_and_later_days_are_ignored() {
        let tasks = vec![
            task(Some(at(6, 10, 1)), TaskStatus::InProgress),
            task(Some(at(6, 12, 0)), TaskStatus::Todo),
        ];
        let buckets = classify_due(&tasks, at(6, 10, 23));
        assert_eq!(buckets.today, vec![tasks[0].id]);
        assert!(buckets.overdue.is_empty());
        assert!(buckets.tomorrow.is_empty());
    }

    #[test]
    fn classification_is_idempotent_and_keeps_input_order() {
        let tasks = vec![
            task(Some(at(6, 2, 0)), TaskStatus::Todo),
            task(Some(at(5, 2, 0)), TaskStatus::Todo),
            task(Some(at(6, 9, 0)), TaskStatus::InProgress),
        ];
        let now = at(6, 10, 8);
        let first = classify_due(&tasks, now);
        let second = classify_due(&tasks, now);
        assert_eq!(first, second);
        assert_eq!(first.overdue, vec![tasks[0].id, tasks[1].id, tasks[2].id]);
    }

    #[test]
    fn month_boundary_tomorrow_is_detected() {
        let tasks = vec![task(Some(at(7, 1, 9)), TaskStatus::Todo)];
        let buckets = classify_due(&tasks, at(6, 30, 20));
        assert_eq!(buckets.tomorrow, vec![tasks[0].id]);
    }
}
