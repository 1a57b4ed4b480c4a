//! Notification dedup over successive classifications.

use crate::model::task::{Task, TaskId};
use crate::schedule::classify_due;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderNotice {
    /// First time this task was seen overdue.
    Overdue { task: TaskId },
    DueToday { count: usize },
    DueTomorrow { count: usize },
}

/// Remembers what has already been announced.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    warned_overdue: HashSet<TaskId>,
    last_today: usize,
    last_tomorrow: usize,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `tasks` at `now` and returns only the notices not yet
    /// announced.
    ///
    /// Overdue notices fire once per task ID for the tracker's lifetime.
    /// Count notices fire when their bucket goes from empty to non-empty.
    pub fn observe(&mut self, tasks: &[Task], now: NaiveDateTime) -> Vec<ReminderNotice> {
        let buckets = classify_due(tasks, now);
        let mut notices = Vec::new();

        for id in &buckets.overdue {
            if self.warned_overdue.insert(*id) {
                notices.push(ReminderNotice::Overdue { task: *id });
            }
        }

        let today = buckets.today.len();
        if today > 0 && self.last_today == 0 {
            notices.push(ReminderNotice::DueToday { count: today });
        }
        self.last_today = today;

        let tomorrow = buckets.tomorrow.len();
        if tomorrow > 0 && self.last_tomorrow == 0 {
            notices.push(ReminderNotice::DueTomorrow { count: tomorrow });
        }
        self.last_tomorrow = tomorrow;

        notices
    }

    pub fn has_warned(&self, id: TaskId) -> bool {
        self.warned_overdue.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderNotice, ReminderTracker};
    use crate::model::task::{Task, TaskStatus};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn due(title: &str, when: NaiveDateTime) -> Task {
        Task::new(Uuid::new_v4(), title, at(1, 9)).with_due(when)
    }

    #[test]
    fn overdue_notice_fires_once_per_task() {
        let late = due("late", at(8, 9));
        let tasks = vec![late.clone()];
        let mut tracker = ReminderTracker::new();

        assert_eq!(
            tracker.observe(&tasks, at(10, 8)),
            vec![ReminderNotice::Overdue { task: late.id }]
        );
        assert!(tracker.observe(&tasks, at(10, 9)).is_empty());
        assert!(tracker.has_warned(late.id));
    }

    #[test]
    fn count_notices_fire_on_empty_to_non_empty_transition() {
        let mut tracker = ReminderTracker::new();
        let mut tasks = vec![due("today", at(10, 17))];

        assert_eq!(
            tracker.observe(&tasks, at(10, 8)),
            vec![ReminderNotice::DueToday { count: 1 }]
        );

        tasks.push(due("also today", at(10, 18)));
        assert!(tracker.observe(&tasks, at(10, 8)).is_empty());

        tasks.push(due("tomorrow", at(11, 9)));
        assert_eq!(
            tracker.observe(&tasks, at(10, 8)),
            vec![ReminderNotice::DueTomorrow { count: 1 }]
        );

        for task in &mut tasks {
            task.status = TaskStatus::Done;
        }
        assert!(tracker.observe(&tasks, at(10, 8)).is_empty());
        tasks[0].status = TaskStatus::Todo;
        assert_eq!(
            tracker.observe(&tasks, at(10, 8)),
            vec![ReminderNotice::DueToday { count: 1 }]
        );
    }
}
