//! Seven-day agenda layout.

use super::due::classify_due;
use crate::model::task::{Task, TaskId};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Number of day columns in the agenda, starting with today.
pub const AGENDA_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    /// Tasks due on `date` in input order, whatever their status.
    pub tasks: Vec<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyAgenda {
    pub days: Vec<AgendaDay>,
    /// Same membership as the classifier's overdue bucket.
    pub overdue: Vec<TaskId>,
}

/// Lays tasks out over today and the following six days.
pub fn build_weekly_agenda(tasks: &[Task], now: NaiveDateTime) -> WeeklyAgenda {
    let today = now.date();
    let days = (0..AGENDA_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let tasks = tasks
                .iter()
                .filter(|task| task.due_at.is_some_and(|due| due.date() == date))
                .map(|task| task.id)
                .collect();
            AgendaDay { date, tasks }
        })
        .collect();

    WeeklyAgenda {
        days,
        overdue: classify_due(tasks, now).overdue,
    }
}

#[cfg(test)]
mod tests {
    use super::build_weekly_agenda;
    use crate::model::task::{Task, TaskStatus};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn agenda_spans_seven_days_and_includes_done_tasks() {
        let project = Uuid::new_v4();
        let done_today = Task::new(project, "shipped", at(1, 0))
            .with_due(at(10, 9))
            .with_status(TaskStatus::Done);
        let in_six = Task::new(project, "review", at(1, 0)).with_due(at(16, 0));
        let in_seven = Task::new(project, "later", at(1, 0)).with_due(at(17, 0));
        let late = Task::new(project, "late", at(1, 0)).with_due(at(3, 0));

        let tasks = vec![done_today.clone(), in_six.clone(), in_seven, late.clone()];
        let agenda = build_weekly_agenda(&tasks, at(10, 8));

        assert_eq!(agenda.days.len(), 7);
        assert_eq!(agenda.days[0].date, at(10, 0).date());
        assert_eq!(agenda.days[0].tasks, vec![done_today.id]);
        assert_eq!(agenda.days[6].tasks, vec![in_six.id]);
        assert_eq!(agenda.overdue, vec![late.id]);
        let placed: usize = agenda.days.iter().map(|day| day.tasks.len()).sum();
        assert_eq!(placed, 2);
    }
}
