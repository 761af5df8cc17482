//! Task status classification.

use chrono::{Local, NaiveDate};

use super::dates::{is_blank, parse_iso_date};
use crate::api::Task;

/// Status shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Completed,
    Overdue,
    Pending,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::Pending => "Pending",
        };
        write!(f, "{}", s)
    }
}

/// Classify a task against today's local date.
pub fn classify(task: &Task) -> TaskStatus {
    classify_at(task, Local::now().date_naive())
}

/// Classify a task against an explicit reference date.
///
/// Rules, first match wins:
/// 1. a completion date is set: `Completed`
/// 2. the action date is before `today`: `Overdue`
/// 3. anything else (later, same day, unparseable, missing): `Pending`
pub fn classify_at(task: &Task, today: NaiveDate) -> TaskStatus {
    if !is_blank(task.completion_date.as_deref()) {
        return TaskStatus::Completed;
    }

    let action = task.action_date.as_deref();
    let Some(raw) = action.filter(|_| !is_blank(action)) else {
        return TaskStatus::Pending;
    };

    match parse_iso_date(raw) {
        Ok(date) if date < today => TaskStatus::Overdue,
        Ok(_) => TaskStatus::Pending,
        Err(e) => {
            tracing::debug!("{}, classifying as pending", e);
            TaskStatus::Pending
        }
    }
}
