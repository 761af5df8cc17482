//! Assembly of report rows from fetched tasks.

use chrono::NaiveDate;
use serde_json::Value;

use super::dates::format_date;
use super::status::{classify_at, TaskStatus};
use crate::api::{OwnedTask, TaskCategory};

/// One line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Task id as returned by the API (usually a number).
    pub id: Value,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub action_date: String,
    pub completion_date: String,
    pub due_date: String,
    pub creation_date: String,
    pub owner_id: i64,
    pub owner_name: String,
}

impl ReportRow {
    pub fn from_task(owned: &OwnedTask, today: NaiveDate) -> Self {
        let task = &owned.task;
        Self {
            id: task.id.clone(),
            category: owned.category,
            status: classify_at(task, today),
            action_date: format_date(task.action_date.as_deref()),
            completion_date: format_date(task.completion_date.as_deref()),
            due_date: format_date(task.due_date.as_deref()),
            creation_date: format_date(task.creation_date.as_deref()),
            owner_id: owned.owner.id,
            owner_name: owned.owner.name.clone(),
        }
    }

    /// Id rendered as text; `null` becomes an empty cell.
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Build report rows ordered by owner name, classifying against `today`.
///
/// The sort is stable, so tasks of one owner keep their fetch order.
pub fn build_rows_at(tasks: &[OwnedTask], today: NaiveDate) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = tasks
        .iter()
        .map(|owned| ReportRow::from_task(owned, today))
        .collect();
    rows.sort_by(|a, b| a.owner_name.cmp(&b.owner_name));
    rows
}
