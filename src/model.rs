use crate::date::to_iso_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TaskId = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Stored as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub done: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Task {
    pub fn new(id: TaskId, title: String, date: NaiveDate, created_at: i64) -> Self {
        Task {
            id,
            title,
            date,
            done: false,
            created_at,
        }
    }

    pub fn iso_date(&self) -> String {
        to_iso_date(self.date)
    }
}
