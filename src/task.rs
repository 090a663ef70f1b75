// Task record and its field bounds

use crate::error::{Result, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical date format stored in the `date` column
pub const DATE_FORMAT: &str = "%Y%m%d";

pub const DATE_LEN: usize = 8;
pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_COMMENT_LEN: usize = 255;
pub const MAX_REPEAT_LEN: usize = 128;

/// A scheduled task as persisted in the `scheduler` table
///
/// `repeat` holds recurrence-rule text that this crate stores but never
/// interprets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl Task {
    /// Build an unsaved task; the store assigns the id on insert
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
        repeat: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            date: date.into(),
            title: title.into(),
            comment: comment.into(),
            repeat: repeat.into(),
        }
    }

    /// Check the invariants every persisted task must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(StoreError::InvalidTask("title cannot be empty".to_string()));
        }
        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("comment", &self.comment, MAX_COMMENT_LEN)?;
        check_len("repeat", &self.repeat, MAX_REPEAT_LEN)?;

        let date_len = self.date.chars().count();
        if date_len != 0 && date_len != DATE_LEN {
            return Err(StoreError::InvalidTask(format!(
                "date must be empty or {} characters, got {:?}",
                DATE_LEN, self.date
            )));
        }

        Ok(())
    }

    /// Calendar date, if `date` is a valid YYYYMMDD string
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        if self.date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(StoreError::InvalidTask(format!(
            "{} too long: {} chars (max {})",
            field, len, max
        )));
    }
    Ok(())
}
