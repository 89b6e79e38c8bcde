use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

/// A board column as stored in the `columns` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub id: i32,
    pub title: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A column as clients see it. Its id is the status it collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub status: Status,
}

impl From<ColumnRow> for Column {
    fn from(row: ColumnRow) -> Self {
        Column {
            id: row.status.as_str().to_string(),
            title: row.title,
            status: row.status,
        }
    }
}
