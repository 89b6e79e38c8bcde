mod column;
mod task;
mod team;

use std::fmt;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

pub use column::{Column, ColumnRow};
pub use task::{DebugTaskInput, NewTask, Task, TaskInput, TaskRow, UNASSIGNED};
pub use team::{TeamMember, TeamMemberRow};

/// The closed set of board statuses. Every column and every task carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for Bson {
    fn from(status: Status) -> Self {
        Bson::String(status.as_str().to_string())
    }
}

/// Task priority. Rows stored without one read back as `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl From<Priority> for Bson {
    fn from(priority: Priority) -> Self {
        Bson::String(priority.as_str().to_string())
    }
}
