use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Priority, Status, TeamMember, TeamMemberRow};

/// Assignee value the task dialog submits when nobody is selected.
pub const UNASSIGNED: &str = "unassigned";

/// A task as stored in the `tasks` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable columns of a task row, used for both insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Option<Priority>,
    pub assignee_id: Option<i32>,
}

/// A task as clients see it, with the assignee resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<TeamMember>,
}

impl Task {
    pub fn from_row(row: TaskRow, assignee: Option<TeamMemberRow>) -> Self {
        Task {
            id: row.id.to_string(),
            title: row.title,
            description: row.description.unwrap_or_default(),
            status: row.status,
            priority: row.priority.unwrap_or_default(),
            assignee: assignee.map(TeamMember::from),
        }
    }

    /// The full-field input that would write this task back unchanged,
    /// apart from the assignee.
    pub fn to_input(&self, assignee_id: Option<String>) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            status: self.status,
            priority: Some(self.priority),
            assignee_id,
        }
    }
}

/// Payload for creating or updating a task. Updates replace every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

impl TaskInput {
    /// The external assignee id to resolve, or `None` when the input
    /// leaves the task unassigned.
    pub fn assignee_ref(&self) -> Option<&str> {
        self.assignee_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != UNASSIGNED)
    }
}

/// Payload of the debug create route, where every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
}

impl From<DebugTaskInput> for TaskInput {
    fn from(debug: DebugTaskInput) -> Self {
        TaskInput {
            title: debug
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Debug Task".to_string()),
            description: Some(
                debug
                    .description
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| "Created from debug API".to_string()),
            ),
            status: debug.status.unwrap_or(Status::Todo),
            priority: Some(debug.priority.unwrap_or_default()),
            assignee_id: debug.assignee_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(priority: Option<Priority>, description: Option<&str>) -> TaskRow {
        let now = Utc::now();
        TaskRow {
            id: 7,
            title: "Design homepage".into(),
            description: description.map(String::from),
            status: Status::Todo,
            priority,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_columns_are_normalized() {
        let task = Task::from_row(row(None, None), None);
        assert_eq!(task.id, "7");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
        assert!(task.assignee.is_none());
    }

    #[test]
    fn unassigned_task_has_no_assignee_key() {
        let task = Task::from_row(row(Some(Priority::Low), Some("wireframes")), None);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("assignee").is_none());
        assert_eq!(json["priority"], "low");
    }

    #[test]
    fn sentinel_and_blank_assignees_mean_nobody() {
        let mut input: TaskInput = serde_json::from_str(
            r#"{"title":"t","status":"todo","assigneeId":"unassigned"}"#,
        )
        .unwrap();
        assert_eq!(input.assignee_ref(), None);
        input.assignee_id = Some("  ".into());
        assert_eq!(input.assignee_ref(), None);
        input.assignee_id = None;
        assert_eq!(input.assignee_ref(), None);
        input.assignee_id = Some("user-2".into());
        assert_eq!(input.assignee_ref(), Some("user-2"));
    }

    #[test]
    fn debug_input_fills_defaults() {
        let input = TaskInput::from(DebugTaskInput {
            title: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(input.title, "Debug Task");
        assert_eq!(input.description.as_deref(), Some("Created from debug API"));
        assert_eq!(input.status, Status::Todo);
        assert_eq!(input.priority, Some(Priority::Medium));
        assert_eq!(input.assignee_id, None);
    }
}
