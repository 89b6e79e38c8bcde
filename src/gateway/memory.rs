use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Gateway, GatewayError, JoinedTask};
use crate::models::{ColumnRow, NewTask, Priority, Status, TaskRow, TeamMemberRow};

/// In-process store with the same row semantics as the Mongo gateway.
///
/// Writes take the table lock, so each insert or update is atomic.
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Tables {
    members: Vec<TeamMemberRow>,
    columns: Vec<ColumnRow>,
    tasks: Vec<TaskRow>,
    last_task_id: i32,
}

const DEMO_MEMBERS: [(&str, &str, &str); 5] = [
    ("user-1", "Alex Johnson", "https://ui.shadcn.com/avatars/01.png"),
    ("user-2", "Sam Wilson", "https://ui.shadcn.com/avatars/02.png"),
    ("user-3", "Taylor Kim", "https://ui.shadcn.com/avatars/03.png"),
    ("user-4", "Jordan Lee", "https://ui.shadcn.com/avatars/04.png"),
    ("user-5", "Casey Morgan", "https://ui.shadcn.com/avatars/05.png"),
];

const DEMO_COLUMNS: [(&str, Status); 3] = [
    ("Todo", Status::Todo),
    ("In Progress", Status::InProgress),
    ("Done", Status::Done),
];

// (title, description, status, priority, assignee member key)
const DEMO_TASKS: [(&str, &str, Status, Priority, i32); 6] = [
    ("Research competitors", "Analyze top 5 competitors in the market", Status::Todo, Priority::High, 1),
    ("Design homepage", "Create wireframes for the new homepage", Status::Todo, Priority::Medium, 2),
    ("Setup CI/CD pipeline", "Configure GitHub Actions for automated testing", Status::InProgress, Priority::High, 3),
    ("Implement authentication", "Add user login and registration functionality", Status::InProgress, Priority::Medium, 4),
    ("Write documentation", "Create user guide for the admin panel", Status::Done, Priority::Low, 5),
    ("Fix navigation bug", "Resolve issue with dropdown menu on mobile", Status::Done, Priority::High, 1),
];

impl Tables {
    fn check_assignee(&self, key: Option<i32>) -> Result<(), GatewayError> {
        match key {
            Some(key) if !self.members.iter().any(|m| m.id == key) => Err(GatewayError::Unavailable(
                format!("foreign key violation: team member {} does not exist", key),
            )),
            _ => Ok(()),
        }
    }
}

impl MemoryGateway {
    /// A store holding the demo team, the three status columns and a
    /// handful of tasks.
    pub fn demo() -> Self {
        let now = Utc::now();
        let members = DEMO_MEMBERS
            .iter()
            .zip(1..)
            .map(|(&(user_id, name, avatar), id)| TeamMemberRow {
                id,
                user_id: user_id.to_string(),
                name: name.to_string(),
                avatar: Some(avatar.to_string()),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let columns = DEMO_COLUMNS
            .iter()
            .zip(1..)
            .map(|(&(title, status), id)| ColumnRow {
                id,
                title: title.to_string(),
                status,
                created_at: now,
                updated_at: now,
            })
            .collect();
        let tasks: Vec<TaskRow> = DEMO_TASKS
            .iter()
            .zip(1..)
            .map(|(&(title, description, status, priority, assignee), id)| TaskRow {
                id,
                title: title.to_string(),
                description: Some(description.to_string()),
                status,
                priority: Some(priority),
                assignee_id: Some(assignee),
                created_at: now,
                updated_at: now,
            })
            .collect();
        let last_task_id = tasks.len() as i32;

        MemoryGateway {
            tables: RwLock::new(Tables {
                members,
                columns,
                tasks,
                last_task_id,
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail, as if the store went away.
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn team_members(&self) -> Result<Vec<TeamMemberRow>, GatewayError> {
        self.check()?;
        Ok(self.tables.read().await.members.clone())
    }

    async fn team_member_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<TeamMemberRow>, GatewayError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|m| m.user_id == user_id).cloned())
    }

    async fn team_member(&self, id: i32) -> Result<Option<TeamMemberRow>, GatewayError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn columns(&self) -> Result<Vec<ColumnRow>, GatewayError> {
        self.check()?;
        Ok(self.tables.read().await.columns.clone())
    }

    async fn tasks_with_assignee(&self) -> Result<Vec<JoinedTask>, GatewayError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut joined: Vec<JoinedTask> = tables
            .tasks
            .iter()
            .map(|task| {
                let assignee = task
                    .assignee_id
                    .and_then(|key| tables.members.iter().find(|m| m.id == key).cloned());
                (task.clone(), assignee)
            })
            .collect();
        joined.sort_by_key(|(task, _)| task.id);
        Ok(joined)
    }

    async fn task(&self, id: i32) -> Result<Option<TaskRow>, GatewayError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_task(&self, task: NewTask) -> Result<TaskRow, GatewayError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.check_assignee(task.assignee_id)?;
        tables.last_task_id += 1;
        let now = Utc::now();
        let row = TaskRow {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(row.clone());
        Ok(row)
    }

    async fn update_task(&self, id: i32, task: NewTask) -> Result<Option<TaskRow>, GatewayError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.check_assignee(task.assignee_id)?;
        let Some(row) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        row.title = task.title;
        row.description = task.description;
        row.status = task.status;
        row.priority = task.priority;
        row.assignee_id = task.assignee_id;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, assignee_id: Option<i32>) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            status: Status::Todo,
            priority: None,
            assignee_id,
        }
    }

    #[tokio::test]
    async fn demo_store_joins_assignees() {
        let gateway = MemoryGateway::demo();
        let tasks = gateway.tasks_with_assignee().await.unwrap();
        assert_eq!(tasks.len(), 6);
        let (first, assignee) = &tasks[0];
        assert_eq!(first.title, "Research competitors");
        assert_eq!(assignee.as_ref().map(|m| m.name.as_str()), Some("Alex Johnson"));
    }

    #[tokio::test]
    async fn inserts_allocate_increasing_ids() {
        let gateway = MemoryGateway::default();
        let a = gateway.insert_task(draft("a", None)).await.unwrap();
        let b = gateway.insert_task(draft("b", None)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn dangling_assignee_key_is_rejected() {
        let gateway = MemoryGateway::default();
        assert!(gateway.insert_task(draft("a", Some(99))).await.is_err());
        assert!(gateway.tasks_with_assignee().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_none() {
        let gateway = MemoryGateway::demo();
        assert_eq!(gateway.update_task(9999, draft("x", None)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let gateway = MemoryGateway::demo();
        gateway.set_unavailable(true);
        assert!(matches!(
            gateway.team_members().await,
            Err(GatewayError::Unavailable(_))
        ));
        gateway.set_unavailable(false);
        assert_eq!(gateway.columns().await.unwrap().len(), 3);
    }
}
