// src/actions.rs

use std::sync::Arc;

use log::{debug, error, info};

use crate::error::{ActionError, ActionResult};
use crate::gateway::Gateway;
use crate::models::{Column, DebugTaskInput, NewTask, Task, TaskInput, TaskRow, TeamMember};

/// Task repository actions: the read and write operations the board uses.
///
/// Every public method settles into an [`ActionResult`]; failures are logged
/// here and never escape as errors.
#[derive(Clone)]
pub struct TaskActions {
    gateway: Arc<dyn Gateway>,
}

impl TaskActions {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        TaskActions { gateway }
    }

    pub async fn list_team_members(&self) -> ActionResult<Vec<TeamMember>> {
        settle("list team members", self.try_list_team_members().await)
    }

    pub async fn list_columns(&self) -> ActionResult<Vec<Column>> {
        settle("list columns", self.try_list_columns().await)
    }

    pub async fn list_tasks(&self) -> ActionResult<Vec<Task>> {
        settle("list tasks", self.try_list_tasks().await)
    }

    pub async fn create_task(&self, input: TaskInput) -> ActionResult<Task> {
        settle("create task", self.try_create_task(input).await)
    }

    pub async fn update_task(&self, id: &str, input: TaskInput) -> ActionResult<Task> {
        settle("update task", self.try_update_task(id, input).await)
    }

    pub async fn get_task_by_id(&self, id: &str) -> ActionResult<Task> {
        settle("get task", self.try_get_task_by_id(id).await)
    }

    /// Create a task from a partial payload, filling the debug defaults.
    pub async fn create_debug_task(&self, input: DebugTaskInput) -> ActionResult<Task> {
        debug!("Debug create received: {:?}", input);
        self.create_task(input.into()).await
    }

    async fn try_list_team_members(&self) -> Result<Vec<TeamMember>, ActionError> {
        let rows = self
            .gateway
            .team_members()
            .await
            .map_err(ActionError::store("failed to fetch team members"))?;
        Ok(rows.into_iter().map(TeamMember::from).collect())
    }

    async fn try_list_columns(&self) -> Result<Vec<Column>, ActionError> {
        let rows = self
            .gateway
            .columns()
            .await
            .map_err(ActionError::store("failed to fetch columns"))?;
        Ok(rows.into_iter().map(Column::from).collect())
    }

    async fn try_list_tasks(&self) -> Result<Vec<Task>, ActionError> {
        let rows = self
            .gateway
            .tasks_with_assignee()
            .await
            .map_err(ActionError::store("failed to fetch tasks"))?;
        Ok(rows
            .into_iter()
            .map(|(task, assignee)| Task::from_row(task, assignee))
            .collect())
    }

    async fn try_create_task(&self, input: TaskInput) -> Result<Task, ActionError> {
        validate_title(&input.title)?;
        let assignee_key = self.resolve_assignee(&input).await?;

        let inserted = self
            .gateway
            .insert_task(draft(input, assignee_key))
            .await
            .map_err(ActionError::store("failed to create task"))?;
        info!("Task created: {}", inserted.id);

        let row = self.reread(inserted.id).await?;
        self.resolve_row(row).await
    }

    async fn try_update_task(&self, id: &str, input: TaskInput) -> Result<Task, ActionError> {
        let key = parse_task_id(id)?;
        validate_title(&input.title)?;

        let existing = self
            .gateway
            .task(key)
            .await
            .map_err(ActionError::store("failed to fetch task"))?;
        if existing.is_none() {
            return Err(ActionError::NotFound(id.to_string()));
        }

        // Resolve before writing so a bad assignee leaves the row untouched.
        let assignee_key = self.resolve_assignee(&input).await?;

        let updated = self
            .gateway
            .update_task(key, draft(input, assignee_key))
            .await
            .map_err(ActionError::store("failed to update task"))?;
        if updated.is_none() {
            return Err(ActionError::NotFound(id.to_string()));
        }
        info!("Task updated: {}", key);

        let row = self.reread(key).await?;
        self.resolve_row(row).await
    }

    async fn try_get_task_by_id(&self, id: &str) -> Result<Task, ActionError> {
        let key = parse_task_id(id)?;
        let row = self
            .gateway
            .task(key)
            .await
            .map_err(ActionError::store("failed to fetch task"))?
            .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
        self.resolve_row(row).await
    }

    /// Internal member key for the input's assignee, `None` when unassigned.
    async fn resolve_assignee(&self, input: &TaskInput) -> Result<Option<i32>, ActionError> {
        let Some(user_id) = input.assignee_ref() else {
            return Ok(None);
        };
        let member = self
            .gateway
            .team_member_by_user_id(user_id)
            .await
            .map_err(ActionError::store("failed to resolve assignee"))?
            .ok_or_else(|| ActionError::AssigneeNotFound(user_id.to_string()))?;
        Ok(Some(member.id))
    }

    async fn reread(&self, key: i32) -> Result<TaskRow, ActionError> {
        self.gateway
            .task(key)
            .await
            .map_err(ActionError::store("failed to re-read task"))?
            .ok_or_else(|| ActionError::NotFound(key.to_string()))
    }

    async fn resolve_row(&self, row: TaskRow) -> Result<Task, ActionError> {
        let assignee = match row.assignee_id {
            Some(key) => self
                .gateway
                .team_member(key)
                .await
                .map_err(ActionError::store("failed to resolve assignee"))?,
            None => None,
        };
        Ok(Task::from_row(row, assignee))
    }
}

fn settle<T>(action: &str, result: Result<T, ActionError>) -> ActionResult<T> {
    if let Err(e) = &result {
        error!("Failed to {}: {}", action, e);
    }
    result.into()
}

fn validate_title(title: &str) -> Result<(), ActionError> {
    if title.trim().is_empty() {
        return Err(ActionError::Validation("title required".to_string()));
    }
    Ok(())
}

/// Task ids are integers in the store; anything else cannot match a row.
fn parse_task_id(id: &str) -> Result<i32, ActionError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ActionError::Validation("task id required".to_string()));
    }
    id.parse().map_err(|_| ActionError::NotFound(id.to_string()))
}

fn draft(input: TaskInput, assignee_id: Option<i32>) -> NewTask {
    NewTask {
        title: input.title,
        description: input.description,
        status: input.status,
        priority: Some(input.priority.unwrap_or_default()),
        assignee_id,
    }
}
