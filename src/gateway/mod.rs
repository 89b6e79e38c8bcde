//! Persistence gateway: row-level access to team members, columns and tasks.
//!
//! The actions layer only talks to the [`Gateway`] trait. [`MongoGateway`] is
//! the production store; [`MemoryGateway`] backs the `memory` store backend
//! and the test suite.

mod memory;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use thiserror::Error;

use crate::config::{Config, StoreBackend};
use crate::models::{ColumnRow, NewTask, TaskRow, TeamMemberRow};

pub use memory::MemoryGateway;
pub use mongo::MongoGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// A task row joined with its assignee row, if any.
pub type JoinedTask = (TaskRow, Option<TeamMemberRow>);

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn team_members(&self) -> Result<Vec<TeamMemberRow>, GatewayError>;

    /// Look up a member by external id.
    async fn team_member_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<TeamMemberRow>, GatewayError>;

    /// Look up a member by internal key.
    async fn team_member(&self, id: i32) -> Result<Option<TeamMemberRow>, GatewayError>;

    async fn columns(&self) -> Result<Vec<ColumnRow>, GatewayError>;

    /// All tasks ordered by id, each joined with its assignee.
    async fn tasks_with_assignee(&self) -> Result<Vec<JoinedTask>, GatewayError>;

    async fn task(&self, id: i32) -> Result<Option<TaskRow>, GatewayError>;

    /// Insert a task under a freshly allocated id.
    async fn insert_task(&self, task: NewTask) -> Result<TaskRow, GatewayError>;

    /// Overwrite every writable field of a task. `Ok(None)` when no row has `id`.
    async fn update_task(&self, id: i32, task: NewTask) -> Result<Option<TaskRow>, GatewayError>;
}

/// Open the store the configuration selects.
pub async fn connect(config: &Config) -> Result<Arc<dyn Gateway>, GatewayError> {
    match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; changes are lost on restart");
            Ok(Arc::new(MemoryGateway::demo()))
        }
        StoreBackend::Mongo => {
            let uri = config
                .mongo_uri
                .as_deref()
                .ok_or_else(|| GatewayError::Unavailable("MONGO_URI must be set".to_string()))?;
            let mongo = MongoGateway::init(uri, &config.database_name).await?;
            mongo.ensure_indexes().await?;
            Ok(Arc::new(mongo))
        }
    }
}
