use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, from_document, to_bson, Document};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::Deserialize;

use super::{Gateway, GatewayError, JoinedTask};
use crate::models::{ColumnRow, NewTask, TaskRow, TeamMemberRow};

const TASK_SEQUENCE: &str = "tasks";

pub struct MongoGateway {
    db: Database,
}

/// Shape of a task document after the `$lookup` on `team_members`.
#[derive(Debug, Deserialize)]
struct TaskWithAssignee {
    #[serde(flatten)]
    task: TaskRow,
    #[serde(default)]
    assignee: Option<TeamMemberRow>,
}

impl MongoGateway {
    pub async fn init(uri: &str, db_name: &str) -> Result<Self, GatewayError> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        Ok(MongoGateway {
            db: client.database(db_name),
        })
    }

    /// Unique keys the relational layout relies on: member and task ids, and
    /// the external member id.
    pub async fn ensure_indexes(&self) -> Result<(), GatewayError> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.members()
            .create_index(IndexModel::builder().keys(doc! { "id": 1 }).options(unique()).build())
            .await?;
        self.members()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.tasks()
            .create_index(IndexModel::builder().keys(doc! { "id": 1 }).options(unique()).build())
            .await?;
        info!("Indexes ensured on {}", self.db.name());
        self.sync_task_sequence().await
    }

    /// Raise the task sequence to the highest stored task id, so rows seeded
    /// without a counter document are never handed out again.
    async fn sync_task_sequence(&self) -> Result<(), GatewayError> {
        let highest = self.tasks().find_one(doc! {}).sort(doc! { "id": -1 }).await?;
        let Some(row) = highest else {
            return Ok(());
        };
        self.counters()
            .update_one(doc! { "_id": TASK_SEQUENCE }, sequence_floor(row.id))
            .upsert(true)
            .await?;
        debug!("Task sequence is at least {}", row.id);
        Ok(())
    }

    fn members(&self) -> Collection<TeamMemberRow> {
        self.db.collection("team_members")
    }

    fn columns_coll(&self) -> Collection<ColumnRow> {
        self.db.collection("columns")
    }

    fn tasks(&self) -> Collection<TaskRow> {
        self.db.collection("tasks")
    }

    fn counters(&self) -> Collection<Document> {
        self.db.collection("counters")
    }

    /// Allocate the next value of a named integer sequence.
    async fn next_id(&self, sequence: &str) -> Result<i32, GatewayError> {
        let counter = self
            .counters()
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        counter
            .and_then(|c| c.get_i32("seq").ok())
            .ok_or_else(|| GatewayError::Unavailable(format!("sequence {} did not advance", sequence)))
    }
}

/// Counter update that never moves a sequence backwards.
fn sequence_floor(floor: i32) -> Document {
    doc! { "$max": { "seq": floor } }
}

#[async_trait]
impl Gateway for MongoGateway {
    async fn team_members(&self) -> Result<Vec<TeamMemberRow>, GatewayError> {
        let members = self
            .members()
            .find(doc! {})
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(members)
    }

    async fn team_member_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<TeamMemberRow>, GatewayError> {
        Ok(self.members().find_one(doc! { "user_id": user_id }).await?)
    }

    async fn team_member(&self, id: i32) -> Result<Option<TeamMemberRow>, GatewayError> {
        Ok(self.members().find_one(doc! { "id": id }).await?)
    }

    async fn columns(&self) -> Result<Vec<ColumnRow>, GatewayError> {
        let columns = self
            .columns_coll()
            .find(doc! {})
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(columns)
    }

    async fn tasks_with_assignee(&self) -> Result<Vec<JoinedTask>, GatewayError> {
        let pipeline = vec![
            doc! { "$sort": { "id": 1 } },
            doc! { "$lookup": {
                "from": "team_members",
                "localField": "assignee_id",
                "foreignField": "id",
                "as": "assignee",
            } },
            doc! { "$unwind": { "path": "$assignee", "preserveNullAndEmptyArrays": true } },
        ];
        let docs: Vec<Document> = self.tasks().aggregate(pipeline).await?.try_collect().await?;
        docs.into_iter()
            .map(|d| {
                let joined: TaskWithAssignee = from_document(d)?;
                Ok((joined.task, joined.assignee))
            })
            .collect()
    }

    async fn task(&self, id: i32) -> Result<Option<TaskRow>, GatewayError> {
        Ok(self.tasks().find_one(doc! { "id": id }).await?)
    }

    async fn insert_task(&self, task: NewTask) -> Result<TaskRow, GatewayError> {
        let now = Utc::now();
        let row = TaskRow {
            id: self.next_id(TASK_SEQUENCE).await?,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee_id,
            created_at: now,
            updated_at: now,
        };
        self.tasks().insert_one(&row).await?;
        debug!("Inserted task row {}", row.id);
        Ok(row)
    }

    async fn update_task(&self, id: i32, task: NewTask) -> Result<Option<TaskRow>, GatewayError> {
        let update = doc! {
            "$set": {
                "title": &task.title,
                "description": task.description,
                "status": task.status,
                "priority": task.priority,
                "assignee_id": task.assignee_id,
                "updated_at": to_bson(&Utc::now())?,
            }
        };
        let res = self.tasks().update_one(doc! { "id": id }, update).await?;
        if res.matched_count == 0 {
            return Ok(None);
        }
        self.task(id).await
    }
}
