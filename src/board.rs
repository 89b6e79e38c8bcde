// src/board.rs

use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::ActionResult;
use crate::models::{Column, Status, Task};

/// Bucket tasks by the column whose status they carry.
///
/// Every column gets an entry, empty if nothing matches. Tasks whose status
/// has no column are left out of every bucket. Input order is kept inside a
/// bucket.
pub fn group_by_status(tasks: &[Task], columns: &[Column]) -> HashMap<String, Vec<Task>> {
    let mut buckets: HashMap<String, Vec<Task>> =
        columns.iter().map(|c| (c.id.clone(), Vec::new())).collect();
    let column_for: HashMap<Status, &str> =
        columns.iter().map(|c| (c.status, c.id.as_str())).collect();

    for task in tasks {
        if let Some(bucket) = column_for.get(&task.status).and_then(|id| buckets.get_mut(*id)) {
            bucket.push(task.clone());
        }
    }
    buckets
}

/// One column of the rendered board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// The board as the front end draws it: columns in store order, each with
/// its tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
}

impl BoardView {
    pub fn build(tasks: &[Task], columns: &[Column]) -> Self {
        let mut buckets = group_by_status(tasks, columns);
        let columns = columns
            .iter()
            .map(|column| {
                let tasks = buckets.remove(&column.id).unwrap_or_default();
                BoardColumn {
                    id: column.id.clone(),
                    title: column.title.clone(),
                    status: column.status,
                    count: tasks.len(),
                    tasks,
                }
            })
            .collect();
        BoardView { columns }
    }
}

/// GET /api/board
/// Columns and tasks fetched together, grouped for display.
pub async fn get_board(data: web::Data<AppState>) -> impl Responder {
    let (columns, tasks) = futures::join!(data.actions.list_columns(), data.actions.list_tasks());
    let board = match (columns.into_result(), tasks.into_result()) {
        (Ok(columns), Ok(tasks)) => BoardView::build(&tasks, &columns),
        (Err((kind, message)), _) | (_, Err((kind, message))) => {
            error!("Error building board: {}", message);
            let failure: ActionResult<BoardView> = ActionResult::failure(kind, message);
            return HttpResponse::build(failure.status_code()).json(failure);
        }
    };
    HttpResponse::Ok().json(ActionResult::Ok { data: board })
}

/// GET /api/columns
pub async fn list_columns(data: web::Data<AppState>) -> impl Responder {
    data.actions.list_columns().await
}
