// src/task.rs

use actix_web::{web, HttpResponse, Responder};
use log::{debug, warn};

use crate::app_state::AppState;
use crate::error::{ActionResult, ErrorKind};
use crate::models::{DebugTaskInput, TaskInput};

/// GET /api/tasks
pub async fn list_tasks(data: web::Data<AppState>) -> impl Responder {
    data.actions.list_tasks().await
}

/// POST /api/tasks
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<TaskInput>,
) -> impl Responder {
    debug!("Received create_task request: {:?}", payload);
    data.actions.create_task(payload.into_inner()).await
}

/// GET /api/tasks/{task_id}
pub async fn get_task(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let task_id = path.into_inner();
    data.actions.get_task_by_id(&task_id).await
}

/// PUT /api/tasks/{task_id}
/// Full-field update; every field in the payload replaces the stored one.
pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<TaskInput>,
) -> impl Responder {
    let task_id = path.into_inner();
    debug!("Received update_task request for {}: {:?}", task_id, payload);
    data.actions.update_task(&task_id, payload.into_inner()).await
}

/// POST /api/debug/task
/// Create a task from a partial payload. Only served with `DEBUG_ROUTES=true`.
pub async fn create_debug_task(
    data: web::Data<AppState>,
    payload: web::Json<DebugTaskInput>,
) -> HttpResponse {
    if !data.config.debug_routes {
        warn!("Debug route hit while DEBUG_ROUTES is off");
        let missing: ActionResult<()> = ActionResult::failure(ErrorKind::NotFound, "route not found");
        return HttpResponse::NotFound().json(missing);
    }
    let result = data.actions.create_debug_task(payload.into_inner()).await;
    HttpResponse::build(result.status_code()).json(result)
}
