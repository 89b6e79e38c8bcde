// src/team.rs

use actix_web::{web, Responder};

use crate::app_state::AppState;

/// GET /api/team-members
/// Everyone a task can be assigned to.
pub async fn list_team_members(data: web::Data<AppState>) -> impl Responder {
    data.actions.list_team_members().await
}
