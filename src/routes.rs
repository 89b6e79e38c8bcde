// src/routes.rs

use actix_web::{web, HttpResponse};

use crate::board::{get_board, list_columns};
use crate::error::json_error;
use crate::task::{create_debug_task, create_task, get_task, list_tasks, update_task};
use crate::team::list_team_members;

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .route("/team-members", web::get().to(list_team_members))
                .route("/columns", web::get().to(list_columns))
                .route("/board", web::get().to(get_board))
                .service(
                    web::scope("/tasks")
                        .route("", web::get().to(list_tasks))
                        .route("", web::post().to(create_task))
                        .route("/{task_id}", web::get().to(get_task))
                        .route("/{task_id}", web::put().to(update_task)),
                )
                .route("/debug/task", web::post().to(create_debug_task)),
        );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::actions::TaskActions;
    use crate::app_state::AppState;
    use crate::config::{Config, StoreBackend};
        use crate::gateway::MemoryGateway;

    fn state(debug_routes: bool) -> AppState {
        AppState {
            actions: TaskActions::new(Arc::new(MemoryGateway::demo())),
            config: Config {
                store_backend: StoreBackend::Memory,
                mongo_uri: None,
                database_name: "kanban".to_string(),
                bind_address: "127.0.0.1:0".to_string(),
                frontend_origin: "http://localhost:3000".to_string(),
                debug_routes,
            },
        }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_is_plain_ok() {
        let app = app!(state(false));
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "ok");
    }

    #[actix_web::test]
    async fn lists_are_wrapped_in_success_envelope() {
        let app = app!(state(false));
        let req = test::TestRequest::get().uri("/api/team-members").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0], json!({
            "id": "user-1",
            "name": "Alex Johnson",
            "avatar": "https://ui.shadcn.com/avatars/01.png",
        }));

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(6));
    }

    #[actix_web::test]
    async fn create_task_resolves_assignee() {
        let app = app!(state(false));
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({
                "title": "Research competitors",
                "status": "todo",
                "priority": "high",
                "assigneeId": "user-1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "7");
        assert_eq!(body["data"]["assignee"]["name"], "Alex Johnson");
    }

    #[actix_web::test]
    async fn empty_title_is_a_failure_envelope() {
        let app = app!(state(false));
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({ "title": "", "status": "todo" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "ValidationError");
        assert!(body.get("data").is_none());
    }

    #[actix_web::test]
    async fn unknown_status_is_rejected_with_envelope() {
        let app = app!(state(false));
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({ "title": "t", "status": "blocked" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "ValidationError");
    }

    #[actix_web::test]
    async fn update_of_missing_task_is_not_found() {
        let app = app!(state(false));
        let req = test::TestRequest::put()
            .uri("/api/tasks/9999")
            .set_json(json!({ "title": "t", "status": "done" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "NotFound");
    }

    #[actix_web::test]
    async fn unassign_then_refetch_has_no_assignee() {
        let app = app!(state(false));
        let req = test::TestRequest::put()
            .uri("/api/tasks/2")
            .set_json(json!({
                "title": "Design homepage",
                "description": "Create wireframes for the new homepage",
                "status": "todo",
                "priority": "medium",
                "assigneeId": null,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get().uri("/api/tasks/2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].get("assignee").is_none());
    }

    #[actix_web::test]
    async fn board_groups_tasks_by_column() {
        let app = app!(state(false));
        let req = test::TestRequest::get().uri("/api/board").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let columns = body["data"]["columns"].as_array().cloned().unwrap_or_default();
        let summary: Vec<(String, u64)> = columns
            .iter()
            .map(|c| (c["id"].as_str().unwrap().to_string(), c["count"].as_u64().unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("todo".to_string(), 2),
                ("in-progress".to_string(), 2),
                ("done".to_string(), 2),
            ]
        );
    }

    #[actix_web::test]
    async fn debug_route_is_gated_by_config() {
        let app = app!(state(false));
        let req = test::TestRequest::post().uri("/api/debug/task").set_json(json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": false, "error": "route not found", "kind": "NotFound" }));

        let app = app!(state(true));
        let req = test::TestRequest::post()
            .uri("/api/debug/task")
            .set_json(json!({ "assigneeId": "user-4" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Debug Task");
        assert_eq!(body["data"]["assignee"]["name"], "Jordan Lee");
    }
}
