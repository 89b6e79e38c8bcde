// src/error.rs

use actix_web::body::BoxBody;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Failure classes every action reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    AssigneeNotFound,
    NotFound,
    StoreUnavailable,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::ValidationError | ErrorKind::AssigneeNotFound => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),

    #[error("assignee {0} not found")]
    AssigneeNotFound(String),

    #[error("task {0} not found")]
    NotFound(String),

    #[error("{context}: {source}")]
    StoreUnavailable {
        context: &'static str,
        #[source]
        source: GatewayError,
    },
}

impl ActionError {
    pub fn store(context: &'static str) -> impl FnOnce(GatewayError) -> ActionError {
        move |source| ActionError::StoreUnavailable { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Validation(_) => ErrorKind::ValidationError,
            ActionError::AssigneeNotFound(_) => ErrorKind::AssigneeNotFound,
            ActionError::NotFound(_) => ErrorKind::NotFound,
            ActionError::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
        }
    }
}

/// Outcome of an action as it crosses the action boundary.
///
/// Serializes to `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "kind": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Ok { data: T },
    Err { kind: ErrorKind, message: String },
}

impl<T> ActionResult<T> {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ActionResult::Err {
            kind,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionResult::Ok { .. } => StatusCode::OK,
            ActionResult::Err { kind, .. } => kind.status_code(),
        }
    }

    pub fn into_result(self) -> Result<T, (ErrorKind, String)> {
        match self {
            ActionResult::Ok { data } => Ok(data),
            ActionResult::Err { kind, message } => Err((kind, message)),
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResult<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => ActionResult::Ok { data },
            Err(e) => ActionResult::Err {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Ok { data } => {
                let mut state = serializer.serialize_struct("ActionResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            ActionResult::Err { kind, message } => {
                let mut state = serializer.serialize_struct("ActionResult", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", message)?;
                state.serialize_field("kind", kind)?;
                state.end()
            }
        }
    }
}

impl<T: Serialize> Responder for ActionResult<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status_code()).json(&self)
    }
}

/// Malformed or mistyped JSON bodies answer with the failure envelope.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body: ActionResult<()> = ActionResult::failure(ErrorKind::ValidationError, err.to_string());
    let response = HttpResponse::BadRequest().json(body);
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_carries_data() {
        let result: ActionResult<Vec<u32>> = Ok(vec![1, 2]).into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "success": true, "data": [1, 2] })
        );
    }

    #[test]
    fn failure_envelope_carries_message_and_kind() {
        let result: ActionResult<()> = Err(ActionError::NotFound("9999".into())).into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "success": false, "error": "task 9999 not found", "kind": "NotFound" })
        );
    }

    #[test]
    fn store_failures_keep_the_underlying_message() {
        let err = ActionError::store("failed to fetch tasks")(GatewayError::Unavailable(
            "connection refused".into(),
        ));
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(err.to_string(), "failed to fetch tasks: connection refused");
    }

    #[test]
    fn results_report_their_status() {
        let ok: ActionResult<()> = ActionResult::Ok { data: () };
        assert_eq!(ok.status_code(), StatusCode::OK);
        let err: ActionResult<()> = ActionResult::failure(ErrorKind::NotFound, "missing");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_result(), Err((ErrorKind::NotFound, "missing".to_string())));
    }

    #[test]
    fn kinds_map_to_http_statuses() {
        assert_eq!(ErrorKind::ValidationError.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::AssigneeNotFound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::StoreUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
