//! Request-terminating errors and their HTTP rendering.

use std::fmt;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Shape hint echoed back on a malformed payload.
pub const EXPECTED_SHAPE: &str =
    "{ project: { title, todoist_project_id? }, subtasks: [{ content, ... }] }";

/// Which creation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStage {
    Parent,
    /// Zero-based position of the subtask in the request.
    Subtask { index: usize },
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateStage::Parent => write!(f, "parent task"),
            CreateStage::Subtask { index } => write!(f, "subtask #{}", index),
        }
    }
}

/// Every way a bridge request can end early.
///
/// All variants are terminal. Everything up to `MissingConfiguration` is
/// detected before any call to Todoist.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("missing or mismatched shared secret")]
    Unauthorized,

    #[error("request body is not a JSON object")]
    InvalidBody,

    /// The reason is logged, not returned to the caller.
    #[error("bad payload: {0}")]
    BadPayload(String),

    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// Todoist rejected a create call; `detail` is its raw response body.
    #[error("{stage} creation failed with status {status}")]
    ExternalCallFailed {
        stage: CreateStage,
        status: u16,
        detail: String,
    },

    #[error("unhandled fault: {0}")]
    UnhandledFault(String),
}

impl BridgeError {
    /// HTTP status for this error. External failures pass Todoist's status
    /// through; one that is not a valid status code becomes 502.
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            BridgeError::Unauthorized => StatusCode::UNAUTHORIZED,
            BridgeError::InvalidBody | BridgeError::BadPayload(_) => StatusCode::BAD_REQUEST,
            BridgeError::MissingConfiguration(_) | BridgeError::UnhandledFault(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BridgeError::ExternalCallFailed { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    /// JSON envelope sent to the caller.
    pub fn body(&self) -> Value {
        match self {
            BridgeError::MethodNotAllowed(_) => json!({
                "error": "Method not allowed",
                "hint": "Use POST with JSON body",
            }),
            BridgeError::Unauthorized => json!({
                "error": "Unauthorized",
                "hint": "x-task-push-secret / Bearer mismatch",
            }),
            BridgeError::InvalidBody => json!({ "error": "Invalid JSON body" }),
            BridgeError::BadPayload(_) => json!({
                "error": "Bad payload",
                "expected": EXPECTED_SHAPE,
            }),
            BridgeError::MissingConfiguration(setting) => json!({
                "error": "Missing token",
                "hint": format!("Set {} to create tasks, or use dryRun=true", setting),
            }),
            BridgeError::ExternalCallFailed {
                stage: CreateStage::Parent,
                detail,
                ..
            } => json!({
                "error": "Parent task failed",
                "detail": detail,
            }),
            BridgeError::ExternalCallFailed {
                stage: CreateStage::Subtask { index },
                detail,
                ..
            } => json!({
                "error": "Subtask failed",
                "detail": detail,
                "index": index,
            }),
            BridgeError::UnhandledFault(message) => json!({
                "error": "Unhandled exception",
                "message": message,
            }),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(self.body());

        if matches!(self, BridgeError::MethodNotAllowed(_)) {
            return (status, [(header::ALLOW, "POST")], body).into_response();
        }
        (status, body).into_response()
    }
}
