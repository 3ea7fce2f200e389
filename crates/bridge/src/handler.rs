//! The bridge handler: one inbound request in, one parent task plus its
//! subtasks created in Todoist.
//!
//! Every step is a gate; the first that fails ends the request. Todoist is
//! only called after all local checks pass, and calls are made one at a time:
//! the parent first, then each subtask in request order. A failed call stops
//! the sequence and nothing already created is undone.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use todoist_api_rs::client::TodoistClient;
use todoist_api_rs::models::{CreatedTask, NewTask};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, CreateStage};
use crate::payload::TaskPlan;
use crate::request::{parse_body, secrets_match, InboundRequest, TaskTree};

/// Hint returned with dry-run responses.
pub const DRY_RUN_HINT: &str = "Remove ?dryRun=true to actually create tasks";

/// Successful end of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeOutcome {
    /// Validation passed; nothing was sent to Todoist.
    DryRun {
        parent_payload: NewTask,
        children_count: usize,
    },
    /// Parent and every subtask were created, subtasks in request order.
    Created {
        parent: CreatedTask,
        subtasks: Vec<CreatedTask>,
    },
}

impl BridgeOutcome {
    /// JSON body sent to the caller.
    pub fn body(&self) -> Value {
        match self {
            BridgeOutcome::DryRun {
                parent_payload,
                children_count,
            } => json!({
                "dryRun": true,
                "parentPayload": parent_payload,
                "childrenPayloadsCount": children_count,
                "hint": DRY_RUN_HINT,
            }),
            BridgeOutcome::Created { parent, subtasks } => json!({
                "parent": parent,
                "subtasks": subtasks,
            }),
        }
    }
}

impl IntoResponse for BridgeOutcome {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.body())).into_response()
    }
}

/// Request handler with its configuration and Todoist client.
#[derive(Debug, Clone)]
pub struct Bridge {
    config: Arc<BridgeConfig>,
    client: Option<TodoistClient>,
}

impl Bridge {
    /// Creates a handler. A Todoist client is built only when a token is
    /// configured; without one the bridge still serves dry-runs.
    pub fn new(config: BridgeConfig) -> todoist_api_rs::error::Result<Self> {
        let client = config
            .todoist_token()
            .map(|token| {
                TodoistClient::builder(token)
                    .base_url(config.api_base_url())
                    .request_timeout(config.request_timeout())
                    .build()
            })
            .transpose()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handles one request.
    pub async fn handle(&self, request: InboundRequest) -> Result<BridgeOutcome, BridgeError> {
        if request.method != Method::POST {
            warn!(method = %request.method, "rejecting non-POST request");
            return Err(BridgeError::MethodNotAllowed(request.method));
        }

        let authorized = request
            .presented_secret()
            .is_some_and(|secret| secrets_match(secret, self.config.shared_secret()));
        if !authorized {
            warn!("rejecting request with missing or mismatched secret");
            return Err(BridgeError::Unauthorized);
        }

        let dry_run = request.is_dry_run();
        let body = parse_body(request.body).inspect_err(|_| warn!("request body is not a JSON object"))?;
        let tree = TaskTree::from_body(body).inspect_err(|e| warn!(error = %e, "rejecting payload"))?;
        debug!(subtasks = tree.subtasks.len(), dry_run, "payload accepted");

        let client = match (&self.client, dry_run) {
            (_, true) => None,
            (Some(client), false) => Some(client),
            (None, false) => {
                warn!("no Todoist token configured");
                return Err(BridgeError::MissingConfiguration("TODOIST_TOKEN"));
            }
        };

        let plan = TaskPlan::build(&tree, self.config.default_project_id());
        debug!(project_id = ?plan.parent.project_id, "resolved project id");

        match client {
            None => {
                info!(children = plan.children.len(), "dry-run, nothing created");
                Ok(BridgeOutcome::DryRun {
                    children_count: plan.children.len(),
                    parent_payload: plan.parent,
                })
            }
            Some(client) => create_tree(client, plan).await,
        }
    }
}

/// Creates the parent, then each child in order, stopping at the first
/// failure.
async fn create_tree(client: &TodoistClient, plan: TaskPlan) -> Result<BridgeOutcome, BridgeError> {
    let parent = client
        .create_task(&plan.parent)
        .await
        .map_err(|e| classify(CreateStage::Parent, e))?;

    let parent_id = parent
        .id()
        .cloned()
        .ok_or_else(|| BridgeError::UnhandledFault("created parent task has no id".to_string()))?;
    info!(parent_id = %parent_id, "created parent task");

    let mut subtasks = Vec::with_capacity(plan.children.len());
    for (index, child) in plan.children.into_iter().enumerate() {
        let child = child.with_parent_id(parent_id.clone());
        let created = client
            .create_task(&child)
            .await
            .map_err(|e| classify(CreateStage::Subtask { index }, e))?;
        debug!(index, "created subtask");
        subtasks.push(created);
    }

    info!(parent_id = %parent_id, subtasks = subtasks.len(), "task tree created");
    Ok(BridgeOutcome::Created { parent, subtasks })
}

/// Todoist rejections keep their status and body; everything else is an
/// unhandled fault.
fn classify(stage: CreateStage, error: todoist_api_rs::error::Error) -> BridgeError {
    match error.as_rejection() {
        Some((status, body)) => {
            warn!(%stage, status, "Todoist rejected create call");
            BridgeError::ExternalCallFailed {
                stage,
                status,
                detail: body.to_string(),
            }
        }
        None => {
            warn!(%stage, error = %error, "create call failed");
            BridgeError::UnhandledFault(error.to_string())
        }
    }
}
