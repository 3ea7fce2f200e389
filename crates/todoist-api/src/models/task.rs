//! Task models for `POST /tasks`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for creating a task.
///
/// Every field other than `content` is optional and left out of the JSON
/// entirely when unset, so Todoist applies its own defaults instead of
/// receiving explicit `null`s. Pass-through fields (`due`, `labels`, ...) are
/// kept as raw JSON and forwarded exactly as the caller supplied them.
///
/// # Example
///
/// ```
/// use todoist_api_rs::models::NewTask;
///
/// let task = NewTask::new("Write report").with_project_id("2203306141");
/// let json = serde_json::to_value(&task).unwrap();
/// assert_eq!(json["content"], "Write report");
/// assert_eq!(json["project_id"], "2203306141");
/// assert!(json.get("parent_id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTask {
    /// Task text. Absent only when the caller sent a subtask without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    /// Target project. When absent Todoist files the task in the Inbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Parent task id, set for subtasks once the parent exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Structured due object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Value>,

    /// Natural language due date (e.g. "tomorrow at 3pm").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,

    /// Priority from 1 (normal) to 4 (urgent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
}

impl NewTask {
    /// Creates a payload with the given content and nothing else.
    pub fn new(content: impl Into<Value>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Sets the target project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the parent task id.
    pub fn with_parent_id(mut self, parent_id: impl Into<Value>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// A task as returned by Todoist after creation.
///
/// The record is opaque: it is stored and re-serialized verbatim, and only
/// `id` is ever read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedTask(Map<String, Value>);

impl CreatedTask {
    /// Returns the task id, if the record has one.
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|id| !id.is_null())
    }

    /// Returns the raw JSON fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the raw JSON fields.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CreatedTask {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
