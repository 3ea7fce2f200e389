//! Inbound request model: authentication, body parsing, shape validation and
//! dry-run detection.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-task-push-secret";

/// Header that enables dry-run mode when set to `"true"`.
pub const DRY_RUN_HEADER: &str = "x-dry-run";

/// Query parameter that enables dry-run mode when set to `"true"`.
pub const DRY_RUN_PARAM: &str = "dryRun";

/// A request body, either still raw or already decoded by the host.
#[derive(Debug, Clone)]
pub enum InboundBody {
    Raw(Bytes),
    Json(Value),
    /// The host could not buffer the body (too large, aborted stream). The
    /// reason is kept for logging only.
    Unreadable(String),
}

impl Default for InboundBody {
    fn default() -> Self {
        InboundBody::Raw(Bytes::new())
    }
}

/// Everything the bridge looks at in an HTTP request.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub body: InboundBody,
}

impl InboundRequest {
    /// A POST request with a JSON body and no headers.
    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: InboundBody::Json(body),
            ..Self::default()
        }
    }

    /// Adds a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::from_bytes(name.as_bytes()),
            header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the secret the caller presented, if any.
    ///
    /// `x-task-push-secret` wins; otherwise a `Bearer` token from
    /// `Authorization` is used. Empty values count as absent.
    pub fn presented_secret(&self) -> Option<&str> {
        let custom = header_str(&self.headers, SECRET_HEADER).filter(|s| !s.is_empty());

        custom.or_else(|| {
            header_str(&self.headers, header::AUTHORIZATION.as_str())
                .and_then(|v| v.strip_prefix("Bearer "))
                .filter(|s| !s.is_empty())
        })
    }

    /// Dry-run is on when `?dryRun=true` or `x-dry-run: true`.
    ///
    /// The query parameter must appear exactly once; a repeated `dryRun`
    /// key is a list of values and never equals `"true"`.
    pub fn is_dry_run(&self) -> bool {
        let from_query = self
            .query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .is_some_and(|pairs| {
                let mut values = pairs
                    .into_iter()
                    .filter(|(key, _)| key == DRY_RUN_PARAM)
                    .map(|(_, value)| value);
                matches!((values.next(), values.next()), (Some(value), None) if value == "true")
            });

        from_query || header_str(&self.headers, DRY_RUN_HEADER) == Some("true")
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Compares the presented secret with the expected one in constant time
/// with respect to the secret's contents.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Decodes the body into a JSON object.
///
/// An empty body reads as `{}`. A JSON string is decoded once more, since
/// some hosts hand over the raw text as a string value.
pub fn parse_body(body: InboundBody) -> Result<Map<String, Value>, BridgeError> {
    let value = match body {
        InboundBody::Unreadable(_) => return Err(BridgeError::InvalidBody),
        InboundBody::Raw(bytes) if bytes.is_empty() => return Ok(Map::new()),
        InboundBody::Raw(bytes) => {
            serde_json::from_slice(&bytes).map_err(|_| BridgeError::InvalidBody)?
        }
        InboundBody::Json(Value::Null) => return Ok(Map::new()),
        InboundBody::Json(Value::String(text)) if text.is_empty() => return Ok(Map::new()),
        InboundBody::Json(Value::String(text)) => {
            serde_json::from_str(&text).map_err(|_| BridgeError::InvalidBody)?
        }
        InboundBody::Json(value) => value,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(BridgeError::InvalidBody),
    }
}

/// A body that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTree {
    pub project: Map<String, Value>,
    pub subtasks: Vec<Map<String, Value>>,
}

impl TaskTree {
    /// Checks that `project.title` is truthy and `subtasks` is a list of
    /// objects.
    pub fn from_body(mut body: Map<String, Value>) -> Result<Self, BridgeError> {
        let project = match body.remove("project") {
            Some(Value::Object(project)) => project,
            _ => return Err(BridgeError::BadPayload("project is not an object".into())),
        };

        if !project.get("title").is_some_and(is_truthy) {
            return Err(BridgeError::BadPayload("project.title is missing".into()));
        }

        let entries = match body.remove("subtasks") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(BridgeError::BadPayload("subtasks is not a list".into())),
        };

        let subtasks = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(subtask) => Ok(subtask),
                _ => Err(BridgeError::BadPayload(format!(
                    "subtasks[{}] is not an object",
                    index
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { project, subtasks })
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
