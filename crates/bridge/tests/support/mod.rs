//! Shared fixtures for bridge integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use todoist_bridge_rs::config::BridgeConfig;
use todoist_bridge_rs::handler::Bridge;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SECRET: &str = "test-secret";
pub const TOKEN: &str = "test-token";

/// Fake `POST /tasks`: records every body it receives and answers with the
/// body plus a sequential `id`. Call number `fail_at` (zero-based) gets
/// `fail_status` instead.
pub struct TaskRecorder {
    calls: Arc<Mutex<Vec<Value>>>,
    fail_at: Option<(usize, u16, String)>,
}

impl Respond for TaskRecorder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut calls = self.calls.lock().unwrap();
        let n = calls.len();
        calls.push(body.clone());

        if let Some((at, status, detail)) = &self.fail_at {
            if *at == n {
                return ResponseTemplate::new(*status).set_body_string(detail.clone());
            }
        }

        let mut created = body.as_object().cloned().unwrap_or_default();
        created.insert("id".to_string(), json!(format!("task-{}", n + 1)));
        created.insert("is_completed".to_string(), json!(false));
        ResponseTemplate::new(200).set_body_json(Value::Object(created))
    }
}

/// Fake `POST /tasks` that records every body and answers call `n` with
/// `replies[n]` verbatim (status 200).
pub struct ScriptedReplies {
    calls: Arc<Mutex<Vec<Value>>>,
    replies: Vec<Value>,
}

impl Respond for ScriptedReplies {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut calls = self.calls.lock().unwrap();
        let n = calls.len();
        calls.push(body);

        let reply = self.replies.get(n).cloned().unwrap_or_else(|| json!({}));
        ResponseTemplate::new(200).set_body_json(reply)
    }
}

/// Mock Todoist plus the log of bodies it received.
pub struct FakeTodoist {
    pub server: MockServer,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl FakeTodoist {
    /// Every call succeeds.
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Call number `at` (zero-based, parent is 0) fails with `status`.
    pub async fn failing_at(at: usize, status: u16, detail: &str) -> Self {
        Self::start_with(Some((at, status, detail.to_string()))).await
    }

    /// Call `n` is answered with `replies[n]` exactly as given.
    pub async fn replying(replies: Vec<Value>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let responder = ScriptedReplies {
            calls: calls.clone(),
            replies,
        };
        Self::mount(calls, responder).await
    }

    async fn start_with(fail_at: Option<(usize, u16, String)>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let responder = TaskRecorder {
            calls: calls.clone(),
            fail_at,
        };
        Self::mount(calls, responder).await
    }

    async fn mount(calls: Arc<Mutex<Vec<Value>>>, responder: impl Respond + 'static) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(responder)
            .mount(&server)
            .await;

        Self { server, calls }
    }

    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig::new(SECRET)
            .unwrap()
            .with_todoist_token(TOKEN)
            .with_api_base_url(self.server.uri())
    }

    pub fn bridge(&self) -> Bridge {
        Bridge::new(self.config()).unwrap()
    }
}
