//! HTTP bridge that turns a `{ project, subtasks }` payload into a Todoist
//! parent task with ordered subtasks.
//!
//! # Quick Start
//!
//! ```no_run
//! use todoist_bridge_rs::config::BridgeConfig;
//! use todoist_bridge_rs::handler::Bridge;
//! use todoist_bridge_rs::request::InboundRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::new("shared-secret")?.with_todoist_token("api-token");
//! let bridge = Bridge::new(config)?;
//!
//! let request = InboundRequest::post_json(serde_json::json!({
//!     "project": { "title": "Launch" },
//!     "subtasks": [{ "content": "Write notes" }]
//! }))
//! .with_header("x-task-push-secret", "shared-secret");
//!
//! let outcome = bridge.handle(request).await?;
//! println!("{}", outcome.body());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod payload;
pub mod request;
pub mod server;
