//! Todoist REST client library
//!
//! Covers the one endpoint the task bridge needs: `POST /tasks`.
//!
//! # Quick Start
//!
//! For convenient imports, use the prelude:
//!
//! ```
//! use todoist_api_rs::prelude::*;
//! ```
//!
//! This re-exports [`TodoistClient`](client::TodoistClient), the error types,
//! and the task models.

pub mod client;
pub mod error;
pub mod models;
pub mod prelude;
