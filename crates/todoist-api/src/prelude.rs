//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```
//! use todoist_api_rs::prelude::*;
//!
//! // Now you have access to:
//! // - TodoistClient, TodoistClientBuilder (API client)
//! // - Error, ApiError, Result (error handling)
//! // - NewTask, CreatedTask (task models)
//! ```

// Client types
pub use crate::client::{TodoistClient, TodoistClientBuilder};

// Error types
pub use crate::error::{ApiError, Error, Result};

// Task models
pub use crate::models::{CreatedTask, NewTask};
