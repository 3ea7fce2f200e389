//! Task data types for the Todoist REST API.
//!
//! [`NewTask`] is the outbound create payload; [`CreatedTask`] is the record
//! the API hands back, kept as raw JSON.

mod task;

pub use task::*;
