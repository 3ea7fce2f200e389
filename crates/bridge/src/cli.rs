//! CLI argument parsing using clap derive macros.
//!
//! Every setting can also come from an environment variable, which is how a
//! hosting platform normally injects them.

use std::path::PathBuf;

use clap::Parser;

/// task-bridge - push a project and its subtasks into Todoist over HTTP
#[derive(Parser, Debug, Default)]
#[command(name = "task-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output (debug-level logs unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(long, env = "TASK_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Shared secret callers must present
    #[arg(long, env = "TASK_PUSH_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Todoist API token
    #[arg(long, env = "TODOIST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Project id used when the request does not name a numeric one
    #[arg(long, env = "DEFAULT_TODOIST_PROJECT_ID")]
    pub default_project_id: Option<String>,

    /// Todoist REST API base URL
    #[arg(long, env = "TODOIST_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Address to listen on (e.g. 127.0.0.1:3000)
    #[arg(long, env = "TASK_BRIDGE_LISTEN")]
    pub listen: Option<String>,

    /// Timeout for each Todoist request, in seconds
    #[arg(long, env = "TASK_BRIDGE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}
