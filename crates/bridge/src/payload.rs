//! Translation from the caller's task tree into Todoist create payloads.

use serde_json::{Map, Value};
use todoist_api_rs::models::NewTask;

use crate::request::{is_truthy, TaskTree};

/// The outbound payloads for one request, in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPlan {
    pub parent: NewTask,
    /// Children without `parent_id`; it is filled in once the parent exists.
    pub children: Vec<NewTask>,
}

impl TaskPlan {
    /// Builds the parent and child payloads. All of them share the resolved
    /// project id.
    pub fn build(tree: &TaskTree, default_project_id: Option<&str>) -> Self {
        let project_id = resolve_project_id(tree.project.get("todoist_project_id"), default_project_id);

        let parent = task_payload(&tree.project, "title", project_id.as_deref());
        let children = tree
            .subtasks
            .iter()
            .map(|subtask| task_payload(subtask, "content", project_id.as_deref()))
            .collect();

        Self { parent, children }
    }
}

/// Resolves the target project id.
///
/// Numbers become their decimal string and strings are accepted when they
/// are all digits after trimming. Anything else (a project name, say) is
/// ignored in favor of `default_project_id`. `None` means "leave it to
/// Todoist", which files the task in the Inbox.
pub fn resolve_project_id(raw: Option<&Value>, default_project_id: Option<&str>) -> Option<String> {
    let explicit = match raw {
        Some(Value::Number(n)) => Some(number_to_id(n)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()))
                .then(|| trimmed.to_string())
        }
        _ => None,
    };

    explicit.or_else(|| {
        default_project_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    })
}

fn number_to_id(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    // Integral floats (e.g. `123.0`) print without the fraction.
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Builds one payload, copying only the optional fields the source has.
///
/// `description`, `labels` and `priority` are copied when present and not
/// null; `due` and `due_string` only when truthy.
fn task_payload(source: &Map<String, Value>, content_key: &str, project_id: Option<&str>) -> NewTask {
    NewTask {
        content: present(source, content_key),
        project_id: project_id.map(str::to_string),
        parent_id: None,
        description: present(source, "description"),
        due: truthy(source, "due"),
        due_string: truthy(source, "due_string"),
        labels: present(source, "labels"),
        priority: present(source, "priority"),
    }
}

fn present(source: &Map<String, Value>, key: &str) -> Option<Value> {
    source.get(key).filter(|v| !v.is_null()).cloned()
}

fn truthy(source: &Map<String, Value>, key: &str) -> Option<Value> {
    source.get(key).filter(|v| is_truthy(v)).cloned()
}
