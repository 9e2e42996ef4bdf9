//! Task database operations
//!
//! Split into submodules:
//! - `crud`: Basic CRUD operations (insert, get, partial update, delete)
//! - `status`: Completion transition
//! - `query`: Filtered/paginated listing and aggregate queries

mod crud;
mod query;
mod status;

pub use crud::*;
pub use query::*;
pub use status::*;

/// Common SELECT with owner/assignee joined from the user directory
pub(crate) const TASK_SELECT: &str = "SELECT t.task_id, t.uuid, t.title, t.description, t.status, t.priority, t.due_date, \
    t.assigned_to, t.created_by, t.tags, t.is_completed, t.completed_at, t.created_at, t.updated_at, \
    c.username AS creator_username, c.email AS creator_email, \
    a.username AS assignee_username, a.email AS assignee_email \
    FROM tasks t \
    JOIN users c ON c.user_id = t.created_by \
    LEFT JOIN users a ON a.user_id = t.assigned_to";

/// search 比较用的小写形式（Unicode 规则）
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
