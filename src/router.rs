//! 路由表
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | /api/tasks | `list_tasks_command` |
//! | POST | /api/tasks | `create_task_command` |
//! | GET | /api/tasks/overdue | `list_overdue_tasks_command` |
//! | GET | /api/tasks/stats | `task_stats_command` |
//! | GET | /api/tasks/status/{status} | `list_tasks_by_status_command` |
//! | GET | /api/tasks/{id} | `get_task_command` |
//! | PUT | /api/tasks/{id} | `update_task_command` |
//! | DELETE | /api/tasks/{id} | `delete_task_command` |
//! | PATCH | /api/tasks/{id}/complete | `complete_task_command` |
//! | GET | /api/auth/me | `me_command` |
//! | GET | /health | `health_command` |

use axum::routing::{get, patch};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::commands::{
    complete_task_command, create_task_command, delete_task_command, get_task_command,
    health_command, list_overdue_tasks_command, list_tasks_by_status_command, list_tasks_command,
    me_command, task_stats_command, update_task_command,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks_command).post(create_task_command))
        // 静态路径优先于 {id}
        .route("/api/tasks/overdue", get(list_overdue_tasks_command))
        .route("/api/tasks/stats", get(task_stats_command))
        .route("/api/tasks/status/{status}", get(list_tasks_by_status_command))
        .route(
            "/api/tasks/{id}",
            get(get_task_command)
                .put(update_task_command)
                .delete(delete_task_command),
        )
        .route("/api/tasks/{id}/complete", patch(complete_task_command))
        .route("/api/auth/me", get(me_command))
        .route("/health", get(health_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
