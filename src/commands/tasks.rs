//! 任务资源 handler
//!
//! 每个 handler 的检查顺序固定：请求验证 → 任务是否存在 → 访问控制 → 写入。

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    db::{
        count_tasks, count_tasks_by_status, delete_task, get_task_by_id, get_task_by_uuid,
        insert_task, list_overdue_tasks, list_tasks, list_tasks_by_status, mark_task_completed,
        update_task, user_exists, DbPool, NewTask, TaskListFilter, TaskRecord,
    },
    utils::{
        access::{can_complete, can_mutate, can_view},
        validation::parse_status,
    },
    AppError, AppResult,
};

use super::{
    ApiResponse, CreateTaskRequest, CurrentUser, ListTasksQuery, Pagination, TaskData,
    TaskListData, TaskStatsData, TaskView, UpdateTaskRequest,
};

type TaskResponse = Json<ApiResponse<TaskData>>;

fn task_response(record: TaskRecord, message: Option<&str>) -> TaskResponse {
    let data = TaskData {
        task: TaskView::from_record(record, Utc::now()),
    };
    Json(match message {
        Some(message) => ApiResponse::ok_with_message(data, message),
        None => ApiResponse::ok(data),
    })
}

async fn find_task(pool: &DbPool, id: &str) -> AppResult<TaskRecord> {
    get_task_by_uuid(pool, id)
        .await?
        .ok_or_else(AppError::task_not_found)
}

async fn ensure_assignee_exists(pool: &DbPool, assigned_to: Option<i64>) -> AppResult<()> {
    match assigned_to {
        Some(user_id) if !user_exists(pool, user_id).await? => {
            Err(AppError::invalid("assignedTo", "Assigned user does not exist"))
        }
        _ => Ok(()),
    }
}

/// GET /api/tasks
pub async fn list_tasks_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<TaskListData>>> {
    let Query(query) = query?;
    let params = query.validate()?;
    let filter = TaskListFilter {
        status: params.status,
        priority: params.priority,
        assigned_to: params.assigned_to,
        search: params.search,
        // page 没有上限，超出范围时 offset 饱和，结果为空页
        offset: params.page.saturating_sub(1).saturating_mul(params.limit),
        limit: params.limit,
        ..TaskListFilter::for_owner(user.user_id)
    };

    let records = list_tasks(&state.db, &filter).await?;
    let total = count_tasks(&state.db, &filter).await?;
    let now = Utc::now();

    Ok(Json(ApiResponse::ok(TaskListData {
        tasks: records
            .into_iter()
            .map(|record| TaskView::from_record(record, now))
            .collect(),
        pagination: Some(Pagination::new(params.page, params.limit, total)),
    })))
}

/// GET /api/tasks/{id}
pub async fn get_task_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<TaskResponse> {
    let task = find_task(&state.db, &id).await?;
    if !can_view(user.user_id, task.ownership()) {
        return Err(AppError::Forbidden);
    }
    Ok(task_response(task, None))
}

/// POST /api/tasks
pub async fn create_task_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, TaskResponse)> {
    let Json(payload) = payload?;
    let draft = payload.validate()?;
    ensure_assignee_exists(&state.db, draft.assigned_to).await?;

    let uuid = Uuid::new_v4().to_string();
    let task_id = insert_task(
        &state.db,
        NewTask {
            uuid: &uuid,
            title: &draft.title,
            description: draft.description.as_deref(),
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            assigned_to: draft.assigned_to,
            created_by: user.user_id,
            tags: &draft.tags,
        },
        Utc::now(),
    )
    .await?;

    let task = get_task_by_id(&state.db, task_id).await?;
    Ok((
        StatusCode::CREATED,
        task_response(task, Some("Task created successfully")),
    ))
}

/// PUT /api/tasks/{id}
pub async fn update_task_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> AppResult<TaskResponse> {
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let task = find_task(&state.db, &id).await?;
    if !can_mutate(user.user_id, task.ownership()) {
        return Err(AppError::Forbidden);
    }
    if let Some(assigned_to) = changes.assigned_to {
        ensure_assignee_exists(&state.db, assigned_to).await?;
    }

    if !changes.is_empty() {
        update_task(&state.db, task.task_id, &changes, Utc::now()).await?;
    }

    let task = get_task_by_id(&state.db, task.task_id).await?;
    Ok(task_response(task, Some("Task updated successfully")))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let task = find_task(&state.db, &id).await?;
    if !can_mutate(user.user_id, task.ownership()) {
        return Err(AppError::Forbidden);
    }

    // 两次请求并发删除时，后到的那个按 404 处理
    if !delete_task(&state.db, task.task_id).await? {
        return Err(AppError::task_not_found());
    }
    Ok(Json(ApiResponse::done("Task deleted successfully")))
}

/// PATCH /api/tasks/{id}/complete
pub async fn complete_task_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<TaskResponse> {
    let task = find_task(&state.db, &id).await?;
    if !can_complete(user.user_id, task.ownership()) {
        return Err(AppError::Forbidden);
    }

    mark_task_completed(&state.db, task.task_id, Utc::now()).await?;
    let task = get_task_by_id(&state.db, task.task_id).await?;
    Ok(task_response(task, Some("Task marked as completed")))
}

/// GET /api/tasks/overdue
pub async fn list_overdue_tasks_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ApiResponse<TaskListData>>> {
    let now = Utc::now();
    let records = list_overdue_tasks(&state.db, user.user_id, now).await?;
    Ok(Json(ApiResponse::ok(TaskListData {
        tasks: records
            .into_iter()
            .map(|record| TaskView::from_record(record, now))
            .collect(),
        pagination: None,
    })))
}

/// GET /api/tasks/status/{status}
///
/// 某个状态下的全部任务，不分页
pub async fn list_tasks_by_status_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(status): Path<String>,
) -> AppResult<Json<ApiResponse<TaskListData>>> {
    let status = parse_status(&status).map_err(|err| AppError::Validation(vec![err]))?;
    let records = list_tasks_by_status(&state.db, user.user_id, status).await?;
    let now = Utc::now();
    Ok(Json(ApiResponse::ok(TaskListData {
        tasks: records
            .into_iter()
            .map(|record| TaskView::from_record(record, now))
            .collect(),
        pagination: None,
    })))
}

/// GET /api/tasks/stats
pub async fn task_stats_command(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ApiResponse<TaskStatsData>>> {
    let stats = count_tasks_by_status(&state.db, user.user_id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(TaskStatsData { stats })))
}
