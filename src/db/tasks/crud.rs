//! Basic CRUD operations for tasks

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};

use super::{fold_case, TASK_SELECT};
use crate::db::{DbPool, NewTask, TaskChanges, TaskRecord, TaskStatus};

pub async fn insert_task(
    pool: &DbPool,
    params: NewTask<'_>,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    // 新建时 status 可能直接就是 completed，要同时满足完成不变量
    let is_completed = params.status == TaskStatus::Completed;
    let completed_at = is_completed.then_some(now);

    let result = sqlx::query(
        "INSERT INTO tasks (uuid, title, description, title_folded, description_folded, status, priority, \
         due_date, assigned_to, created_by, tags, is_completed, completed_at, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(params.uuid)
    .bind(params.title)
    .bind(params.description)
    .bind(fold_case(params.title))
    .bind(params.description.map(fold_case))
    .bind(params.status)
    .bind(params.priority)
    .bind(params.due_date)
    .bind(params.assigned_to)
    .bind(params.created_by)
    .bind(Json(params.tags))
    .bind(is_completed)
    .bind(completed_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let task_id = result.last_insert_rowid();
    tracing::debug!(
        task_id,
        uuid = %params.uuid,
        title = %params.title,
        status = ?params.status,
        priority = ?params.priority,
        created_by = params.created_by,
        assigned_to = ?params.assigned_to,
        "Task created"
    );
    Ok(task_id)
}

pub async fn get_task_by_id(pool: &DbPool, task_id: i64) -> Result<TaskRecord, sqlx::Error> {
    let sql = format!("{} WHERE t.task_id = ?", TASK_SELECT);
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(task_id)
        .fetch_one(pool)
        .await
}

pub async fn get_task_by_uuid(pool: &DbPool, uuid: &str) -> Result<Option<TaskRecord>, sqlx::Error> {
    let sql = format!("{} WHERE t.uuid = ?", TASK_SELECT);
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

/// 部分更新：只写 `changes` 里出现的字段，`updated_at` 总是刷新
pub async fn update_task(
    pool: &DbPool,
    task_id: i64,
    changes: &TaskChanges,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET updated_at = ");
    builder.push_bind(now);

    if let Some(title) = &changes.title {
        builder
            .push(", title = ")
            .push_bind(title.clone())
            .push(", title_folded = ")
            .push_bind(fold_case(title));
    }
    if let Some(description) = &changes.description {
        builder
            .push(", description = ")
            .push_bind(description.clone())
            .push(", description_folded = ")
            .push_bind(description.as_deref().map(fold_case));
    }
    if let Some(priority) = changes.priority {
        builder.push(", priority = ").push_bind(priority);
    }
    if let Some(due_date) = changes.due_date {
        builder.push(", due_date = ").push_bind(due_date);
    }
    if let Some(assigned_to) = changes.assigned_to {
        builder.push(", assigned_to = ").push_bind(assigned_to);
    }
    if let Some(tags) = &changes.tags {
        builder.push(", tags = ").push_bind(Json(tags.clone()));
    }
    match changes.status {
        Some(TaskStatus::Completed) => {
            // 已完成的任务保留原来的 completed_at
            builder
                .push(", status = 'completed', is_completed = 1, completed_at = COALESCE(completed_at, ")
                .push_bind(now)
                .push(")");
        }
        Some(status) => {
            builder
                .push(", status = ")
                .push_bind(status)
                .push(", is_completed = 0, completed_at = NULL");
        }
        None => {}
    }

    builder.push(" WHERE task_id = ").push_bind(task_id);
    builder.build().execute(pool).await?;

    tracing::debug!(task_id, changes = ?changes, "Task updated");
    Ok(())
}

/// 物理删除，返回是否真的删掉了一行
pub async fn delete_task(pool: &DbPool, task_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE task_id = ?")
        .bind(task_id)
        .execute(pool)
        .await?;
    tracing::debug!(task_id, "Task deleted");
    Ok(result.rows_affected() > 0)
}
