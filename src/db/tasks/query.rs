//! Query operations for tasks

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use super::{fold_case, TASK_SELECT};
use crate::db::{DbPool, TaskListFilter, TaskRecord, TaskStatus, TaskStatusCounts};

/// 转义 LIKE 通配符，search 按字面子串匹配
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a TaskListFilter) {
    builder.push(" WHERE t.created_by = ").push_bind(filter.created_by);
    if let Some(status) = filter.status {
        builder.push(" AND t.status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND t.priority = ").push_bind(priority);
    }
    if let Some(assigned_to) = filter.assigned_to {
        builder.push(" AND t.assigned_to = ").push_bind(assigned_to);
    }
    if let Some(search) = filter.search.as_deref() {
        // SQLite 的 LIKE 只折叠 ASCII，这里比较预先折叠好的小写列
        let pattern = like_pattern(&fold_case(search));
        builder
            .push(" AND (t.title_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.description_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// 一页任务，最新创建的在前
pub async fn list_tasks(pool: &DbPool, filter: &TaskListFilter) -> Result<Vec<TaskRecord>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(TASK_SELECT);
    push_filter(&mut builder, filter);
    builder
        .push(" ORDER BY t.created_at DESC, t.task_id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    builder.build_query_as::<TaskRecord>().fetch_all(pool).await
}

/// 满足条件的总数（忽略分页）
pub async fn count_tasks(pool: &DbPool, filter: &TaskListFilter) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t");
    push_filter(&mut builder, filter);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn list_tasks_by_status(
    pool: &DbPool,
    created_by: i64,
    status: TaskStatus,
) -> Result<Vec<TaskRecord>, sqlx::Error> {
    let sql = format!(
        "{} WHERE t.created_by = ? AND t.status = ? ORDER BY t.created_at DESC, t.task_id DESC",
        TASK_SELECT
    );
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(created_by)
        .bind(status)
        .fetch_all(pool)
        .await
}

/// 已过截止时间且未完成，按截止时间升序
pub async fn list_overdue_tasks(
    pool: &DbPool,
    created_by: i64,
    now: DateTime<Utc>,
) -> Result<Vec<TaskRecord>, sqlx::Error> {
    let sql = format!(
        "{} WHERE t.created_by = ? AND t.is_completed = 0 AND t.due_date IS NOT NULL AND t.due_date < ? \
         ORDER BY t.due_date ASC, t.task_id ASC",
        TASK_SELECT
    );
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(created_by)
        .bind(now)
        .fetch_all(pool)
        .await
}

pub async fn count_tasks_by_status(
    pool: &DbPool,
    created_by: i64,
    now: DateTime<Utc>,
) -> Result<TaskStatusCounts, sqlx::Error> {
    sqlx::query_as::<_, TaskStatusCounts>(
        "SELECT COUNT(*) AS total, \
         COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending, \
         COALESCE(SUM(CASE WHEN status = 'in-progress' THEN 1 ELSE 0 END), 0) AS in_progress, \
         COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed, \
         COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled, \
         COALESCE(SUM(CASE WHEN is_completed = 0 AND due_date IS NOT NULL AND due_date < ? THEN 1 ELSE 0 END), 0) AS overdue \
         FROM tasks WHERE created_by = ?",
    )
    .bind(now)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("report"), "%report%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }
}
