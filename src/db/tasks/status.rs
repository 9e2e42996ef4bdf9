//! Completion transition for tasks

use chrono::{DateTime, Utc};

use crate::db::DbPool;

/// status → completed, is_completed → 1, completed_at → now
pub async fn mark_task_completed(
    pool: &DbPool,
    task_id: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tasks SET status = 'completed', is_completed = 1, completed_at = ?, updated_at = ? \
         WHERE task_id = ?",
    )
    .bind(now)
    .bind(now)
    .bind(task_id)
    .execute(pool)
    .await?;
    tracing::debug!(task_id, "Task marked completed");
    Ok(())
}
