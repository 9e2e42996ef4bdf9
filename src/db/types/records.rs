//! 数据库记录类型定义（FromRow）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::enums::*;

/// 用户记录
#[derive(Debug, Clone, FromRow, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// 任务记录
///
/// 查询时 JOIN 了 users 表，所以 owner / assignee 的 username 和 email 一并带出。
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct TaskRecord {
    pub task_id: i64,
    pub uuid: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<i64>,
    pub created_by: i64,
    pub tags: Json<Vec<String>>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_username: String,
    pub creator_email: String,
    pub assignee_username: Option<String>,
    pub assignee_email: Option<String>,
}

impl TaskRecord {
    /// 是否逾期：有截止时间、未完成、且当前时间已过截止时间
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) if !self.is_completed => now > due,
            _ => false,
        }
    }

    pub fn ownership(&self) -> TaskOwnership {
        TaskOwnership {
            created_by: self.created_by,
            assigned_to: self.assigned_to,
        }
    }
}

/// 访问控制只关心的两个身份字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOwnership {
    pub created_by: i64,
    pub assigned_to: Option<i64>,
}

/// 按状态统计的任务数量
#[derive(Debug, Clone, Copy, Default, FromRow, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub overdue: i64,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(due_date: Option<DateTime<Utc>>, is_completed: bool) -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            task_id: 1,
            uuid: "t-1".into(),
            title: "demo".into(),
            description: None,
            status: if is_completed {
                TaskStatus::Completed
            } else {
                TaskStatus::Pending
            },
            priority: TaskPriority::Medium,
            due_date,
            assigned_to: None,
            created_by: 1,
            tags: Json(vec![]),
            is_completed,
            completed_at: is_completed.then_some(now),
            created_at: now,
            updated_at: now,
            creator_username: "alice".into(),
            creator_email: "alice@example.com".into(),
            assignee_username: None,
            assignee_email: None,
        }
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_task() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        assert!(record(Some(yesterday), false).is_overdue_at(now));
        assert!(!record(Some(tomorrow), false).is_overdue_at(now));
        assert!(!record(Some(yesterday), true).is_overdue_at(now));
        assert!(!record(None, false).is_overdue_at(now));
    }
}
