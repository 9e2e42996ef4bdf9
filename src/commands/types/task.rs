//! 任务相关命令类型
//!
//! 请求体里的枚举和日期先按字符串接收，再由 `validate` 统一检查，
//! 这样非法值会变成字段级错误，而不是整个请求体解析失败。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::UserRef;
use crate::db::{TaskChanges, TaskPriority, TaskRecord, TaskStatus, TaskStatusCounts};
use crate::error::{AppResult, FieldError};
use crate::utils::validation::{
    normalize_tags, parse_due_date, parse_priority, parse_status, positive_or_default,
    validate_description, validate_limit, validate_title, FieldErrors, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};

/// 可空字段的三态：缺失 → `None`，`null` → `Some(None)`，有值 → `Some(Some(v))`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 返回给客户端的任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<UserRef>,
    pub created_by: UserRef,
    pub tags: Vec<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn from_record(record: TaskRecord, now: DateTime<Utc>) -> Self {
        let is_overdue = record.is_overdue_at(now);
        let assigned_to = match (record.assigned_to, record.assignee_username, record.assignee_email) {
            (Some(id), Some(username), Some(email)) => Some(UserRef { id, username, email }),
            _ => None,
        };
        Self {
            id: record.uuid,
            title: record.title,
            description: record.description,
            status: record.status,
            priority: record.priority,
            due_date: record.due_date,
            assigned_to,
            created_by: UserRef {
                id: record.created_by,
                username: record.creator_username,
                email: record.creator_email,
            },
            tags: record.tags.0,
            is_completed: record.is_completed,
            completed_at: record.completed_at,
            is_overdue,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 单个任务的 data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub task: TaskView,
}

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// 任务列表的 data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListData {
    pub tasks: Vec<TaskView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// 统计的 data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatsData {
    pub stats: TaskStatusCounts,
}

/// 创建任务请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// 通过验证的新任务
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<i64>,
    pub tags: Vec<String>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> AppResult<TaskDraft> {
        let mut errors = FieldErrors::new();

        // 出错的字段先用默认值占位；只要有错误，finish 就不会返回草稿
        let title = errors
            .check(validate_title(self.title.as_deref().unwrap_or_default()))
            .unwrap_or_default();
        let description = match self.description.as_deref() {
            Some(raw) => errors.check(validate_description(raw)).flatten(),
            None => None,
        };
        let status = match self.status.as_deref() {
            Some(raw) => errors.check(parse_status(raw)).unwrap_or_default(),
            None => TaskStatus::default(),
        };
        let priority = match self.priority.as_deref() {
            Some(raw) => errors.check(parse_priority(raw)).unwrap_or_default(),
            None => TaskPriority::default(),
        };
        let due_date = match self.due_date.as_deref() {
            Some(raw) => errors.check(parse_due_date(raw)),
            None => None,
        };

        errors.finish(TaskDraft {
            title,
            description,
            status,
            priority,
            due_date,
            assigned_to: self.assigned_to,
            tags: normalize_tags(self.tags),
        })
    }
}

/// 更新任务请求（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    pub fn validate(self) -> AppResult<TaskChanges> {
        let mut errors = FieldErrors::new();
        let mut changes = TaskChanges::default();

        if let Some(raw) = self.title.as_deref() {
            changes.title = errors.check(validate_title(raw));
        }
        if let Some(raw) = self.description {
            changes.description = match raw {
                Some(text) => errors.check(validate_description(&text)),
                None => Some(None),
            };
        }
        if let Some(raw) = self.status.as_deref() {
            changes.status = errors.check(parse_status(raw));
        }
        if let Some(raw) = self.priority.as_deref() {
            changes.priority = errors.check(parse_priority(raw));
        }
        if let Some(raw) = self.due_date {
            changes.due_date = match raw {
                Some(text) => errors.check(parse_due_date(&text)).map(Some),
                None => Some(None),
            };
        }
        changes.assigned_to = self.assigned_to;
        changes.tags = self.tags.map(normalize_tags);

        errors.finish(changes)
    }
}

/// 列表查询参数；全部按字符串接收，空串视为未提供
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// 通过验证的列表参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListParams {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<i64>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListTasksQuery {
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn validate(&self) -> AppResult<TaskListParams> {
        let mut errors = FieldErrors::new();

        let status = non_empty(&self.status).and_then(|raw| errors.check(parse_status(raw)));
        let priority = non_empty(&self.priority).and_then(|raw| errors.check(parse_priority(raw)));
        let assigned_to = non_empty(&self.assigned_to).and_then(|raw| {
            errors.check(
                raw.parse::<i64>()
                    .map_err(|_| FieldError::new("assignedTo", "Invalid user id")),
            )
        });

        errors.finish(TaskListParams {
            status,
            priority,
            assigned_to,
            search: non_empty(&self.search).map(str::to_string),
            page: positive_or_default(self.page.as_deref(), DEFAULT_PAGE),
            limit: validate_limit(self.limit.as_deref(), DEFAULT_LIMIT, MAX_LIMIT),
        })
    }
}
