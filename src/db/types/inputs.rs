//! 数据库输入类型定义（用于插入/更新/查询）

use chrono::{DateTime, Utc};

use super::enums::*;

/// 新建用户输入
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

/// 新建任务输入
pub struct NewTask<'a> {
    pub uuid: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<i64>,
    pub created_by: i64,
    pub tags: &'a [String],
}

/// 部分更新
///
/// 外层 `None` 表示不修改；对可空字段，`Some(None)` 表示清空。
/// `created_by` 不在这里，一旦写入就不能再改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assigned_to: Option<Option<i64>>,
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        *self == TaskChanges::default()
    }
}

/// 列表查询条件，总是限定在某个 owner 之下
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListFilter {
    pub created_by: i64,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<i64>,
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl TaskListFilter {
    pub fn for_owner(created_by: i64) -> Self {
        Self {
            created_by,
            status: None,
            priority: None,
            assigned_to: None,
            search: None,
            offset: 0,
            limit: i64::MAX,
        }
    }
}
