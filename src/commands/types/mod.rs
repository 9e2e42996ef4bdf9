//! 命令类型模块
//!
//! 拆分为两个子模块：
//! - `task`: 任务相关类型
//! - `common`: 通用类型（响应信封、用户引用）
//!
//! 服务端和 `client` 共用这些类型。

mod common;
mod task;

// 导出任务相关类型
pub use task::{
    CreateTaskRequest, ListTasksQuery, Pagination, TaskData, TaskDraft, TaskListData,
    TaskListParams, TaskStatsData, TaskView, UpdateTaskRequest,
};

// 导出通用类型
pub use common::{ApiResponse, MeData, UserRef};
