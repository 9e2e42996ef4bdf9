//! 任务看板上下文
//!
//! `TaskBoard` 持有会话、过滤条件、当前列表和认证状态。写操作成功后总是重新
//! 拉取列表，不做乐观更新；失败时发出错误通知，本地状态保持不变。遇到 401
//! 或本地没有 token 时清除会话，回到未登录状态。

use std::sync::Arc;

use super::{ApiClient, ClientError, Notifier, Session, SessionStore};
use crate::commands::{
    CreateTaskRequest, ListTasksQuery, Pagination, TaskView, UpdateTaskRequest, UserRef,
};
use crate::config::default_base_url;
use crate::db::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn(UserRef),
}

/// 列表过滤条件；`None` 表示使用服务端默认值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<i64>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl BoardFilters {
    pub fn to_query(&self) -> ListTasksQuery {
        ListTasksQuery {
            status: self.status.map(|s| s.as_str().to_string()),
            priority: self.priority.map(|p| p.as_str().to_string()),
            assigned_to: self.assigned_to.map(|id| id.to_string()),
            search: self.search.clone(),
            page: self.page.map(|p| p.to_string()),
            limit: self.limit.map(|l| l.to_string()),
        }
    }
}

/// 根据已加载的列表在本地算出的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl BoardStats {
    pub fn from_tasks(tasks: &[TaskView]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        Self {
            total: tasks.len(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }
}

pub struct TaskBoard {
    api: ApiClient,
    sessions: SessionStore,
    notifier: Arc<dyn Notifier>,
    filters: BoardFilters,
    tasks: Vec<TaskView>,
    pagination: Option<Pagination>,
    auth: AuthState,
}

impl TaskBoard {
    /// 从会话文件恢复；没有会话时使用默认服务端地址，处于未登录状态
    pub fn open(sessions: SessionStore, notifier: Arc<dyn Notifier>) -> Result<Self, ClientError> {
        let api = match sessions.load()? {
            Some(session) => ApiClient::new(session.base_url).with_token(session.token),
            None => ApiClient::new(default_base_url()),
        };
        Ok(Self {
            api,
            sessions,
            notifier,
            filters: BoardFilters::default(),
            tasks: Vec::new(),
            pagination: None,
            auth: AuthState::SignedOut,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn tasks(&self) -> &[TaskView] {
        &self.tasks
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn filters(&self) -> &BoardFilters {
        &self.filters
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats::from_tasks(&self.tasks)
    }

    /// 用 token 登录：先向服务端确认身份，成功后才写入会话文件
    pub async fn sign_in(&mut self, base_url: &str, token: &str) -> Result<UserRef, ClientError> {
        let api = ApiClient::new(base_url).with_token(token);
        match api.me().await {
            Ok(user) => {
                self.sessions.save(&Session {
                    base_url: api.base_url().to_string(),
                    token: token.to_string(),
                })?;
                self.api = api;
                self.auth = AuthState::SignedIn(user.clone());
                self.notifier.success("Logged in successfully!");
                Ok(user)
            }
            Err(err) => {
                self.notifier
                    .error(&err.user_message().unwrap_or_else(|| "Login failed".to_string()));
                Err(err)
            }
        }
    }

    /// 校验当前会话；任何失败都清除会话
    pub async fn check_auth(&mut self) -> &AuthState {
        if self.api.token().is_none() {
            self.auth = AuthState::SignedOut;
            return &self.auth;
        }
        match self.api.me().await {
            Ok(user) => self.auth = AuthState::SignedIn(user),
            Err(err) => {
                tracing::debug!(error = %err, "Session check failed");
                self.reset_session();
            }
        }
        &self.auth
    }

    pub fn sign_out(&mut self) -> Result<(), ClientError> {
        self.sessions.clear()?;
        self.api.clear_token();
        self.tasks.clear();
        self.pagination = None;
        self.auth = AuthState::SignedOut;
        self.notifier.success("Logged out successfully!");
        Ok(())
    }

    /// 按当前过滤条件重新拉取列表
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.api.list_tasks(&self.filters.to_query()).await {
            Ok(data) => {
                self.tasks = data.tasks;
                self.pagination = data.pagination;
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Failed to load tasks")),
        }
    }

    pub async fn set_filters(&mut self, filters: BoardFilters) -> Result<(), ClientError> {
        self.filters = filters;
        self.refresh().await
    }

    pub async fn set_page(&mut self, page: i64) -> Result<(), ClientError> {
        self.filters.page = Some(page);
        self.refresh().await
    }

    pub async fn create_task(&mut self, payload: &CreateTaskRequest) -> Result<TaskView, ClientError> {
        let result = self.api.create_task(payload).await;
        self.after_mutation(result, "Task created successfully!", "Failed to create task")
            .await
    }

    pub async fn update_task(
        &mut self,
        id: &str,
        payload: &UpdateTaskRequest,
    ) -> Result<TaskView, ClientError> {
        let result = self.api.update_task(id, payload).await;
        self.after_mutation(result, "Task updated successfully!", "Failed to update task")
            .await
    }

    pub async fn update_status(&mut self, id: &str, status: TaskStatus) -> Result<TaskView, ClientError> {
        let payload = UpdateTaskRequest {
            status: Some(status.as_str().to_string()),
            ..UpdateTaskRequest::default()
        };
        let result = self.api.update_task(id, &payload).await;
        self.after_mutation(result, "Task status updated!", "Failed to update task status")
            .await
    }

    pub async fn complete_task(&mut self, id: &str) -> Result<TaskView, ClientError> {
        let result = self.api.complete_task(id).await;
        self.after_mutation(result, "Task marked as completed!", "Failed to complete task")
            .await
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<(), ClientError> {
        let result = self.api.delete_task(id).await;
        self.after_mutation(result, "Task deleted successfully!", "Failed to delete task")
            .await
    }

    async fn after_mutation<T>(
        &mut self,
        result: Result<T, ClientError>,
        success: &str,
        failure: &str,
    ) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.notifier.success(success);
                // 写入已经成功，刷新失败只影响本地视图，已在 refresh 里通知过
                if let Err(err) = self.refresh().await {
                    tracing::debug!(error = %err, "Refresh after mutation failed");
                }
                Ok(value)
            }
            Err(err) => Err(self.fail(err, failure)),
        }
    }

    fn fail(&mut self, err: ClientError, fallback: &str) -> ClientError {
        if err.is_unauthorized() {
            self.reset_session();
        }
        let message = match err.user_message() {
            Some(detail) => format!("{fallback}: {detail}"),
            None => fallback.to_string(),
        };
        self.notifier.error(&message);
        err
    }

    fn reset_session(&mut self) {
        if let Err(err) = self.sessions.clear() {
            tracing::warn!(error = %err, "Failed to clear session");
        }
        self.api.clear_token();
        self.tasks.clear();
        self.pagination = None;
        self.auth = AuthState::SignedOut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_render_as_query() {
        let filters = BoardFilters {
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            search: Some("report".into()),
            page: Some(2),
            ..BoardFilters::default()
        };
        let query = filters.to_query();
        assert_eq!(query.status.as_deref(), Some("in-progress"));
        assert_eq!(query.priority.as_deref(), Some("high"));
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.limit, None);
        assert_eq!(query.assigned_to, None);
    }

    #[test]
    fn opening_without_session_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let board = TaskBoard::open(
            SessionStore::new(dir.path().join("session.json")),
            Arc::new(super::super::TracingNotifier),
        )
        .unwrap();
        assert_eq!(board.auth(), &AuthState::SignedOut);
        assert!(board.api().token().is_none());
        assert_eq!(board.stats(), BoardStats::default());
    }
}
