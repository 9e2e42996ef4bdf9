//! HTTP 调用封装
//!
//! 每个方法对应一个服务端路由。token 在发送前附加到 `Authorization` 头；
//! 没有 token 时直接返回 `ClientError::SignedOut`，不发请求。

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ClientError;
use crate::commands::{
    ApiResponse, CreateTaskRequest, ListTasksQuery, MeData, TaskData, TaskListData,
    TaskStatsData, TaskView, UpdateTaskRequest, UserRef,
};
use crate::db::{TaskStatus, TaskStatusCounts};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::SignedOut)?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// 发送请求并拆开响应信封
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(status = status.as_u16(), "API response");

        if status.is_success() {
            let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
            if envelope.success {
                return Ok(envelope);
            }
        }

        // 错误体不一定是信封（例如框架层面的拒绝），解析失败就用原文
        let (message, errors) = match serde_json::from_str::<ApiResponse<serde_json::Value>>(&text) {
            Ok(envelope) => (
                envelope.message.unwrap_or_default(),
                envelope.errors.unwrap_or_default(),
            ),
            Err(_) => (text, Vec::new()),
        };

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            errors,
        })
    }

    async fn send_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let envelope = self.send::<T>(request).await?;
        envelope.data.ok_or_else(|| ClientError::Api {
            status: StatusCode::OK.as_u16(),
            message: "response carried no data".to_string(),
            errors: Vec::new(),
        })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        self.send_data(request).await
    }

    pub async fn me(&self) -> Result<UserRef, ClientError> {
        let data: MeData = self.send_data(self.request(Method::GET, "/api/auth/me")?).await?;
        Ok(data.user)
    }

    pub async fn list_tasks(&self, query: &ListTasksQuery) -> Result<TaskListData, ClientError> {
        let request = self.request(Method::GET, "/api/tasks")?.query(query);
        self.send_data(request).await
    }

    pub async fn get_task(&self, id: &str) -> Result<TaskView, ClientError> {
        let path = format!("/api/tasks/{}", id);
        let data: TaskData = self.send_data(self.request(Method::GET, &path)?).await?;
        Ok(data.task)
    }

    pub async fn create_task(&self, payload: &CreateTaskRequest) -> Result<TaskView, ClientError> {
        let data: TaskData = self.send_json(Method::POST, "/api/tasks", payload).await?;
        Ok(data.task)
    }

    pub async fn update_task(
        &self,
        id: &str,
        payload: &UpdateTaskRequest,
    ) -> Result<TaskView, ClientError> {
        let path = format!("/api/tasks/{}", id);
        let data: TaskData = self.send_json(Method::PUT, &path, payload).await?;
        Ok(data.task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/api/tasks/{}", id);
        self.send::<serde_json::Value>(self.request(Method::DELETE, &path)?)
            .await?;
        Ok(())
    }

    pub async fn complete_task(&self, id: &str) -> Result<TaskView, ClientError> {
        let path = format!("/api/tasks/{}/complete", id);
        let data: TaskData = self.send_data(self.request(Method::PATCH, &path)?).await?;
        Ok(data.task)
    }

    pub async fn overdue_tasks(&self) -> Result<Vec<TaskView>, ClientError> {
        let data: TaskListData = self
            .send_data(self.request(Method::GET, "/api/tasks/overdue")?)
            .await?;
        Ok(data.tasks)
    }

    pub async fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<TaskView>, ClientError> {
        let path = format!("/api/tasks/status/{}", status.as_str());
        let data: TaskListData = self.send_data(self.request(Method::GET, &path)?).await?;
        Ok(data.tasks)
    }

    pub async fn stats(&self) -> Result<TaskStatusCounts, ClientError> {
        let data: TaskStatsData = self
            .send_data(self.request(Method::GET, "/api/tasks/stats")?)
            .await?;
        Ok(data.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requests_without_token_never_leave_the_process() {
        let client = ApiClient::new("http://127.0.0.1:1/");
        assert_eq!(client.base_url(), "http://127.0.0.1:1");
        let err = client.list_tasks(&ListTasksQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::SignedOut));
    }
}
