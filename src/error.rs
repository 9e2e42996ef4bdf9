//! 统一错误类型定义
//!
//! 使用 `thiserror` 简化错误类型定义，
//! 提供 `AppError` 枚举和 `AppResult` 类型别名。
//! `AppError` 实现了 axum 的 `IntoResponse`，直接渲染成 `{ success, message, errors }` 信封。

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commands::ApiResponse;

/// 字段级验证错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 应用级统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 文件操作错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 验证错误（一个或多个字段不合法）
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// 资源未找到
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// 无权访问
    #[error("access denied")]
    Forbidden,

    /// 未认证或 token 无效
    #[error("not authorized, {0}")]
    Unauthorized(&'static str),

    /// 配置错误
    #[error("configuration error: {0}")]
    Config(String),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// 单字段验证错误的快捷构造
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn task_not_found() -> Self {
        AppError::NotFound { entity: "Task" }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Io(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// ========== From 实现：请求体解析失败 ==========

// 请求体不是合法 JSON（或字段类型不对）时，统一归为 body 字段的验证错误
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("body", rejection.body_text())
    }
}

// 查询串无法解析（例如重复的 status 参数）时归为 query 字段
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid("query", rejection.body_text())
    }
}

// ========== IntoResponse 实现：axum 需要把错误渲染成 HTTP 响应 ==========

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body: ApiResponse<()> = match self {
            AppError::Validation(errors) => ApiResponse::invalid(errors),
            AppError::NotFound { entity } => ApiResponse::failure(format!("{entity} not found")),
            AppError::Forbidden => ApiResponse::failure("Access denied"),
            AppError::Unauthorized(reason) => {
                ApiResponse::failure(format!("Not authorized, {reason}"))
            }
            // 内部错误只记日志，不把细节泄露给客户端
            internal => {
                tracing::error!(error = %internal, "Request failed");
                ApiResponse::failure("Server error")
            }
        };
        (status, Json(body)).into_response()
    }
}

/// 应用级 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

// ========== 扩展 trait：为 Result 添加上下文方法 ==========

/// 为 Result 类型添加错误上下文转换方法
pub trait ResultExt<T> {
    /// 将错误转换为配置错误
    fn config_err(self, msg: &str) -> AppResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn config_err(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Config(format!("{}: {}", msg, e)))
    }
}
