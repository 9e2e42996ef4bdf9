use thiserror::Error;

use crate::error::FieldError;

/// 客户端错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// 本地没有会话
    #[error("not signed in")]
    SignedOut,

    /// 服务端返回 401
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 服务端返回的业务错误（400 / 403 / 404 / 500）
    #[error("request failed with status {status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid payload: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ClientError {
    /// 需要清掉会话的错误
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::SignedOut | ClientError::Unauthorized(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 给用户看的一行描述；字段错误会拼在一起
    pub fn user_message(&self) -> Option<String> {
        match self {
            ClientError::Api { errors, .. } if !errors.is_empty() => Some(
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            ClientError::Api { message, .. } if !message.is_empty() => Some(message.clone()),
            ClientError::Unauthorized(message) => Some(message.clone()),
            _ => None,
        }
    }
}
