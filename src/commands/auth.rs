//! Bearer token 认证
//!
//! `CurrentUser` 是一个 axum extractor：从 `Authorization: Bearer <token>` 里取出 token，
//! 哈希后到 `api_tokens` 表里查找对应用户。任何需要登录的 handler 只要在参数里写
//! `CurrentUser(user)` 就能拿到已验证的身份。

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use crate::{
    app_state::AppState,
    db::{
        find_user_by_token_hash, get_user_by_email, get_user_by_id, get_user_by_username,
        insert_api_token, insert_user, DbPool, NewUser, UserRecord,
    },
    utils::crypto::{generate_token, hash_token},
    AppError, AppResult,
};

use super::{ApiResponse, MeData};

/// 当前已认证用户
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized("no token"))?;
        let user = find_user_by_token_hash(&state.db, &hash_token(token))
            .await?
            .ok_or(AppError::Unauthorized("token failed"))?;
        Ok(CurrentUser(user))
    }
}

/// GET /api/auth/me
pub async fn me_command(CurrentUser(user): CurrentUser) -> AppResult<Json<ApiResponse<MeData>>> {
    Ok(Json(ApiResponse::ok(MeData { user: user.into() })))
}

/// 用户不存在时先创建，然后签发一个新 token。返回的明文 token 只出现这一次。
///
/// 已有用户名时 email 必须一致；新用户名不能占用别人的 email。
pub async fn issue_api_token(
    pool: &DbPool,
    username: &str,
    email: &str,
) -> AppResult<(UserRecord, String)> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() {
        return Err(AppError::invalid("username", "Username is required"));
    }
    if email.is_empty() {
        return Err(AppError::invalid("email", "Email is required"));
    }

    let now = Utc::now();
    let user = match get_user_by_username(pool, username).await? {
        Some(user) if user.email != email => {
            return Err(AppError::invalid("email", "Email does not match this user"));
        }
        Some(user) => user,
        None => {
            if get_user_by_email(pool, email).await?.is_some() {
                return Err(AppError::invalid("email", "Email is already registered"));
            }
            let user_id = insert_user(pool, NewUser { username, email }, now).await?;
            get_user_by_id(pool, user_id)
                .await?
                .ok_or(AppError::NotFound { entity: "User" })?
        }
    };

    let token = generate_token();
    insert_api_token(pool, &hash_token(&token), user.user_id, now).await?;
    tracing::info!(user_id = user.user_id, username = %user.username, "Issued API token");
    Ok((user, token))
}

/// GET /health，不需要认证
pub async fn health_command() -> Json<ApiResponse<()>> {
    Json(ApiResponse::done("ok"))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}
