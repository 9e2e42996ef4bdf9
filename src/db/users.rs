//! User directory and API token storage

use chrono::{DateTime, Utc};

use super::{DbPool, NewUser, UserRecord};

const USER_FIELDS: &str = "user_id, username, email, created_at";

pub async fn insert_user(
    pool: &DbPool,
    params: NewUser<'_>,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)")
        .bind(params.username)
        .bind(params.email)
        .bind(now)
        .execute(pool)
        .await?;

    let user_id = result.last_insert_rowid();
    tracing::debug!(user_id, username = %params.username, "User created");
    Ok(user_id)
}

pub async fn get_user_by_id(pool: &DbPool, user_id: i64) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE user_id = ?", USER_FIELDS);
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_username(
    pool: &DbPool,
    username: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_FIELDS);
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE email = ?", USER_FIELDS);
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn user_exists(pool: &DbPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT user_id FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// 只存 token 的哈希
pub async fn insert_api_token(
    pool: &DbPool,
    token_hash: &str,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO api_tokens (token_hash, user_id, created_at) VALUES (?, ?, ?)")
        .bind(token_hash)
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;
    tracing::debug!(user_id, "API token issued");
    Ok(())
}

pub async fn find_user_by_token_hash(
    pool: &DbPool,
    token_hash: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT u.user_id, u.username, u.email, u.created_at \
         FROM api_tokens k JOIN users u ON u.user_id = k.user_id \
         WHERE k.token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}
