use std::{path::Path, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use super::{DbPool, MIGRATOR};

pub async fn init_pool(db_path: impl AsRef<Path>) -> Result<DbPool, sqlx::Error> {
    // 任何一种实现了 AsRef<Path> 接口的数据类型
    let db_url = format!("sqlite://{}", db_path.as_ref().to_string_lossy());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // 检查 _sqlx_migrations 表，依次执行还没跑过的 SQL 脚本
    MIGRATOR.run(&pool).await?;

    tracing::debug!(path = %db_path.as_ref().display(), "Database pool ready");
    Ok(pool)
}
