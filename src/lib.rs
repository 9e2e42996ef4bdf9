//! taskboard：任务管理 REST 服务端和命令行客户端
//!
//! - `db`: SQLite 持久化（sqlx）
//! - `commands`: axum handler 和请求/响应类型
//! - `router`: 路由表
//! - `client`: HTTP 客户端和看板上下文

pub mod app_state;
pub mod client;
pub mod commands;
pub mod config;
pub mod db;
mod error;
pub mod router;
pub mod utils;

use std::future::Future;
use std::path::Path;

use tokio::net::TcpListener;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::{AppError, AppResult, FieldError, ResultExt};
pub use router::build_router;

/// 确保数据库所在目录存在，然后打开连接池并执行迁移
pub async fn open_database(db_path: &Path) -> AppResult<db::DbPool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(db::init_pool(db_path).await?)
}

/// 在已绑定的 listener 上运行服务，直到 `shutdown` 完成
pub async fn serve_on<F>(listener: TcpListener, pool: db::DbPool, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(pool));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// 按配置启动服务，Ctrl+C 时优雅退出
pub async fn serve(config: AppConfig) -> AppResult<()> {
    let pool = open_database(&config.database_path).await?;
    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address).await?;

    tracing::info!(
        address = %bind_address,
        database = %config.database_path.display(),
        "Taskboard server started"
    );
    serve_on(listener, pool, shutdown_signal()).await?;
    tracing::info!("Taskboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
