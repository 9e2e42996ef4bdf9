//! 运行配置
//!
//! 服务端从环境变量读取（启动时先尝试加载 `.env`），客户端只关心 `TASKBOARD_URL`。

use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{AppResult, ResultExt};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DATABASE_FILE: &str = "taskboard.sqlite3";

/// 服务端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    /// 读取 `TASKBOARD_HOST` / `TASKBOARD_PORT` / `TASKBOARD_DATABASE`
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 与 `from_env` 相同，但变量来源由调用方提供，方便测试
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = value("TASKBOARD_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match value("TASKBOARD_PORT") {
            Some(raw) => raw.trim().parse::<u16>().config_err("TASKBOARD_PORT")?,
            None => DEFAULT_PORT,
        };
        let database_path = value("TASKBOARD_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        Ok(Self {
            host,
            port,
            database_path,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "taskboard", "taskboard")
}

/// 平台数据目录下的 `taskboard.sqlite3`；拿不到数据目录时退回当前目录
pub fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

/// 客户端会话文件的默认位置
pub fn default_session_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("session.json"))
        .unwrap_or_else(|| PathBuf::from("taskboard-session.json"))
}

/// 客户端默认连接的服务端地址
pub fn default_base_url() -> String {
    env::var("TASKBOARD_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::AppError;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert!(config.database_path.ends_with("taskboard.sqlite3"));
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TASKBOARD_HOST", "0.0.0.0"),
            ("TASKBOARD_PORT", "8080"),
            ("TASKBOARD_DATABASE", "/tmp/board.db"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("/tmp/board.db"));
    }

    #[test]
    fn invalid_port_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("TASKBOARD_PORT", "http")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.starts_with("TASKBOARD_PORT")));
    }
}
