#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use taskboard_lib::client::{ApiClient, RecordingNotifier, Session, SessionStore, TaskBoard};
use taskboard_lib::commands::{issue_api_token, CreateTaskRequest, TaskView};
use taskboard_lib::db::DbPool;
use taskboard_lib::{open_database, serve_on};

/// 跑在临时数据库和随机端口上的服务端
pub struct TestServer {
    pub base_url: String,
    pub pool: DbPool,
    pub dir: TempDir,
}

pub async fn spawn_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_database(&dir.path().join("taskboard.sqlite3")).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_on(listener, pool.clone(), std::future::pending()));

    TestServer {
        base_url: format!("http://{addr}"),
        pool,
        dir,
    }
}

/// 一个已签发 token 的用户
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestServer {
    pub async fn user(&self, name: &str) -> TestUser {
        let (user, token) = issue_api_token(&self.pool, name, &format!("{name}@example.com"))
            .await
            .unwrap();
        TestUser {
            id: user.user_id,
            token,
        }
    }

    pub fn client(&self, user: &TestUser) -> ApiClient {
        ApiClient::new(&self.base_url).with_token(&user.token)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 已登录的看板，会话文件放在临时目录里
    pub fn board(&self, user: &TestUser, notifier: Arc<RecordingNotifier>) -> TaskBoard {
        let store = SessionStore::new(self.dir.path().join(format!("session-{}.json", user.id)));
        store
            .save(&Session {
                base_url: self.base_url.clone(),
                token: user.token.clone(),
            })
            .unwrap();
        TaskBoard::open(store, notifier).unwrap()
    }
}

pub async fn create(client: &ApiClient, title: &str) -> TaskView {
    client.create_task(&CreateTaskRequest::new(title)).await.unwrap()
}
