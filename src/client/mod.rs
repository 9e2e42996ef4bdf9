//! 客户端层
//!
//! `ApiClient` 负责 HTTP 调用，`TaskBoard` 在它之上维护本地状态：
//! 每次写操作成功后重新拉取列表，失败时发出通知并保持状态不变。

mod api;
mod board;
mod error;
mod notification;
mod session;

pub use api::ApiClient;
pub use board::{AuthState, BoardFilters, BoardStats, TaskBoard};
pub use error::ClientError;
pub use notification::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{Session, SessionStore};
