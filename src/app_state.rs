use crate::db::DbPool;

/// 所有 handler 共享的状态；`DbPool` 内部是 Arc，clone 很便宜
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}
