mod auth;
mod tasks;
mod types;

pub use auth::*;
pub use tasks::*;
pub use types::*;
