mod pool;
mod tasks;
mod types;
mod users;


pub use pool::*;
pub use tasks::*;
pub use types::*;
pub use users::*;
