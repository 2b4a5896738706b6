//! Request execution strategies.

mod direct;
mod retry;

pub use direct::DirectExecutor;
pub use retry::SimpleRetry;
