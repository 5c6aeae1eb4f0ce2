pub mod task;
pub mod board;
pub mod session;
pub mod config;

pub use task::*;
pub use board::*;
pub use session::*;
pub use config::*;
