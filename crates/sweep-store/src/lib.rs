pub mod config;
pub mod slot;
pub mod storage;

pub use config::*;
pub use slot::*;
pub use storage::*;
