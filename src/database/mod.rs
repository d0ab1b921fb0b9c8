pub mod connection;
pub mod storage;

pub use connection::{SharedStorage, create_storage};
pub use storage::*;
