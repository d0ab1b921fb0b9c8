pub mod spin_engine;
pub mod spin_service;
pub mod wheel_service;

pub use spin_engine::*;
pub use spin_service::*;
pub use wheel_service::*;
