pub mod spin_result;
pub mod wedge;
pub mod wheel_option;

pub use spin_result::*;
pub use wedge::*;
pub use wheel_option::*;
