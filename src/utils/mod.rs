pub mod logging;
pub mod math;
pub mod time;

pub use math::*;
