pub mod analysis;
pub mod pool;
pub mod protocol;
pub mod protocol_extensions;
pub mod risk_profile;

pub use analysis::*;
pub use pool::*;
pub use protocol::*;
pub use protocol_extensions::*;
pub use risk_profile::*;
