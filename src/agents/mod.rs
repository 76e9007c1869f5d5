pub mod health;
pub mod helix;
pub mod hydro;
pub mod neptune;
pub mod scoring;
pub mod traits;

pub use helix::HelixAgent;
pub use hydro::HydroAgent;
pub use neptune::NeptuneAgent;
pub use traits::ProtocolAgent;
