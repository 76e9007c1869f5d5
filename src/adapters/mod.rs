pub mod base;
pub mod helix;
pub mod http;
pub mod hydro;
pub mod neptune;
pub mod normalize;
pub mod traits;

pub use base::AdapterCore;
pub use helix::HelixAdapter;
pub use http::{EndpointClient, HttpEndpointClient};
pub use hydro::HydroAdapter;
pub use neptune::NeptuneAdapter;
pub use traits::{ProtocolAdapter, StablePoolAdapter, StrategyAdapter};
