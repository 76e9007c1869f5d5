pub mod catalog;
pub mod provider;
pub mod synthesis;

pub use catalog::{baseline_pools, token_metadata};
pub use provider::{Fluctuation, PoolDataProvider};
pub use synthesis::{seed_for, seeded_rng, synthesize_history, SeriesProfile, MAX_HISTORY_DAYS};
