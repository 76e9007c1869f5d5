use rand::Rng;
use std::collections::BTreeMap;

use super::catalog::baseline_pools;
use super::synthesis::{synthesize_history, SeriesProfile};
use crate::models::{HistoricalPoint, Pool, ProtocolKind};
use crate::utils::math::round_to;

/// Relative half-amplitude of the perturbation applied on every read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fluctuation {
    pub apy: f64,
    pub tvl: f64,
}

impl Default for Fluctuation {
    fn default() -> Self {
        // ±5% APY, ±2.5% TVL
        Fluctuation { apy: 0.05, tvl: 0.025 }
    }
}

impl Fluctuation {
    pub fn none() -> Self {
        Fluctuation { apy: 0.0, tvl: 0.0 }
    }
}

/// In-memory pool catalog for one protocol.
///
/// Baselines are never mutated; every read perturbs a fresh copy.
#[derive(Debug, Clone)]
pub struct PoolDataProvider {
    protocol: ProtocolKind,
    baselines: Vec<Pool>,
    fluctuation: Fluctuation,
}

impl PoolDataProvider {
    pub fn new(protocol: ProtocolKind) -> Self {
        Self::with_pools(protocol, baseline_pools(protocol))
    }

    pub fn with_pools(protocol: ProtocolKind, baselines: Vec<Pool>) -> Self {
        PoolDataProvider {
            protocol,
            baselines,
            fluctuation: Fluctuation::default(),
        }
    }

    pub fn with_fluctuation(mut self, fluctuation: Fluctuation) -> Self {
        self.fluctuation = fluctuation;
        self
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol
    }

    pub fn baseline(&self, pool_id: &str) -> Option<&Pool> {
        self.baselines.iter().find(|p| p.id == pool_id)
    }

    /// Every pool with independent random fluctuation around its baseline
    pub fn get_pools(&self) -> Vec<Pool> {
        let mut rng = rand::thread_rng();
        self.baselines
            .iter()
            .map(|baseline| {
                let mut pool = baseline.clone();
                let apy_factor = 1.0 + (rng.gen::<f64>() - 0.5) * 2.0 * self.fluctuation.apy;
                let tvl_factor = 1.0 + (rng.gen::<f64>() - 0.5) * 2.0 * self.fluctuation.tvl;
                pool.apy = round_to(baseline.apy * apy_factor, 2);
                pool.tvl = round_to(baseline.tvl * tvl_factor, 0);
                pool.clamped()
            })
            .collect()
    }

    /// Series shape used for a catalog pool: trend plus noise scaled by its volatility
    pub fn series_profile(&self, pool: &Pool) -> SeriesProfile {
        SeriesProfile {
            base_apy: pool.apy,
            base_tvl: pool.tvl,
            apy_noise: pool.volatility,
            apy_trend: 0.001,
            tvl_noise: 0.015,
            tvl_trend: 0.0005,
            volume_range: self.protocol.volume_fraction_range(),
        }
    }

    /// History for a single catalog pool, `None` if the id is unknown
    pub fn get_pool_history(&self, pool_id: &str, days: u32) -> Option<Vec<HistoricalPoint>> {
        self.baseline(pool_id)
            .map(|pool| synthesize_history(&pool.id, &self.series_profile(pool), days))
    }

    /// `days` points per catalog pool keyed by pool id
    pub fn get_historical_data(&self, days: u32) -> BTreeMap<String, Vec<HistoricalPoint>> {
        self.baselines
            .iter()
            .map(|pool| {
                (
                    pool.id.clone(),
                    synthesize_history(&pool.id, &self.series_profile(pool), days),
                )
            })
            .collect()
    }

    /// Current TVL per pool
    pub fn get_tvl(&self) -> BTreeMap<String, f64> {
        self.get_pools().into_iter().map(|p| (p.id, p.tvl)).collect()
    }
}
