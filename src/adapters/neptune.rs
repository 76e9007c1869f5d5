use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;

use super::base::AdapterCore;
use super::http::EndpointClient;
use super::normalize;
use super::traits::{ProtocolAdapter, StrategyAdapter};
use crate::config::ProtocolConfig;
use crate::data::{seeded_rng, PoolDataProvider};
use crate::error::AdapterError;
use crate::models::{
    FeeShare, HistoricalPoint, NeptuneFeeStructure, Pool, ProtocolInfo, ProtocolKind, StrategyDetail,
    StrategyPerformancePoint, StrategyType,
};
use crate::utils::math::{clamp_risk, round_to, tvl_size_factor};
use crate::utils::time::hours_ago_rfc3339;

pub const NEPTUNE_BASE_RISK: f64 = 6.0;
pub const NEPTUNE_PROTOCOL_AGE_YEARS: f64 = 1.0;
pub const NEPTUNE_AUDIT_RISK: f64 = 3.0;
pub const NEPTUNE_STRATEGY_RISK: f64 = 6.0;
pub const NEPTUNE_DEFAULT_RISK: f64 = 6.0;

pub const PERFORMANCE_FEE: f64 = 10.0;
pub const PREMIUM_PERFORMANCE_FEE: f64 = 15.0;
pub const WITHDRAWAL_FEE: f64 = 0.1;
pub const SAME_DAY_WITHDRAWAL_FEE: f64 = 0.5;

/// Weights of the Neptune protocol risk model, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeptuneRiskWeights {
    pub tvl: f64,
    pub base: f64,
    pub age: f64,
    pub audit: f64,
    pub strategy: f64,
}

impl Default for NeptuneRiskWeights {
    fn default() -> Self {
        NeptuneRiskWeights {
            tvl: 0.35,
            base: 0.25,
            age: 0.2,
            audit: 0.1,
            strategy: 0.1,
        }
    }
}

/// Adapter for Neptune yield-aggregator vaults
pub struct NeptuneAdapter {
    core: AdapterCore,
    weights: NeptuneRiskWeights,
}

impl NeptuneAdapter {
    pub fn new(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Self::with_provider(config, PoolDataProvider::new(ProtocolKind::Neptune))
    }

    pub fn with_provider(config: ProtocolConfig, provider: PoolDataProvider) -> Result<Self, AdapterError> {
        Ok(Self::from_core(AdapterCore::from_config(config, provider)?))
    }

    pub fn with_client(config: ProtocolConfig, provider: PoolDataProvider, client: Arc<dyn EndpointClient>) -> Self {
        Self::from_core(AdapterCore::new(config, provider, client))
    }

    fn from_core(core: AdapterCore) -> Self {
        NeptuneAdapter {
            core,
            weights: NeptuneRiskWeights::default(),
        }
    }

    pub fn with_risk_weights(mut self, weights: NeptuneRiskWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn protocol_risk_for(&self, total_tvl: f64) -> f64 {
        let tvl_factor = tvl_size_factor(total_tvl);
        let age_factor = (7.0 - NEPTUNE_PROTOCOL_AGE_YEARS).max(1.0);

        let w = &self.weights;
        let risk = tvl_factor * w.tvl
            + NEPTUNE_BASE_RISK * w.base
            + age_factor * w.age
            + NEPTUNE_AUDIT_RISK * w.audit
            + NEPTUNE_STRATEGY_RISK * w.strategy;
        round_to(clamp_risk(risk), 1)
    }

    fn default_strategy(pool: &Pool) -> StrategyDetail {
        let strategy_type = pool.strategy_type.unwrap_or_else(|| StrategyType::for_pair(&pool.pair));
        let hours_since_harvest = seeded_rng(&pool.id).gen_range(1..=8);

        StrategyDetail {
            pool_id: pool.id.clone(),
            strategy_name: format!("Neptune {} Strategy", pool.name),
            strategy_type,
            description: strategy_type.description().to_string(),
            underlying_protocol: strategy_type.underlying_protocol().to_string(),
            harvesting_frequency: strategy_type.harvesting_frequency().to_string(),
            performance_fee: PERFORMANCE_FEE,
            withdrawal_fee: WITHDRAWAL_FEE,
            risk_level: pool.risk_score,
            expected_apy: pool.apy,
            last_harvest: hours_ago_rfc3339(hours_since_harvest),
        }
    }

    async fn live_strategy(&self, pool: &Pool) -> Result<StrategyDetail, AdapterError> {
        let body = self.core.fetch_live(&format!("pools/{}/strategy", pool.id), &[]).await?;
        let mut detail = Self::default_strategy(pool);

        if let Some(strategy_type) = normalize::text(&body, &["strategy_type"]).and_then(|l| StrategyType::from_label(&l)) {
            detail.strategy_type = strategy_type;
        }
        if let Some(name) = normalize::text(&body, &["strategy_name"]) {
            detail.strategy_name = name;
        }
        if let Some(description) = normalize::text(&body, &["description"]) {
            detail.description = description;
        }
        if let Some(underlying) = normalize::text(&body, &["underlying_protocol"]) {
            detail.underlying_protocol = underlying;
        }
        if let Some(frequency) = normalize::text(&body, &["harvesting_frequency"]) {
            detail.harvesting_frequency = frequency;
        }
        if let Some(fee) = normalize::number(&body, &["performance_fee"]) {
            detail.performance_fee = fee;
        }
        if let Some(fee) = normalize::number(&body, &["withdrawal_fee"]) {
            detail.withdrawal_fee = fee;
        }
        if let Some(harvest) = normalize::text(&body, &["last_harvest"]) {
            detail.last_harvest = harvest;
        }
        Ok(detail)
    }
}

#[async_trait]
impl ProtocolAdapter for NeptuneAdapter {
    fn protocol(&self) -> ProtocolKind {
        ProtocolKind::Neptune
    }

    async fn get_pools(&self) -> Result<Vec<Pool>, AdapterError> {
        Ok(self.core.pools().await)
    }

    async fn get_pool_details(&self, pool_id: &str) -> Result<Pool, AdapterError> {
        self.core.pool_details(pool_id).await
    }

    async fn get_historical_data(&self, pool_id: &str, days: u32) -> Result<Vec<HistoricalPoint>, AdapterError> {
        Ok(self.core.history(pool_id, days).await)
    }

    async fn get_protocol_info(&self) -> Result<ProtocolInfo, AdapterError> {
        let pools = self.get_pools().await?;
        let info = ProtocolInfo {
            name: "Neptune Finance".to_string(),
            description: "Neptune Finance is a yield aggregator protocol on Injective Chain".to_string(),
            website: "https://neptune.injective.network".to_string(),
            tvl: pools.iter().map(|p| p.tvl).sum(),
            pool_count: pools.len(),
            features: vec![
                "Yield Aggregation".to_string(),
                "Auto-compounding".to_string(),
                "Strategy Vaults".to_string(),
            ],
            audit_status: Some("Audited".to_string()),
            launch_date: Some("2023-02-15".to_string()),
            specialization: None,
        };

        Ok(match self.core.live_info().await {
            Some(body) => normalize::merge_protocol_info(&body, info),
            None => info,
        })
    }

    async fn estimate_protocol_risk(&self) -> f64 {
        match self.get_pools().await {
            Ok(pools) => self.protocol_risk_for(pools.iter().map(|p| p.tvl).sum()),
            Err(e) => {
                tracing::warn!(protocol = "neptune", error = %e, "Protocol risk inputs unavailable");
                NEPTUNE_DEFAULT_RISK
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.core.is_available().await
    }
}

#[async_trait]
impl StrategyAdapter for NeptuneAdapter {
    async fn get_strategy_details(&self, pool_id: &str) -> Result<StrategyDetail, AdapterError> {
        let pool = self.get_pool_details(pool_id).await?;
        if !self.core.mock_mode() {
            match self.live_strategy(&pool).await {
                Ok(detail) => return Ok(detail),
                Err(e) => {
                    tracing::warn!(pool_id = %pool_id, error = %e, "Live strategy unavailable, using defaults");
                }
            }
        }
        Ok(Self::default_strategy(&pool))
    }

    async fn get_fee_structure(&self, pool_id: Option<&str>) -> Result<NeptuneFeeStructure, AdapterError> {
        match pool_id {
            Some(pool_id) => {
                let strategy = self.get_strategy_details(pool_id).await?;
                Ok(NeptuneFeeStructure::Pool {
                    pool_id: strategy.pool_id,
                    performance_fee: strategy.performance_fee,
                    withdrawal_fee: strategy.withdrawal_fee,
                    deposit_fee: 0.0,
                })
            }
            None => Ok(NeptuneFeeStructure::General {
                performance_fee_standard: PERFORMANCE_FEE,
                performance_fee_premium: PREMIUM_PERFORMANCE_FEE,
                withdrawal_fee_standard: WITHDRAWAL_FEE,
                withdrawal_fee_same_day: SAME_DAY_WITHDRAWAL_FEE,
                fee_distribution: vec![
                    FeeShare { recipient: "treasury".to_string(), share: 50.0 },
                    FeeShare { recipient: "buyback".to_string(), share: 30.0 },
                    FeeShare { recipient: "development".to_string(), share: 20.0 },
                ],
            }),
        }
    }

    /// History plus seeded harvest counts, fees and efficiency per day
    async fn get_performance_history(
        &self,
        pool_id: &str,
        days: u32,
    ) -> Result<Vec<StrategyPerformancePoint>, AdapterError> {
        let history = self.get_historical_data(pool_id, days).await?;
        let mut rng = seeded_rng(&format!("{}:harvests", pool_id));

        Ok(history
            .into_iter()
            .map(|point| {
                // the vault keeps 10% of the daily yield
                let fees_collected = point.tvl * point.apy / 100.0 / 365.0 * 0.1;
                StrategyPerformancePoint {
                    harvests: rng.gen_range(2..=6),
                    fees_collected: round_to(fees_collected, 2),
                    strategy_efficiency: round_to(rng.gen_range(0.92..0.99), 4),
                    point,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_adapter() -> NeptuneAdapter {
        NeptuneAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Neptune)).unwrap()
    }

    #[test]
    fn test_protocol_risk_for_five_million_tvl() {
        // 7.5*0.35 + 6*0.25 + 6*0.2 + 3*0.1 + 6*0.1 = 6.225
        assert_eq!(mock_adapter().protocol_risk_for(5_000_000.0), 6.2);
    }

    #[tokio::test]
    async fn test_strategy_details_by_pair() {
        let adapter = mock_adapter();
        let inj = adapter.get_strategy_details("neptune_usdc_inj").await.unwrap();
        assert_eq!(inj.strategy_type, StrategyType::LpCompounding);
        assert_eq!(inj.underlying_protocol, "Helix");
        assert_eq!(inj.harvesting_frequency, "4 hours");
        assert_eq!(inj.strategy_name, "Neptune USDC-INJ Yield Pool Strategy");

        let atom = adapter.get_strategy_details("neptune_usdc_atom").await.unwrap();
        assert_eq!(atom.strategy_type, StrategyType::MultiProtocol);
        assert_eq!(atom.performance_fee, 10.0);
    }

    #[tokio::test]
    async fn test_performance_history() {
        let adapter = mock_adapter();
        let first = adapter.get_performance_history("neptune_usdc_inj", 7).await.unwrap();
        let second = adapter.get_performance_history("neptune_usdc_inj", 7).await.unwrap();
        assert_eq!(first.len(), 7);
        assert_eq!(first, second);
        for day in &first {
            assert!((2..=6).contains(&day.harvests));
            assert!(day.strategy_efficiency >= 0.92 && day.strategy_efficiency <= 0.99);
            assert!(day.fees_collected > 0.0);
        }
    }

    #[tokio::test]
    async fn test_fee_structure() {
        let adapter = mock_adapter();
        assert!(matches!(
            adapter.get_fee_structure(Some("neptune_usdc_atom")).await.unwrap(),
            NeptuneFeeStructure::Pool { deposit_fee, .. } if deposit_fee == 0.0
        ));
        assert!(matches!(
            adapter.get_fee_structure(None).await.unwrap(),
            NeptuneFeeStructure::General { performance_fee_premium, .. } if performance_fee_premium == 15.0
        ));
    }
}
