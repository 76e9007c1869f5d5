use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::base::AdapterCore;
use super::http::EndpointClient;
use super::normalize;
use super::traits::{ProtocolAdapter, StablePoolAdapter};
use crate::config::ProtocolConfig;
use crate::data::PoolDataProvider;
use crate::error::AdapterError;
use crate::models::{
    FeeShare, FeeTier, HistoricalPoint, HydroFeeStructure, Pool, PoolParameters, PoolType, ProtocolInfo,
    ProtocolKind,
};
use crate::utils::math::{clamp_risk, round_to, tvl_size_factor};

pub const HYDRO_BASE_RISK: f64 = 4.0;
pub const HYDRO_PROTOCOL_AGE_YEARS: f64 = 1.5;
pub const HYDRO_AUDIT_RISK: f64 = 3.0;
pub const HYDRO_DEFAULT_RISK: f64 = 4.0;

pub const STABLE_SWAP_FEE: f64 = 0.04;
pub const WEIGHTED_SWAP_FEE: f64 = 0.3;
pub const ADMIN_FEE: f64 = 10.0;
pub const STABLE_AMPLIFICATION: u32 = 100;

/// Weights of the Hydro protocol risk model, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydroRiskWeights {
    pub tvl: f64,
    pub base: f64,
    pub age: f64,
    pub audit: f64,
    pub stable: f64,
}

impl Default for HydroRiskWeights {
    fn default() -> Self {
        HydroRiskWeights {
            tvl: 0.35,
            base: 0.25,
            age: 0.15,
            audit: 0.1,
            stable: 0.15,
        }
    }
}

/// Adapter for the Hydro stable-swap / weighted AMM
pub struct HydroAdapter {
    core: AdapterCore,
    weights: HydroRiskWeights,
}

impl HydroAdapter {
    pub fn new(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Self::with_provider(config, PoolDataProvider::new(ProtocolKind::Hydro))
    }

    pub fn with_provider(config: ProtocolConfig, provider: PoolDataProvider) -> Result<Self, AdapterError> {
        Ok(Self::from_core(AdapterCore::from_config(config, provider)?))
    }

    pub fn with_client(config: ProtocolConfig, provider: PoolDataProvider, client: Arc<dyn EndpointClient>) -> Self {
        Self::from_core(AdapterCore::new(config, provider, client))
    }

    fn from_core(core: AdapterCore) -> Self {
        HydroAdapter {
            core,
            weights: HydroRiskWeights::default(),
        }
    }

    pub fn with_risk_weights(mut self, weights: HydroRiskWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Protocol risk from the current pool set.
    ///
    /// A higher share of stable pools lowers the composition factor; an empty
    /// pool set counts as half stable.
    pub fn protocol_risk_for(&self, pools: &[Pool]) -> f64 {
        let total_tvl: f64 = pools.iter().map(|p| p.tvl).sum();
        let tvl_factor = tvl_size_factor(total_tvl);
        let age_factor = (7.0 - HYDRO_PROTOCOL_AGE_YEARS).max(1.0);

        let stable_ratio = if pools.is_empty() {
            0.5
        } else {
            pools.iter().filter(|p| p.is_stable_pool()).count() as f64 / pools.len() as f64
        };
        let stable_factor = 6.0 - stable_ratio * 3.0;

        let w = &self.weights;
        let risk = tvl_factor * w.tvl
            + HYDRO_BASE_RISK * w.base
            + age_factor * w.age
            + HYDRO_AUDIT_RISK * w.audit
            + stable_factor * w.stable;
        round_to(clamp_risk(risk), 1)
    }

    fn default_parameters(pool: &Pool) -> PoolParameters {
        match pool.pool_type.unwrap_or(PoolType::Stable) {
            PoolType::Stable => PoolParameters {
                pool_id: pool.id.clone(),
                pool_type: PoolType::Stable,
                amplification_coefficient: Some(STABLE_AMPLIFICATION),
                weights: None,
                swap_fee: STABLE_SWAP_FEE,
                admin_fee: ADMIN_FEE,
                price_range: "0.98 - 1.02".to_string(),
                min_trade_size: "10 USDC".to_string(),
                oracle_enabled: true,
                created_at: "2022-12-01T00:00:00Z".to_string(),
            },
            PoolType::Weighted => {
                let share = 100.0 / pool.pair.len().max(1) as f64;
                PoolParameters {
                    pool_id: pool.id.clone(),
                    pool_type: PoolType::Weighted,
                    amplification_coefficient: None,
                    weights: Some(pool.pair.iter().map(|token| (token.clone(), share)).collect()),
                    swap_fee: WEIGHTED_SWAP_FEE,
                    admin_fee: ADMIN_FEE,
                    price_range: "Full Range".to_string(),
                    min_trade_size: "1 USDC".to_string(),
                    oracle_enabled: false,
                    created_at: "2023-01-15T00:00:00Z".to_string(),
                }
            }
        }
    }

    async fn live_parameters(&self, pool: &Pool) -> Result<PoolParameters, AdapterError> {
        let body = self.core.fetch_live(&format!("pools/{}/parameters", pool.id), &[]).await?;
        let mut params = Self::default_parameters(pool);

        if let Some(label) = normalize::text(&body, &["pool_type"]) {
            params.pool_type = PoolType::from_label(&label);
        }
        if let Some(amp) = normalize::number(&body, &["amp", "amplification_coefficient"]) {
            params.amplification_coefficient = Some(amp.max(0.0) as u32);
        }
        if let Some(fee) = normalize::number(&body, &["swap_fee"]) {
            params.swap_fee = fee;
        }
        if let Some(fee) = normalize::number(&body, &["admin_fee"]) {
            params.admin_fee = fee;
        }
        if let Some(range) = normalize::text(&body, &["price_range"]) {
            params.price_range = range;
        }
        if let Some(weights) = body.get("weights").filter(|w| w.is_object()) {
            let parsed: BTreeMap<String, f64> = weights
                .as_object()
                .into_iter()
                .flat_map(|map| map.keys())
                .filter_map(|token| Some((token.clone(), normalize::number(weights, &[token.as_str()])?)))
                .collect();
            if !parsed.is_empty() {
                params.weights = Some(parsed);
            }
        }
        Ok(params)
    }
}

#[async_trait]
impl ProtocolAdapter for HydroAdapter {
    fn protocol(&self) -> ProtocolKind {
        ProtocolKind::Hydro
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
            name: "Hydro Protocol".to_string(),
            description: "Hydro is a concentrated liquidity AMM protocol on Injective Chain".to_string(),
            website: "https://hydro.injective.network".to_string(),
            tvl: pools.iter().map(|p| p.tvl).sum(),
            pool_count: pools.len(),
            features: vec![
                "Concentrated Liquidity".to_string(),
                "Stable Swaps".to_string(),
                "Dynamic Fees".to_string(),
            ],
            audit_status: Some("Audited".to_string()),
            launch_date: Some("2022-11-15".to_string()),
            specialization: Some("Stablecoin liquidity".to_string()),
        };

        Ok(match self.core.live_info().await {
            Some(body) => normalize::merge_protocol_info(&body, info),
            None => info,
        })
    }

    async fn estimate_protocol_risk(&self) -> f64 {
        match self.get_pools().await {
            Ok(pools) => self.protocol_risk_for(&pools),
            Err(e) => {
                tracing::warn!(protocol = "hydro", error = %e, "Protocol risk inputs unavailable");
                HYDRO_DEFAULT_RISK
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.core.is_available().await
    }
}

#[async_trait]
impl StablePoolAdapter for HydroAdapter {
    async fn get_pool_parameters(&self, pool_id: &str) -> Result<PoolParameters, AdapterError> {
        let pool = self.get_pool_details(pool_id).await?;
        if !self.core.mock_mode() {
            match self.live_parameters(&pool).await {
                Ok(params) => return Ok(params),
                Err(e) => {
                    tracing::warn!(pool_id = %pool_id, error = %e, "Live pool parameters unavailable, using defaults");
                }
            }
        }
        Ok(Self::default_parameters(&pool))
    }

    async fn get_fee_structure(&self, pool_id: Option<&str>) -> Result<HydroFeeStructure, AdapterError> {
        let Some(pool_id) = pool_id else {
            return Ok(HydroFeeStructure::General {
                fee_tiers: vec![
                    FeeTier { tier: 0.01, description: "Ultra-low fee for highly liquid stable pairs".to_string() },
                    FeeTier { tier: 0.04, description: "Low fee for stable pairs".to_string() },
                    FeeTier { tier: 0.3, description: "Standard fee for weighted pools".to_string() },
                    FeeTier { tier: 1.0, description: "High fee for exotic pairs".to_string() },
                ],
                admin_fee: ADMIN_FEE,
                fee_distribution: vec![
                    FeeShare { recipient: "protocol_treasury".to_string(), share: 50.0 },
                    FeeShare { recipient: "stakers".to_string(), share: 30.0 },
                    FeeShare { recipient: "safety_fund".to_string(), share: 20.0 },
                ],
            });
        };

        let pool = self.get_pool_details(pool_id).await?;
        let pool_type = pool.pool_type.unwrap_or(PoolType::Weighted);
        let swap_fee = match pool_type {
            PoolType::Stable => STABLE_SWAP_FEE,
            PoolType::Weighted => WEIGHTED_SWAP_FEE,
        };
        Ok(HydroFeeStructure::Pool {
            pool_id: pool.id,
            pool_type,
            swap_fee,
            admin_fee: ADMIN_FEE,
            fee_recipient: "Hydro DAO Treasury".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_adapter() -> HydroAdapter {
        HydroAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Hydro)).unwrap()
    }

    #[test]
    fn test_protocol_risk_with_no_pools() {
        let adapter = mock_adapter();
        // 10*0.35 + 4*0.25 + 5.5*0.15 + 3*0.1 + 4.5*0.15 = 6.3
        assert_eq!(adapter.protocol_risk_for(&[]), 6.3);
    }

    #[tokio::test]
    async fn test_protocol_risk_from_catalog() {
        let risk = mock_adapter().estimate_protocol_risk().await;
        assert!((1.0..=10.0).contains(&risk));
        // ~9.34M TVL and two thirds stable pools
        assert!((4.0..=5.0).contains(&risk));
    }

    #[tokio::test]
    async fn test_stable_pool_parameters() {
        let params = mock_adapter().get_pool_parameters("hydro_usdc_usdt").await.unwrap();
        assert_eq!(params.pool_type, PoolType::Stable);
        assert_eq!(params.amplification_coefficient, Some(100));
        assert_eq!(params.swap_fee, 0.04);
        assert!(params.oracle_enabled);
    }

    #[tokio::test]
    async fn test_weighted_pool_parameters() {
        let params = mock_adapter().get_pool_parameters("hydro_inj_atom").await.unwrap();
        assert_eq!(params.pool_type, PoolType::Weighted);
        let weights = params.weights.unwrap();
        assert_eq!(weights.get("INJ"), Some(&50.0));
        assert_eq!(params.price_range, "Full Range");
    }

    #[tokio::test]
    async fn test_fee_structure() {
        let adapter = mock_adapter();
        match adapter.get_fee_structure(Some("hydro_usdc_dai")).await.unwrap() {
            HydroFeeStructure::Pool { swap_fee, fee_recipient, .. } => {
                assert_eq!(swap_fee, 0.04);
                assert_eq!(fee_recipient, "Hydro DAO Treasury");
            }
            other => panic!("unexpected fee structure {:?}", other),
        }
        match adapter.get_fee_structure(None).await.unwrap() {
            HydroFeeStructure::General { fee_tiers, fee_distribution, .. } => {
                assert_eq!(fee_tiers.len(), 4);
                assert_eq!(fee_distribution.iter().map(|s| s.share).sum::<f64>(), 100.0);
            }
            other => panic!("unexpected fee structure {:?}", other),
        }
        assert!(matches!(
            adapter.get_pool_parameters("hydro_missing").await,
            Err(AdapterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_protocol_info() {
        let info = mock_adapter().get_protocol_info().await.unwrap();
        assert_eq!(info.name, "Hydro Protocol");
        assert_eq!(info.specialization.as_deref(), Some("Stablecoin liquidity"));
        assert_eq!(info.features.len(), 3);
    }
}
