use async_trait::async_trait;
use std::sync::Arc;

use super::base::AdapterCore;
use super::http::EndpointClient;
use super::normalize;
use super::traits::ProtocolAdapter;
use crate::config::ProtocolConfig;
use crate::data::PoolDataProvider;
use crate::error::AdapterError;
use crate::models::{HistoricalPoint, Pool, ProtocolInfo, ProtocolKind};
use crate::utils::math::{clamp_risk, round_to, tvl_size_factor};

/// Base risk of the Helix order-book DEX
pub const HELIX_BASE_RISK: f64 = 5.0;
/// Reported when the risk inputs cannot be gathered
pub const HELIX_DEFAULT_RISK: f64 = 5.0;

/// Weights of the Helix protocol risk model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixRiskWeights {
    pub tvl: f64,
    pub base: f64,
}

impl Default for HelixRiskWeights {
    fn default() -> Self {
        HelixRiskWeights { tvl: 0.6, base: 0.4 }
    }
}

/// Adapter for Helix spot liquidity pools
pub struct HelixAdapter {
    core: AdapterCore,
    weights: HelixRiskWeights,
}

impl HelixAdapter {
    pub fn new(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Self::with_provider(config, PoolDataProvider::new(ProtocolKind::Helix))
    }

    pub fn with_provider(config: ProtocolConfig, provider: PoolDataProvider) -> Result<Self, AdapterError> {
        Ok(Self::from_core(AdapterCore::from_config(config, provider)?))
    }

    pub fn with_client(config: ProtocolConfig, provider: PoolDataProvider, client: Arc<dyn EndpointClient>) -> Self {
        Self::from_core(AdapterCore::new(config, provider, client))
    }

    fn from_core(core: AdapterCore) -> Self {
        HelixAdapter {
            core,
            weights: HelixRiskWeights::default(),
        }
    }

    pub fn with_risk_weights(mut self, weights: HelixRiskWeights) -> Self {
        self.weights = weights;
        self
    }

    /// `tvl_factor * w.tvl + base * w.base`, clamped and rounded
    pub fn protocol_risk_for(&self, total_tvl: f64) -> f64 {
        let tvl_factor = tvl_size_factor(total_tvl);
        let risk = tvl_factor * self.weights.tvl + HELIX_BASE_RISK * self.weights.base;
        round_to(clamp_risk(risk), 1)
    }
}

#[async_trait]
impl ProtocolAdapter for HelixAdapter {
    fn protocol(&self) -> ProtocolKind {
        ProtocolKind::Helix
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
            name: "Helix".to_string(),
            description: "Helix is a DeFi protocol on Injective Chain".to_string(),
            website: "https://helix.injective.network".to_string(),
            tvl: pools.iter().map(|p| p.tvl).sum(),
            pool_count: pools.len(),
            features: Vec::new(),
            audit_status: None,
            launch_date: None,
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
                tracing::warn!(protocol = "helix", error = %e, "Protocol risk inputs unavailable");
                HELIX_DEFAULT_RISK
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.core.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Fluctuation;

    fn adapter_with(pools: Vec<Pool>) -> HelixAdapter {
        let provider = PoolDataProvider::with_pools(ProtocolKind::Helix, pools).with_fluctuation(Fluctuation::none());
        HelixAdapter::with_provider(ProtocolConfig::for_protocol(ProtocolKind::Helix), provider).unwrap()
    }

    #[tokio::test]
    async fn test_protocol_risk_for_five_million_tvl() {
        let adapter = adapter_with(vec![
            Pool::new("helix_a", "USDC-INJ LP", "Helix", &["USDC", "INJ"], 20.0, 3_000_000.0, 0.05, 5.0),
            Pool::new("helix_b", "USDC-USDT LP", "Helix", &["USDC", "USDT"], 10.0, 2_000_000.0, 0.03, 3.0),
        ]);
        // tvl_factor 7.5 -> 7.5 * 0.6 + 5.0 * 0.4
        assert_eq!(adapter.estimate_protocol_risk().await, 6.5);
    }

    #[tokio::test]
    async fn test_pool_details_not_found() {
        let adapter = HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap();
        let result = adapter.get_pool_details("helix_unknown").await;
        assert_eq!(result, Err(AdapterError::NotFound("helix_unknown".to_string())));
    }

    #[tokio::test]
    async fn test_history_for_unknown_pool_is_synthesized() {
        let adapter = HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap();
        let first = adapter.get_historical_data("helix_unknown", 9).await.unwrap();
        let second = adapter.get_historical_data("helix_unknown", 9).await.unwrap();
        assert_eq!(first.len(), 9);
        assert_eq!(first, second);
        // defaults of 10% APY with ±5% noise
        assert!(first.iter().all(|p| p.apy >= 9.49 && p.apy <= 10.51));
    }

    #[tokio::test]
    async fn test_assets_and_details() {
        let adapter = HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap();
        let assets = adapter.get_assets("helix_usdc_atom").await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].name, "Cosmos");

        let pool = adapter.get_pool_details("helix_usdc_atom").await.unwrap();
        assert_eq!(pool.fee_tier.as_deref(), Some("0.3%"));
        assert!(adapter.get_apy("helix_usdc_atom").await.unwrap() > 0.0);
        assert_eq!(adapter.get_tvl(Some("helix_usdc_atom")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_protocol_info_in_mock_mode() {
        let adapter = HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap();
        let info = adapter.get_protocol_info().await.unwrap();
        assert_eq!(info.name, "Helix");
        assert_eq!(info.pool_count, 3);
        assert!(adapter.is_available().await);
    }
}
