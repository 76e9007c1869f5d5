use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::data::token_metadata;
use crate::error::AdapterError;
use crate::models::{
    AssetInfo, HistoricalPoint, HydroFeeStructure, NeptuneFeeStructure, Pool, PoolParameters, ProtocolInfo,
    ProtocolKind, StrategyDetail, StrategyPerformancePoint,
};

/// Common interface for all protocol adapters
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn protocol(&self) -> ProtocolKind;

    /// Registry key, e.g. "helix"
    fn protocol_id(&self) -> &'static str {
        self.protocol().id()
    }

    /// All pools, live when enabled and reachable, otherwise from the catalog
    async fn get_pools(&self) -> Result<Vec<Pool>, AdapterError>;

    /// Single pool lookup; `AdapterError::NotFound` when no source knows the id
    async fn get_pool_details(&self, pool_id: &str) -> Result<Pool, AdapterError>;

    async fn get_apy(&self, pool_id: &str) -> Result<f64, AdapterError> {
        Ok(self.get_pool_details(pool_id).await?.apy)
    }

    /// TVL keyed by pool id, for one pool or all of them
    async fn get_tvl(&self, pool_id: Option<&str>) -> Result<BTreeMap<String, f64>, AdapterError> {
        match pool_id {
            Some(id) => {
                let pool = self.get_pool_details(id).await?;
                Ok(BTreeMap::from([(pool.id, pool.tvl)]))
            }
            None => Ok(self.get_pools().await?.into_iter().map(|p| (p.id, p.tvl)).collect()),
        }
    }

    /// Exactly `days` points (capped at ten years), most recent first
    async fn get_historical_data(&self, pool_id: &str, days: u32) -> Result<Vec<HistoricalPoint>, AdapterError>;

    async fn get_assets(&self, pool_id: &str) -> Result<Vec<AssetInfo>, AdapterError> {
        let pool = self.get_pool_details(pool_id).await?;
        Ok(pool.pair.iter().map(|symbol| token_metadata(symbol)).collect())
    }

    async fn get_protocol_info(&self) -> Result<ProtocolInfo, AdapterError>;

    /// Protocol-level risk in `[1, 10]`, one decimal
    async fn estimate_protocol_risk(&self) -> f64;

    async fn is_available(&self) -> bool;
}

/// Hydro extensions: AMM curve parameters and swap fees
#[async_trait]
pub trait StablePoolAdapter: ProtocolAdapter {
    async fn get_pool_parameters(&self, pool_id: &str) -> Result<PoolParameters, AdapterError>;

    async fn get_fee_structure(&self, pool_id: Option<&str>) -> Result<HydroFeeStructure, AdapterError>;
}

/// Neptune extensions: vault strategies and harvesting history
#[async_trait]
pub trait StrategyAdapter: ProtocolAdapter {
    async fn get_strategy_details(&self, pool_id: &str) -> Result<StrategyDetail, AdapterError>;

    async fn get_fee_structure(&self, pool_id: Option<&str>) -> Result<NeptuneFeeStructure, AdapterError>;

    async fn get_performance_history(
        &self,
        pool_id: &str,
        days: u32,
    ) -> Result<Vec<StrategyPerformancePoint>, AdapterError>;
}
