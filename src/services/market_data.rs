use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::{HelixAdapter, HydroAdapter, NeptuneAdapter, ProtocolAdapter};
use crate::config::Settings;
use crate::error::{AdapterError, AppError};
use crate::models::{HistoricalPoint, Pool, ProtocolKind, ProtocolStats};
use crate::utils::math::{mean, round_to};

/// Fan-out over every registered adapter.
///
/// A failing adapter is logged and left out of the aggregate; it never fails the whole call.
pub struct MarketDataCollector {
    adapters: BTreeMap<String, Arc<dyn ProtocolAdapter>>,
}

impl MarketDataCollector {
    pub fn new() -> Self {
        MarketDataCollector {
            adapters: BTreeMap::new(),
        }
    }

    /// Helix, Hydro and Neptune adapters built from `settings`
    pub fn with_default_adapters(settings: &Settings) -> Result<Self, AppError> {
        let mut collector = Self::new();
        collector.register(Arc::new(HelixAdapter::new(settings.protocol(ProtocolKind::Helix).clone())?));
        collector.register(Arc::new(HydroAdapter::new(settings.protocol(ProtocolKind::Hydro).clone())?));
        collector.register(Arc::new(NeptuneAdapter::new(settings.protocol(ProtocolKind::Neptune).clone())?));
        Ok(collector)
    }

    /// Registers under the adapter's protocol id, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn ProtocolAdapter>) {
        let protocol_id = adapter.protocol_id().to_string();
        info!(protocol = %protocol_id, "Registered protocol adapter");
        self.adapters.insert(protocol_id, adapter);
    }

    pub fn protocol_ids(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    pub fn adapter(&self, protocol_id: &str) -> Option<&Arc<dyn ProtocolAdapter>> {
        self.adapters.get(protocol_id)
    }

    /// Runs `op` against every adapter concurrently and keeps the successes
    async fn fan_out<'a, T, F, Fut>(&'a self, what: &str, op: F) -> BTreeMap<String, T>
    where
        F: Fn(&'a Arc<dyn ProtocolAdapter>) -> Fut,
        Fut: std::future::Future<Output = Result<T, AdapterError>>,
    {
        let calls = self.adapters.iter().map(|(protocol_id, adapter)| {
            let call = op(adapter);
            async move { (protocol_id, call.await) }
        });

        join_all(calls)
            .await
            .into_iter()
            .filter_map(|(protocol_id, result)| match result {
                Ok(value) => Some((protocol_id.clone(), value)),
                Err(e) => {
                    warn!(protocol = %protocol_id, error = %e, "Skipping protocol in {}", what);
                    None
                }
            })
            .collect()
    }

    /// Pools of every reachable protocol, keyed by protocol id
    pub async fn get_all_pools(&self) -> BTreeMap<String, Vec<Pool>> {
        let pools = self.fan_out("pool listing", |adapter| adapter.get_pools()).await;
        info!(
            protocols = pools.len(),
            pools = pools.values().map(Vec::len).sum::<usize>(),
            "Collected pools"
        );
        pools
    }

    /// Per-pool TVL of every reachable protocol
    pub async fn get_all_tvl(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.fan_out("TVL collection", |adapter| adapter.get_tvl(None)).await
    }

    /// protocol id -> pool id -> series
    pub async fn get_all_historical_data(&self, days: u32) -> BTreeMap<String, BTreeMap<String, Vec<HistoricalPoint>>> {
        self.fan_out("history collection", |adapter| async move {
            let pools = adapter.get_pools().await?;
            let mut series = BTreeMap::new();
            for pool in pools {
                match adapter.get_historical_data(&pool.id, days).await {
                    Ok(history) => {
                        series.insert(pool.id, history);
                    }
                    Err(e) => {
                        warn!(protocol = adapter.protocol_id(), pool_id = %pool.id, error = %e, "Skipping pool history");
                    }
                }
            }
            Ok::<_, AdapterError>(series)
        })
        .await
    }

    /// Aggregates for one protocol, or all of them when `protocol_id` is `None` or "all"
    pub async fn get_protocol_stats(
        &self,
        protocol_id: Option<&str>,
    ) -> Result<BTreeMap<String, ProtocolStats>, AppError> {
        let selected: Vec<(&String, &Arc<dyn ProtocolAdapter>)> = match protocol_id {
            None | Some("all") => self.adapters.iter().collect(),
            Some(id) => {
                let (key, adapter) = self
                    .adapters
                    .get_key_value(id)
                    .ok_or_else(|| AppError::UnknownProtocol(id.to_string()))?;
                vec![(key, adapter)]
            }
        };

        let calls = selected.into_iter().map(|(id, adapter)| async move {
            let stats = match adapter.get_pools().await {
                Ok(pools) => protocol_stats(id, pools),
                Err(e) => {
                    warn!(protocol = %id, error = %e, "Protocol stats unavailable");
                    ProtocolStats {
                        name: id.clone(),
                        total_tvl: 0.0,
                        average_apy: 0.0,
                        average_risk_score: 0.0,
                        pool_count: 0,
                        pools: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            (id.clone(), stats)
        });

        Ok(join_all(calls).await.into_iter().collect())
    }
}

impl Default for MarketDataCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn protocol_stats(protocol_id: &str, pools: Vec<Pool>) -> ProtocolStats {
    let apys: Vec<f64> = pools.iter().map(|p| p.apy).collect();
    let risks: Vec<f64> = pools.iter().map(|p| p.risk_score).collect();
    ProtocolStats {
        name: protocol_id.to_string(),
        total_tvl: pools.iter().map(|p| p.tvl).sum(),
        average_apy: round_to(mean(&apys).unwrap_or(0.0), 2),
        average_risk_score: round_to(mean(&risks).unwrap_or(0.0), 2),
        pool_count: pools.len(),
        pools,
        error: None,
    }
}
