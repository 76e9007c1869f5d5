use serde_json::Value;
use std::sync::Arc;

use super::http::{EndpointClient, HttpEndpointClient};
use super::normalize;
use crate::config::ProtocolConfig;
use crate::data::{synthesize_history, PoolDataProvider, SeriesProfile, MAX_HISTORY_DAYS};
use crate::error::AdapterError;
use crate::models::{HistoricalPoint, Pool, ProtocolKind};
use crate::utils::time::history_window;

/// Fallback chain shared by every protocol adapter.
///
/// Tiers are tried in order and the first success wins:
/// live endpoint (only outside mock mode), then the provider catalog, then,
/// for history only, a synthetic series seeded from the pool id.
pub struct AdapterCore {
    protocol: ProtocolKind,
    config: ProtocolConfig,
    provider: PoolDataProvider,
    client: Arc<dyn EndpointClient>,
}

impl AdapterCore {
    pub fn new(config: ProtocolConfig, provider: PoolDataProvider, client: Arc<dyn EndpointClient>) -> Self {
        AdapterCore {
            protocol: provider.protocol(),
            config,
            provider,
            client,
        }
    }

    /// Core talking HTTP to `config.api_url`
    pub fn from_config(config: ProtocolConfig, provider: PoolDataProvider) -> Result<Self, AdapterError> {
        let client = Arc::new(HttpEndpointClient::new(&config)?);
        Ok(Self::new(config, provider, client))
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn provider(&self) -> &PoolDataProvider {
        &self.provider
    }

    pub fn mock_mode(&self) -> bool {
        self.config.enable_mock_data
    }

    /// Live request, refused outright in mock mode
    pub async fn fetch_live(&self, path: &str, params: &[(&str, String)]) -> Result<Value, AdapterError> {
        if self.mock_mode() {
            return Err(AdapterError::Unsupported(format!(
                "{} live endpoint disabled in mock mode",
                self.protocol
            )));
        }
        self.client.fetch(path, params).await
    }

    pub async fn pools(&self) -> Vec<Pool> {
        if !self.mock_mode() {
            let live = self
                .fetch_live("pools", &[])
                .await
                .and_then(|body| normalize::parse_pools(self.protocol, &body));
            match live {
                Ok(pools) => {
                    tracing::debug!(protocol = %self.protocol, pool_count = pools.len(), "Fetched live pools");
                    return pools;
                }
                Err(e) => {
                    tracing::warn!(protocol = %self.protocol, error = %e, "Live pool listing failed, serving catalog");
                }
            }
        }
        self.provider.get_pools()
    }

    async fn live_pool_details(&self, pool_id: &str) -> Result<Pool, AdapterError> {
        let body = self.fetch_live(&format!("pools/{}", pool_id), &[]).await?;
        normalize::parse_pool_details(self.protocol, &body)
    }

    pub async fn pool_details(&self, pool_id: &str) -> Result<Pool, AdapterError> {
        if !self.mock_mode() {
            match self.live_pool_details(pool_id).await {
                Ok(pool) => return Ok(pool),
                Err(e) => {
                    tracing::warn!(
                        protocol = %self.protocol,
                        pool_id = %pool_id,
                        error = %e,
                        "Live pool lookup failed, checking catalog"
                    );
                }
            }
        }

        self.provider
            .get_pools()
            .into_iter()
            .find(|pool| pool.id == pool_id)
            .map(|pool| normalize::with_detail_defaults(self.protocol, pool))
            .ok_or_else(|| AdapterError::NotFound(pool_id.to_string()))
    }

    async fn live_history(&self, pool_id: &str, days: u32) -> Result<Vec<HistoricalPoint>, AdapterError> {
        let (start_date, end_date) = history_window(days);
        let body = self
            .fetch_live(
                &format!("pools/{}/history", pool_id),
                &[("start_date", start_date), ("end_date", end_date)],
            )
            .await?;

        let mut series = normalize::parse_history(&body)?;
        if series.len() < days as usize {
            return Err(AdapterError::InvalidData(format!(
                "History for {} has {} points, expected {}",
                pool_id,
                series.len(),
                days
            )));
        }
        series.sort_by(|a, b| b.date.cmp(&a.date));
        series.truncate(days as usize);
        Ok(series)
    }

    /// Always `days` points (at most [`MAX_HISTORY_DAYS`]): live, then catalog, then synthetic
    pub async fn history(&self, pool_id: &str, days: u32) -> Vec<HistoricalPoint> {
        let days = days.min(MAX_HISTORY_DAYS);
        if !self.mock_mode() {
            match self.live_history(pool_id, days).await {
                Ok(series) => return series,
                Err(e) => {
                    tracing::warn!(
                        protocol = %self.protocol,
                        pool_id = %pool_id,
                        error = %e,
                        "Live history unavailable, using catalog"
                    );
                }
            }
        }

        if let Some(series) = self.provider.get_pool_history(pool_id, days) {
            return series;
        }

        let baseline = if self.mock_mode() {
            None
        } else {
            self.live_pool_details(pool_id).await.ok()
        };
        tracing::warn!(
            protocol = %self.protocol,
            pool_id = %pool_id,
            has_baseline = baseline.is_some(),
            "No stored history, synthesizing series"
        );
        synthesize_history(pool_id, &fallback_profile(self.protocol, pool_id, baseline.as_ref()), days)
    }

    /// Raw `info` document, `None` in mock mode or on failure
    pub async fn live_info(&self) -> Option<Value> {
        if self.mock_mode() {
            return None;
        }
        match self.fetch_live("info", &[]).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(protocol = %self.protocol, error = %e, "Protocol info endpoint failed");
                None
            }
        }
    }

    pub async fn is_available(&self) -> bool {
        self.mock_mode() || self.fetch_live("info", &[]).await.is_ok()
    }
}

fn looks_like_stable_pair(pool_id: &str) -> bool {
    let id = pool_id.to_ascii_lowercase();
    id.contains("usdc_usdt") || id.contains("usdc_dai")
}

/// Series shape for pools with no stored history.
///
/// Uses the pool's own APY/TVL when a baseline is known, protocol defaults otherwise.
pub fn fallback_profile(protocol: ProtocolKind, pool_id: &str, baseline: Option<&Pool>) -> SeriesProfile {
    let (default_apy, default_tvl, apy_noise, tvl_noise) = match protocol {
        ProtocolKind::Helix => (10.0, 1_000_000.0, 0.05, 0.025),
        ProtocolKind::Hydro => {
            let stable = looks_like_stable_pair(pool_id) || baseline.map(Pool::is_stable_pool).unwrap_or(false);
            if stable {
                (8.0, 3_000_000.0, 0.03, 0.02)
            } else {
                (25.0, 3_000_000.0, 0.06, 0.02)
            }
        }
        ProtocolKind::Neptune => (15.0, 800_000.0, 0.075, 0.03),
    };

    SeriesProfile {
        base_apy: baseline.map(|p| p.apy).filter(|apy| *apy > 0.0).unwrap_or(default_apy),
        base_tvl: baseline.map(|p| p.tvl).filter(|tvl| *tvl > 0.0).unwrap_or(default_tvl),
        apy_noise,
        apy_trend: 0.0,
        tvl_noise,
        tvl_trend: 0.0,
        volume_range: protocol.volume_fraction_range(),
    }
}
