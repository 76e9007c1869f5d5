use async_trait::async_trait;
use std::sync::Arc;

use defi_yield_advisor::{
    adapters::{HelixAdapter, HydroAdapter, ProtocolAdapter},
    config::{ProtocolConfig, Settings},
    models::{HistoricalPoint, Pool, ProtocolInfo, ProtocolKind},
    services::MarketDataCollector,
    AdapterError, AppError,
};

/// Adapter whose endpoint is permanently down
struct UnreachableAdapter;

#[async_trait]
impl ProtocolAdapter for UnreachableAdapter {
    fn protocol(&self) -> ProtocolKind {
        ProtocolKind::Neptune
    }

    async fn get_pools(&self) -> Result<Vec<Pool>, AdapterError> {
        Err(AdapterError::Transport("connection refused".to_string()))
    }

    async fn get_pool_details(&self, pool_id: &str) -> Result<Pool, AdapterError> {
        Err(AdapterError::NotFound(pool_id.to_string()))
    }

    async fn get_historical_data(&self, _pool_id: &str, _days: u32) -> Result<Vec<HistoricalPoint>, AdapterError> {
        Err(AdapterError::Transport("connection refused".to_string()))
    }

    async fn get_protocol_info(&self) -> Result<ProtocolInfo, AdapterError> {
        Err(AdapterError::Transport("connection refused".to_string()))
    }

    async fn estimate_protocol_risk(&self) -> f64 {
        6.0
    }

    async fn is_available(&self) -> bool {
        false
    }
}

fn collector_with_outage() -> MarketDataCollector {
    let mut collector = MarketDataCollector::new();
    collector.register(Arc::new(HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap()));
    collector.register(Arc::new(HydroAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Hydro)).unwrap()));
    collector.register(Arc::new(UnreachableAdapter));
    collector
}

#[tokio::test]
async fn test_failing_protocol_is_left_out_of_tvl() {
    let collector = collector_with_outage();
    assert_eq!(collector.protocol_ids(), vec!["helix", "hydro", "neptune"]);

    let tvl = collector.get_all_tvl().await;
    assert_eq!(tvl.len(), 2);
    assert!(!tvl.contains_key("neptune"));
    assert_eq!(tvl["hydro"].len(), 3);
    assert!(tvl["helix"].values().all(|v| *v > 0.0));
}

#[tokio::test]
async fn test_failing_protocol_is_left_out_of_pools_and_history() {
    let collector = collector_with_outage();

    let pools = collector.get_all_pools().await;
    assert_eq!(pools.keys().collect::<Vec<_>>(), vec!["helix", "hydro"]);

    let history = collector.get_all_historical_data(3).await;
    assert_eq!(history.len(), 2);
    assert!(history["helix"].values().all(|series| series.len() == 3));
}

#[tokio::test]
async fn test_stats_report_failure_per_protocol() {
    let collector = collector_with_outage();

    let stats = collector.get_protocol_stats(Some("all")).await.unwrap();
    assert_eq!(stats.len(), 3);
    assert!(stats["helix"].error.is_none());
    assert_eq!(stats["helix"].pool_count, 3);

    let neptune = &stats["neptune"];
    assert_eq!(neptune.pool_count, 0);
    assert_eq!(neptune.total_tvl, 0.0);
    assert!(neptune.error.as_deref().unwrap_or_default().contains("connection refused"));
}

#[tokio::test]
async fn test_stats_for_unregistered_protocol() {
    let collector = MarketDataCollector::new();
    let result = collector.get_protocol_stats(Some("helix")).await;
    assert!(matches!(result, Err(AppError::UnknownProtocol(_))));

    let empty = collector.get_protocol_stats(None).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_register_replaces_existing_adapter() {
    let mut collector = collector_with_outage();
    collector.register(Arc::new(HelixAdapter::new(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap()));
    assert_eq!(collector.protocol_ids().len(), 3);
    assert!(collector.adapter("helix").is_some());
    assert!(collector.adapter("osmosis").is_none());
}

#[tokio::test]
async fn test_malformed_api_urls_still_serve_catalog() {
    let mut settings = Settings::default();
    settings.hydro.api_url = "hydro.injective.network/api".to_string();
    settings.helix.api_url = String::new();
    settings.helix.enable_mock_data = false;

    let collector = MarketDataCollector::with_default_adapters(&settings).unwrap();
    let pools = collector.get_all_pools().await;

    assert_eq!(pools.len(), 3);
    assert_eq!(pools["helix"].len(), 3);
    assert_eq!(pools["hydro"].len(), 3);
    assert_eq!(pools["neptune"].len(), 2);

    let helix = collector.adapter("helix").unwrap();
    assert!(!helix.is_available().await);
    assert_eq!(helix.get_historical_data("helix_usdc_inj", 5).await.unwrap().len(), 5);
}
