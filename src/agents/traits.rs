use async_trait::async_trait;

use super::health;
use crate::models::{HistoricalPerformance, OpportunityAnalysis, ProtocolHealth, RecommendationSet, RiskAssessment, RiskProfile};

/// Decision support over one protocol's normalized data.
///
/// Methods never fail: a computation that cannot complete returns a
/// structurally valid report with its `error` field set.
#[async_trait]
pub trait ProtocolAgent: Send + Sync {
    fn protocol_id(&self) -> &'static str;

    /// Every pool ranked by the protocol's adjusted risk-return metric
    async fn analyze_opportunities(&self) -> OpportunityAnalysis;

    async fn get_risk_assessment(&self) -> RiskAssessment;

    /// At most three pools suited to `profile`
    async fn get_recommended_pools(&self, profile: RiskProfile) -> RecommendationSet;

    /// Fixed lookup coefficient in `[-1, 1]`, 0.5 for unknown protocols
    fn estimate_correlation(&self, other_protocol_id: &str) -> f64;

    async fn get_historical_performance(&self, days: u32) -> HistoricalPerformance;

    async fn get_protocol_health(&self) -> ProtocolHealth {
        health::protocol_health(self).await
    }
}

/// Shared lookup behind `estimate_correlation`
pub fn lookup_correlation(own_id: &str, table: &[(&str, f64)], other_protocol_id: &str) -> f64 {
    let other = other_protocol_id.trim().to_ascii_lowercase();
    if other == own_id {
        return 1.0;
    }
    table
        .iter()
        .find(|(id, _)| *id == other)
        .map(|(_, coefficient)| *coefficient)
        .unwrap_or(DEFAULT_CORRELATION)
}

pub const DEFAULT_CORRELATION: f64 = 0.5;
