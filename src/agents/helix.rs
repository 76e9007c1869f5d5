use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::scoring::{self, NEUTRAL_POOL_RISK, VOLATILITY_WINDOW_DAYS};
use super::traits::{lookup_correlation, ProtocolAgent};
use crate::adapters::{HelixAdapter, ProtocolAdapter};
use crate::config::ProtocolConfig;
use crate::error::AdapterError;
use crate::models::{
    HistoricalPerformance, OpportunityAnalysis, OpportunityGroups, PerformanceBreakdown, Pool, ProtocolKind,
    ProtocolSummary, RecommendationSet, RiskAssessment, RiskCeilings, RiskProfile,
};
use crate::utils::math::{clamp_risk, round_to, tvl_size_factor};

pub const HELIX_CEILINGS: RiskCeilings = RiskCeilings::new(4.0, 6.0, 8.0);
pub const HELIX_DEFAULT_OVERALL_RISK: f64 = 5.0;
const HELIX_CORRELATIONS: [(&str, f64); 2] = [("hydro", 0.6), ("neptune", 0.4)];

/// Weights of the Helix overall risk, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixAssessmentWeights {
    pub protocol: f64,
    pub pools: f64,
    pub tvl: f64,
    pub compositional: f64,
}

impl Default for HelixAssessmentWeights {
    fn default() -> Self {
        HelixAssessmentWeights {
            protocol: 0.3,
            pools: 0.3,
            tvl: 0.2,
            compositional: 0.2,
        }
    }
}

/// Stablecoin-only pairs lower the score: `8 - stable_ratio * 5`, 5.0 without pools
pub fn compositional_risk(pools: &[Pool]) -> f64 {
    if pools.is_empty() {
        return NEUTRAL_POOL_RISK;
    }
    let stable = pools.iter().filter(|p| p.pair.len() == 2 && p.has_stablecoin_pair()).count();
    8.0 - stable as f64 / pools.len() as f64 * 5.0
}

pub struct HelixAgent {
    adapter: Arc<dyn ProtocolAdapter>,
    weights: HelixAssessmentWeights,
}

impl HelixAgent {
    pub fn new(adapter: Arc<dyn ProtocolAdapter>) -> Self {
        HelixAgent {
            adapter,
            weights: HelixAssessmentWeights::default(),
        }
    }

    pub fn from_config(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Ok(Self::new(Arc::new(HelixAdapter::new(config)?)))
    }

    pub fn with_weights(mut self, weights: HelixAssessmentWeights) -> Self {
        self.weights = weights;
        self
    }

    fn summary(&self, name: String, pools: &[Pool]) -> ProtocolSummary {
        ProtocolSummary {
            id: self.protocol_id().to_string(),
            name,
            total_tvl: scoring::total_tvl(pools),
            pool_count: pools.len(),
        }
    }

    async fn protocol_name(&self) -> String {
        match self.adapter.get_protocol_info().await {
            Ok(info) => info.name,
            Err(e) => {
                tracing::warn!(protocol = "helix", error = %e, "Protocol info unavailable");
                "Helix".to_string()
            }
        }
    }

    async fn try_analyze(&self) -> Result<OpportunityAnalysis, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let histories = scoring::collect_histories(self.adapter.as_ref(), &pools, VOLATILITY_WINDOW_DAYS).await;

        let mut opportunities: Vec<_> = pools
            .iter()
            .cloned()
            .map(|pool| {
                let history = histories.get(&pool.id);
                scoring::plain_opportunity(pool, history)
            })
            .collect();
        scoring::sort_by_ranking(&mut opportunities);

        let name = self.protocol_name().await;
        Ok(OpportunityAnalysis {
            protocol: self.summary(name, &pools),
            top_opportunity: opportunities.first().cloned(),
            opportunities,
            groups: OpportunityGroups::None,
            analysis_timestamp: Utc::now(),
            error: None,
        })
    }

    async fn try_assess(&self) -> Result<RiskAssessment, AdapterError> {
        let protocol_risk = self.adapter.estimate_protocol_risk().await;
        let pools = self.adapter.get_pools().await?;

        let average_pool_risk = scoring::average_risk(&pools, NEUTRAL_POOL_RISK);
        let tvl_risk = tvl_size_factor(scoring::total_tvl(&pools));
        let compositional_risk = compositional_risk(&pools);

        let w = &self.weights;
        let overall = protocol_risk * w.protocol
            + average_pool_risk * w.pools
            + tvl_risk * w.tvl
            + compositional_risk * w.compositional;

        Ok(RiskAssessment {
            protocol_id: self.protocol_id().to_string(),
            overall_risk: round_to(clamp_risk(overall), 1),
            protocol_risk,
            average_pool_risk: round_to(average_pool_risk, 1),
            tvl_risk: round_to(tvl_risk, 1),
            factors: BTreeMap::from([("compositional_risk".to_string(), round_to(compositional_risk, 1))]),
            assessment_timestamp: Utc::now(),
            error: None,
        })
    }

    async fn try_history(&self, days: u32) -> Result<HistoricalPerformance, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let histories = scoring::collect_histories(self.adapter.as_ref(), &pools, days).await;

        Ok(HistoricalPerformance {
            protocol_id: self.protocol_id().to_string(),
            days,
            protocol_metrics: scoring::daily_metrics(&histories, days),
            pools: histories,
            breakdown: PerformanceBreakdown::None,
            timestamp: Utc::now(),
            error: None,
        })
    }
}

#[async_trait]
impl ProtocolAgent for HelixAgent {
    fn protocol_id(&self) -> &'static str {
        ProtocolKind::Helix.id()
    }

    async fn analyze_opportunities(&self) -> OpportunityAnalysis {
        match self.try_analyze().await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(protocol = "helix", error = %e, "Opportunity analysis failed");
                OpportunityAnalysis::failed(self.summary("Helix".to_string(), &[]), e)
            }
        }
    }

    async fn get_risk_assessment(&self) -> RiskAssessment {
        match self.try_assess().await {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::error!(protocol = "helix", error = %e, "Risk assessment failed");
                RiskAssessment::degraded(self.protocol_id(), HELIX_DEFAULT_OVERALL_RISK, e)
            }
        }
    }

    async fn get_recommended_pools(&self, profile: RiskProfile) -> RecommendationSet {
        let risk_ceiling = HELIX_CEILINGS.ceiling(profile);
        let analysis = self.analyze_opportunities().await;

        let mut eligible: Vec<_> = analysis
            .opportunities
            .iter()
            .filter(|o| o.pool.risk_score <= risk_ceiling)
            .cloned()
            .collect();
        match profile {
            RiskProfile::Conservative => eligible.sort_by(scoring::by_risk_then_apy),
            RiskProfile::Aggressive => eligible.sort_by(scoring::by_apy),
            RiskProfile::Moderate => eligible.sort_by(scoring::by_risk_adjusted_return),
        }

        let recommendations = scoring::select_recommendations(&analysis.opportunities, eligible, |o| match profile {
            RiskProfile::Conservative => format!("Low risk option with {}% APY", o.pool.apy),
            RiskProfile::Aggressive => "High yield option with strong returns".to_string(),
            RiskProfile::Moderate => "Balanced risk-reward profile".to_string(),
        });

        tracing::info!(
            protocol = "helix",
            profile = %profile,
            count = recommendations.len(),
            "Selected recommendations"
        );

        RecommendationSet {
            protocol_id: self.protocol_id().to_string(),
            risk_profile: profile,
            risk_ceiling,
            recommendations,
            error: analysis.error,
        }
    }

    fn estimate_correlation(&self, other_protocol_id: &str) -> f64 {
        lookup_correlation(self.protocol_id(), &HELIX_CORRELATIONS, other_protocol_id)
    }

    async fn get_historical_performance(&self, days: u32) -> HistoricalPerformance {
        match self.try_history(days).await {
            Ok(performance) => performance,
            Err(e) => {
                tracing::error!(protocol = "helix", error = %e, "Historical performance failed");
                HistoricalPerformance::failed(self.protocol_id(), days, e)
            }
        }
    }
}
