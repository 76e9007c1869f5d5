use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::scoring::{self, VOLATILITY_WINDOW_DAYS};
use super::traits::{lookup_correlation, ProtocolAgent};
use crate::adapters::hydro::STABLE_AMPLIFICATION;
use crate::adapters::{HydroAdapter, StablePoolAdapter};
use crate::config::ProtocolConfig;
use crate::error::AdapterError;
use crate::models::{
    Adjustment, HistoricalPerformance, HistoricalPoint, Opportunity, OpportunityAnalysis, OpportunityGroups,
    PerformanceBreakdown, Pool, ProtocolKind, ProtocolSummary, RecommendationSet, RiskAssessment, RiskCeilings, RiskProfile,
    SegmentMetrics, StablePoolEfficiency, StablePoolEfficiencyReport,
};
use crate::utils::math::{clamp_risk, mean, round_to, tvl_size_factor};

pub const HYDRO_CEILINGS: RiskCeilings = RiskCeilings::new(3.5, 5.0, 7.0);
pub const HYDRO_DEFAULT_OVERALL_RISK: f64 = 4.0;
pub const STABILITY_BONUS: f64 = 0.5;
/// Conservative picks are topped up with weighted pools until there are this many
pub const MIN_CONSERVATIVE_PICKS: usize = 2;
const HYDRO_CORRELATIONS: [(&str, f64); 2] = [("helix", 0.6), ("neptune", 0.4)];

const DEFAULT_STABLE_RISK: f64 = 3.0;
const DEFAULT_WEIGHTED_RISK: f64 = 5.0;
const ASSUMED_SLIPPAGE: f64 = 0.0001;
const ASSUMED_PRICE_STABILITY: f64 = 0.9995;

/// Weights of the Hydro overall risk, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydroAssessmentWeights {
    pub protocol: f64,
    pub pools: f64,
    pub tvl: f64,
    pub stablecoin: f64,
}

impl Default for HydroAssessmentWeights {
    fn default() -> Self {
        HydroAssessmentWeights {
            protocol: 0.25,
            pools: 0.25,
            tvl: 0.25,
            stablecoin: 0.25,
        }
    }
}

/// `((1 - slippage) * 0.4 + price_stability * 0.4 + min(1, tvl / 1M) * 0.2) * 10`
pub fn stable_efficiency_score(slippage: f64, price_stability: f64, tvl: f64) -> f64 {
    let depth = (tvl / 1_000_000.0).min(1.0);
    round_to(((1.0 - slippage) * 0.4 + price_stability * 0.4 + depth * 0.2) * 10.0, 2)
}

/// Stable pools first, then lower risk, then higher APY
fn stable_first(a: &Opportunity, b: &Opportunity) -> std::cmp::Ordering {
    b.is_stable_pool()
        .cmp(&a.is_stable_pool())
        .then_with(|| scoring::by_risk_then_apy(a, b))
}

pub struct HydroAgent {
    adapter: Arc<dyn StablePoolAdapter>,
    weights: HydroAssessmentWeights,
}

impl HydroAgent {
    pub fn new(adapter: Arc<dyn StablePoolAdapter>) -> Self {
        HydroAgent {
            adapter,
            weights: HydroAssessmentWeights::default(),
        }
    }

    pub fn from_config(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Ok(Self::new(Arc::new(HydroAdapter::new(config)?)))
    }

    pub fn with_weights(mut self, weights: HydroAssessmentWeights) -> Self {
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

    async fn try_analyze(&self) -> Result<OpportunityAnalysis, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let histories = scoring::collect_histories(self.adapter.as_ref(), &pools, VOLATILITY_WINDOW_DAYS).await;

        let mut opportunities: Vec<Opportunity> = pools
            .iter()
            .cloned()
            .map(|pool| {
                let is_stable_pool = pool.is_stable_pool();
                let stability_bonus = if is_stable_pool { STABILITY_BONUS } else { 0.0 };
                let history = histories.get(&pool.id);
                let mut opportunity = scoring::plain_opportunity(pool, history);
                opportunity.ranking_score = opportunity.risk_adjusted_return + stability_bonus;
                opportunity.adjustment = Adjustment::Stability {
                    is_stable_pool,
                    stability_bonus,
                };
                opportunity
            })
            .collect();
        scoring::sort_by_ranking(&mut opportunities);

        let (stable_pools, weighted_pools): (Vec<_>, Vec<_>) =
            opportunities.iter().cloned().partition(Opportunity::is_stable_pool);

        let name = match self.adapter.get_protocol_info().await {
            Ok(info) => info.name,
            Err(e) => {
                tracing::warn!(protocol = "hydro", error = %e, "Protocol info unavailable");
                "Hydro Protocol".to_string()
            }
        };

        Ok(OpportunityAnalysis {
            protocol: self.summary(name, &pools),
            top_opportunity: opportunities.first().cloned(),
            groups: OpportunityGroups::PoolType {
                top_stable: stable_pools.first().cloned(),
                stable_pools,
                weighted_pools,
            },
            opportunities,
            analysis_timestamp: Utc::now(),
            error: None,
        })
    }

    async fn try_assess(&self) -> Result<RiskAssessment, AdapterError> {
        let protocol_risk = self.adapter.estimate_protocol_risk().await;
        let pools = self.adapter.get_pools().await?;
        let (stable, weighted): (Vec<Pool>, Vec<Pool>) = pools.iter().cloned().partition(Pool::is_stable_pool);

        let stable_risk = scoring::average_risk(&stable, DEFAULT_STABLE_RISK);
        let weighted_risk = scoring::average_risk(&weighted, DEFAULT_WEIGHTED_RISK);
        let stable_weight = if pools.is_empty() {
            0.5
        } else {
            stable.len() as f64 / pools.len() as f64
        };
        let average_pool_risk = stable_risk * stable_weight + weighted_risk * (1.0 - stable_weight);

        let total_tvl = scoring::total_tvl(&pools);
        let tvl_risk = tvl_size_factor(total_tvl);
        let stablecoin_ratio = if total_tvl > 0.0 {
            scoring::total_tvl(&stable) / total_tvl
        } else {
            0.5
        };
        let stablecoin_risk = 7.0 - stablecoin_ratio * 4.0;

        let w = &self.weights;
        let overall = protocol_risk * w.protocol
            + average_pool_risk * w.pools
            + tvl_risk * w.tvl
            + stablecoin_risk * w.stablecoin;

        Ok(RiskAssessment {
            protocol_id: self.protocol_id().to_string(),
            overall_risk: round_to(clamp_risk(overall), 1),
            protocol_risk,
            average_pool_risk: round_to(average_pool_risk, 1),
            tvl_risk: round_to(tvl_risk, 1),
            factors: BTreeMap::from([
                ("stable_pool_risk".to_string(), round_to(stable_risk, 1)),
                ("weighted_pool_risk".to_string(), round_to(weighted_risk, 1)),
                ("stablecoin_ratio".to_string(), round_to(stablecoin_ratio, 2)),
                ("stablecoin_risk".to_string(), round_to(stablecoin_risk, 1)),
            ]),
            assessment_timestamp: Utc::now(),
            error: None,
        })
    }

    fn eligible_for(profile: RiskProfile, ceiling: f64, analysis: &OpportunityAnalysis) -> Vec<Opportunity> {
        let within = |o: &&Opportunity| o.pool.risk_score <= ceiling;
        let (stable, weighted): (Vec<&Opportunity>, Vec<&Opportunity>) =
            analysis.opportunities.iter().partition(|o| o.is_stable_pool());

        match profile {
            RiskProfile::Conservative => {
                let mut eligible: Vec<Opportunity> = stable.into_iter().filter(within).cloned().collect();
                if eligible.len() < MIN_CONSERVATIVE_PICKS {
                    let missing = MIN_CONSERVATIVE_PICKS - eligible.len();
                    eligible.extend(weighted.into_iter().filter(within).take(missing).cloned());
                }
                eligible.sort_by(stable_first);
                eligible
            }
            RiskProfile::Aggressive => {
                let mut eligible: Vec<Opportunity> = weighted.into_iter().filter(within).cloned().collect();
                if eligible.is_empty() {
                    eligible = analysis.opportunities.iter().filter(within).cloned().collect();
                }
                eligible.sort_by(scoring::by_apy);
                eligible
            }
            RiskProfile::Moderate => {
                let mut eligible: Vec<Opportunity> = analysis.opportunities.iter().filter(within).cloned().collect();
                eligible.sort_by(scoring::by_risk_adjusted_return);
                eligible
            }
        }
    }

    async fn try_history(&self, days: u32) -> Result<HistoricalPerformance, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let histories = scoring::collect_histories(self.adapter.as_ref(), &pools, days).await;
        let stable_ids: BTreeSet<&str> = pools.iter().filter(|p| p.is_stable_pool()).map(|p| p.id.as_str()).collect();

        let mut stable_pool_metrics = Vec::new();
        let mut weighted_pool_metrics = Vec::new();
        for i in 0..scoring::aligned_days(&histories, days) {
            let mut stable_day = Vec::new();
            let mut weighted_day = Vec::new();
            for (pool_id, series) in &histories {
                if stable_ids.contains(pool_id.as_str()) {
                    stable_day.push(&series[i]);
                } else {
                    weighted_day.push(&series[i]);
                }
            }
            let date = histories.values().next().map(|s| s[i].date.clone()).unwrap_or_default();
            stable_pool_metrics.push(segment(&date, &stable_day));
            weighted_pool_metrics.push(segment(&date, &weighted_day));
        }

        Ok(HistoricalPerformance {
            protocol_id: self.protocol_id().to_string(),
            days,
            protocol_metrics: scoring::daily_metrics(&histories, days),
            pools: histories,
            breakdown: PerformanceBreakdown::PoolType {
                stable_pool_metrics,
                weighted_pool_metrics,
            },
            timestamp: Utc::now(),
            error: None,
        })
    }

    /// Efficiency of every stable pool, best first
    pub async fn analyze_stable_pool_efficiency(&self) -> StablePoolEfficiencyReport {
        match self.try_stable_efficiency().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(protocol = "hydro", error = %e, "Stable pool efficiency analysis failed");
                StablePoolEfficiencyReport {
                    protocol_id: self.protocol_id().to_string(),
                    stable_pool_count: 0,
                    total_stable_tvl: 0.0,
                    average_efficiency_score: 0.0,
                    top_pool: None,
                    pool_metrics: Vec::new(),
                    timestamp: Utc::now(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn try_stable_efficiency(&self) -> Result<StablePoolEfficiencyReport, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let stable: Vec<Pool> = pools.into_iter().filter(Pool::is_stable_pool).collect();

        let mut pool_metrics = Vec::with_capacity(stable.len());
        for pool in &stable {
            let parameters = self.adapter.get_pool_parameters(&pool.id).await?;
            pool_metrics.push(StablePoolEfficiency {
                pool_id: pool.id.clone(),
                name: pool.name.clone(),
                apy: pool.apy,
                tvl: pool.tvl,
                avg_slippage: ASSUMED_SLIPPAGE,
                price_stability: ASSUMED_PRICE_STABILITY,
                efficiency_score: stable_efficiency_score(ASSUMED_SLIPPAGE, ASSUMED_PRICE_STABILITY, pool.tvl),
                amplification_coefficient: parameters.amplification_coefficient.unwrap_or(STABLE_AMPLIFICATION),
            });
        }
        pool_metrics.sort_by(|a, b| scoring::descending(a.efficiency_score, b.efficiency_score));

        let scores: Vec<f64> = pool_metrics.iter().map(|p| p.efficiency_score).collect();
        Ok(StablePoolEfficiencyReport {
            protocol_id: self.protocol_id().to_string(),
            stable_pool_count: stable.len(),
            total_stable_tvl: pool_metrics.iter().map(|p| p.tvl).sum(),
            average_efficiency_score: round_to(mean(&scores).unwrap_or(0.0), 2),
            top_pool: pool_metrics.first().cloned(),
            pool_metrics,
            timestamp: Utc::now(),
            error: None,
        })
    }
}

fn segment(date: &str, points: &[&HistoricalPoint]) -> SegmentMetrics {
    let apys: Vec<f64> = points.iter().map(|p| p.apy).collect();
    SegmentMetrics {
        date: date.to_string(),
        total_tvl: points.iter().map(|p| p.tvl).sum(),
        avg_apy: mean(&apys).unwrap_or(0.0),
        count: points.len(),
    }
}

#[async_trait]
impl ProtocolAgent for HydroAgent {
    fn protocol_id(&self) -> &'static str {
        ProtocolKind::Hydro.id()
    }

    async fn analyze_opportunities(&self) -> OpportunityAnalysis {
        match self.try_analyze().await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(protocol = "hydro", error = %e, "Opportunity analysis failed");
                OpportunityAnalysis::failed(self.summary("Hydro Protocol".to_string(), &[]), e)
            }
        }
    }

    async fn get_risk_assessment(&self) -> RiskAssessment {
        match self.try_assess().await {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::error!(protocol = "hydro", error = %e, "Risk assessment failed");
                RiskAssessment::degraded(self.protocol_id(), HYDRO_DEFAULT_OVERALL_RISK, e)
            }
        }
    }

    async fn get_recommended_pools(&self, profile: RiskProfile) -> RecommendationSet {
        let risk_ceiling = HYDRO_CEILINGS.ceiling(profile);
        let analysis = self.analyze_opportunities().await;
        let eligible = Self::eligible_for(profile, risk_ceiling, &analysis);

        let recommendations = scoring::select_recommendations(&analysis.opportunities, eligible, |o| {
            match (profile, o.is_stable_pool()) {
                (RiskProfile::Conservative, true) => format!("Low risk stable pool with {}% APY", o.pool.apy),
                (RiskProfile::Conservative, false) => "Relatively safe weighted pool with good stability".to_string(),
                (RiskProfile::Aggressive, true) => "Stable pool providing reliable but modest returns".to_string(),
                (RiskProfile::Aggressive, false) => "Higher yield weighted pool with acceptable risk level".to_string(),
                (RiskProfile::Moderate, true) => "Stable pool with solid risk-adjusted returns".to_string(),
                (RiskProfile::Moderate, false) => "Balanced risk-reward profile in weighted pool".to_string(),
            }
        });

        tracing::info!(
            protocol = "hydro",
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
        lookup_correlation(self.protocol_id(), &HYDRO_CORRELATIONS, other_protocol_id)
    }

    async fn get_historical_performance(&self, days: u32) -> HistoricalPerformance {
        match self.try_history(days).await {
            Ok(performance) => performance,
            Err(e) => {
                tracing::error!(protocol = "hydro", error = %e, "Historical performance failed");
                HistoricalPerformance::failed(self.protocol_id(), days, e)
            }
        }
    }
}
