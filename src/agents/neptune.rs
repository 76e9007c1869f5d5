use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::scoring::{self, NEUTRAL_POOL_RISK, VOLATILITY_WINDOW_DAYS};
use super::traits::{lookup_correlation, ProtocolAgent};
use crate::adapters::{NeptuneAdapter, StrategyAdapter};
use crate::config::ProtocolConfig;
use crate::error::AdapterError;
use crate::models::{
    Adjustment, HistoricalPerformance, HistoricalPoint, Opportunity, OpportunityAnalysis, OpportunityGroups,
    PerformanceBreakdown, Pool, ProtocolKind, ProtocolSummary, RecommendationSet, RiskAssessment, RiskCeilings,
    RiskProfile, StrategyDetail, StrategyEfficiency, StrategyEfficiencyReport, StrategyPerformance,
    StrategyPerformancePoint, StrategyType, StrategyTypeEfficiency,
};
use crate::utils::math::{clamp_risk, mean, round_to, tvl_size_factor};

pub const NEPTUNE_CEILINGS: RiskCeilings = RiskCeilings::new(5.0, 6.5, 8.0);
pub const NEPTUNE_DEFAULT_OVERALL_RISK: f64 = 6.0;
pub const SMART_CONTRACT_RISK: f64 = 6.0;
pub const DEPENDENCY_RISK: f64 = 7.0;
const NEPTUNE_CORRELATIONS: [(&str, f64); 2] = [("helix", 0.5), ("hydro", 0.4)];
const UNKNOWN_STRATEGY: &str = "Unknown";
const EFFICIENCY_WINDOW_DAYS: u32 = 7;

/// Weights of the Neptune overall risk, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeptuneAssessmentWeights {
    pub protocol: f64,
    pub pools: f64,
    pub tvl: f64,
    pub strategy: f64,
    pub smart_contract: f64,
    pub dependency: f64,
}

impl Default for NeptuneAssessmentWeights {
    fn default() -> Self {
        NeptuneAssessmentWeights {
            protocol: 0.2,
            pools: 0.2,
            tvl: 0.1,
            strategy: 0.2,
            smart_contract: 0.15,
            dependency: 0.15,
        }
    }
}

/// Ranking divisor, 1.5 when the strategy is unknown
pub fn strategy_complexity(strategy_type: Option<StrategyType>) -> f64 {
    match strategy_type {
        Some(StrategyType::LpCompounding) => 1.0,
        Some(StrategyType::YieldOptimizer) => 1.5,
        Some(StrategyType::MultiProtocol) => 2.0,
        None => 1.5,
    }
}

/// Multiplier on pool risk, 1.3 when the strategy is unknown
pub fn strategy_risk_factor(strategy_type: Option<StrategyType>) -> f64 {
    match strategy_type {
        Some(StrategyType::LpCompounding) => 1.0,
        Some(StrategyType::YieldOptimizer) | None => 1.3,
        Some(StrategyType::MultiProtocol) => 1.5,
    }
}

/// Score for a harvest cadence label, 5.0 for anything slower or unrecognised
pub fn harvest_frequency_score(frequency: &str) -> f64 {
    match frequency {
        "1 hour" => 9.0,
        "4 hours" => 8.0,
        "6 hours" => 7.0,
        "12 hours" => 6.0,
        _ => 5.0,
    }
}

/// `avg_efficiency * 10 * 0.5 + harvest * 0.3 + max(1, 10 - fee / 2) * 0.2`
pub fn strategy_efficiency_score(avg_efficiency: f64, harvesting_frequency: &str, performance_fee: f64) -> f64 {
    let fee_impact = (10.0 - performance_fee / 2.0).max(1.0);
    round_to(
        avg_efficiency * 10.0 * 0.5 + harvest_frequency_score(harvesting_frequency) * 0.3 + fee_impact * 0.2,
        2,
    )
}

fn strategy_label(strategy_type: Option<StrategyType>) -> String {
    strategy_type.map(|s| s.as_str()).unwrap_or(UNKNOWN_STRATEGY).to_string()
}

pub struct NeptuneAgent {
    adapter: Arc<dyn StrategyAdapter>,
    weights: NeptuneAssessmentWeights,
}

impl NeptuneAgent {
    pub fn new(adapter: Arc<dyn StrategyAdapter>) -> Self {
        NeptuneAgent {
            adapter,
            weights: NeptuneAssessmentWeights::default(),
        }
    }

    pub fn from_config(config: ProtocolConfig) -> Result<Self, AdapterError> {
        Ok(Self::new(Arc::new(NeptuneAdapter::new(config)?)))
    }

    pub fn with_weights(mut self, weights: NeptuneAssessmentWeights) -> Self {
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

    /// Strategy of every pool whose lookup succeeds
    async fn collect_strategies(&self, pools: &[Pool]) -> BTreeMap<String, StrategyDetail> {
        let lookups = pools.iter().map(|pool| async move {
            (pool.id.clone(), self.adapter.get_strategy_details(&pool.id).await)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(pool_id, result)| match result {
                Ok(strategy) => Some((pool_id, strategy)),
                Err(e) => {
                    tracing::warn!(protocol = "neptune", pool_id = %pool_id, error = %e, "Strategy unavailable");
                    None
                }
            })
            .collect()
    }

    fn opportunity(pool: Pool, history: Option<&Vec<HistoricalPoint>>, strategy: Option<&StrategyDetail>) -> Opportunity {
        let strategy_type = strategy.map(|s| s.strategy_type);
        let complexity = strategy_complexity(strategy_type);
        let adjusted_risk = round_to(pool.risk_score * complexity, 2);

        let mut pool = pool;
        if strategy_type.is_some() {
            pool.strategy_type = strategy_type;
        }
        let mut opportunity = scoring::plain_opportunity(pool, history);
        opportunity.ranking_score = opportunity.risk_adjusted_return / complexity;
        opportunity.adjustment = Adjustment::Strategy {
            strategy_complexity: complexity,
            adjusted_risk,
            performance_fee: strategy.map(|s| s.performance_fee),
            harvesting_frequency: strategy.map(|s| s.harvesting_frequency.clone()),
            underlying_protocol: strategy.map(|s| s.underlying_protocol.clone()),
        };
        opportunity
    }

    async fn try_analyze(&self) -> Result<OpportunityAnalysis, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let histories = scoring::collect_histories(self.adapter.as_ref(), &pools, VOLATILITY_WINDOW_DAYS).await;
        let strategies = self.collect_strategies(&pools).await;

        let mut opportunities: Vec<Opportunity> = pools
            .iter()
            .cloned()
            .map(|pool| {
                let history = histories.get(&pool.id);
                let strategy = strategies.get(&pool.id);
                Self::opportunity(pool, history, strategy)
            })
            .collect();
        scoring::sort_by_ranking(&mut opportunities);

        let mut strategy_groups: BTreeMap<String, Vec<Opportunity>> = BTreeMap::new();
        for opportunity in &opportunities {
            strategy_groups
                .entry(strategy_label(opportunity.pool.strategy_type))
                .or_default()
                .push(opportunity.clone());
        }

        let name = match self.adapter.get_protocol_info().await {
            Ok(info) => info.name,
            Err(e) => {
                tracing::warn!(protocol = "neptune", error = %e, "Protocol info unavailable");
                "Neptune Finance".to_string()
            }
        };

        Ok(OpportunityAnalysis {
            protocol: self.summary(name, &pools),
            top_opportunity: opportunities.first().cloned(),
            opportunities,
            groups: OpportunityGroups::Strategy { strategy_groups },
            analysis_timestamp: Utc::now(),
            error: None,
        })
    }

    async fn try_assess(&self) -> Result<RiskAssessment, AdapterError> {
        let protocol_risk = self.adapter.estimate_protocol_risk().await;
        let pools = self.adapter.get_pools().await?;
        let strategies = self.collect_strategies(&pools).await;

        let strategy_risks: Vec<f64> = pools
            .iter()
            .map(|pool| strategy_risk_factor(strategies.get(&pool.id).map(|s| s.strategy_type)))
            .collect();
        let average_strategy_risk = mean(&strategy_risks).unwrap_or_else(|| strategy_risk_factor(None));

        let average_pool_risk = scoring::average_risk(&pools, NEUTRAL_POOL_RISK);
        let adjusted_pool_risk = average_pool_risk * average_strategy_risk;
        let tvl_risk = tvl_size_factor(scoring::total_tvl(&pools));

        let w = &self.weights;
        // strategy factor is scaled by 4 onto the 1-10 range
        let overall = protocol_risk * w.protocol
            + adjusted_pool_risk * w.pools
            + tvl_risk * w.tvl
            + average_strategy_risk * 4.0 * w.strategy
            + SMART_CONTRACT_RISK * w.smart_contract
            + DEPENDENCY_RISK * w.dependency;

        Ok(RiskAssessment {
            protocol_id: self.protocol_id().to_string(),
            overall_risk: round_to(clamp_risk(overall), 1),
            protocol_risk,
            average_pool_risk: round_to(average_pool_risk, 1),
            tvl_risk: round_to(tvl_risk, 1),
            factors: BTreeMap::from([
                ("adjusted_pool_risk".to_string(), round_to(adjusted_pool_risk, 1)),
                ("average_strategy_risk".to_string(), round_to(average_strategy_risk, 2)),
                ("smart_contract_risk".to_string(), SMART_CONTRACT_RISK),
                ("dependency_risk".to_string(), DEPENDENCY_RISK),
            ]),
            assessment_timestamp: Utc::now(),
            error: None,
        })
    }

    fn eligible_for(profile: RiskProfile, ceiling: f64, opportunities: &[Opportunity]) -> Vec<Opportunity> {
        let mut eligible: Vec<Opportunity> = opportunities
            .iter()
            .filter(|o| o.adjusted_risk() <= ceiling)
            .cloned()
            .collect();
        // complexity pricing can be too strict, fall back to the raw score
        if eligible.len() < 2 {
            eligible = opportunities
                .iter()
                .filter(|o| o.pool.risk_score <= ceiling)
                .cloned()
                .collect();
        }

        match profile {
            RiskProfile::Conservative => eligible.sort_by(|a, b| {
                a.strategy_complexity()
                    .total_cmp(&b.strategy_complexity())
                    .then_with(|| a.apy_volatility.total_cmp(&b.apy_volatility))
                    .then_with(|| scoring::descending(a.pool.apy, b.pool.apy))
            }),
            RiskProfile::Aggressive => eligible.sort_by(scoring::by_apy),
            RiskProfile::Moderate => eligible.sort_by(|a, b| {
                scoring::by_risk_adjusted_return(a, b)
                    .then_with(|| a.strategy_complexity().total_cmp(&b.strategy_complexity()))
            }),
        }
        eligible
    }

    /// Performance series per pool, plain history when the harvest series fails
    async fn collect_performance(
        &self,
        pools: &[Pool],
        days: u32,
    ) -> (BTreeMap<String, Vec<HistoricalPoint>>, BTreeMap<String, Vec<StrategyPerformancePoint>>) {
        let mut histories = BTreeMap::new();
        let mut performance = BTreeMap::new();

        for pool in pools {
            match self.adapter.get_performance_history(&pool.id, days).await {
                Ok(series) => {
                    histories.insert(pool.id.clone(), series.iter().map(|p| p.point.clone()).collect());
                    performance.insert(pool.id.clone(), series);
                }
                Err(e) => {
                    tracing::warn!(
                        protocol = "neptune",
                        pool_id = %pool.id,
                        error = %e,
                        "Performance history unavailable, using plain history"
                    );
                    match self.adapter.get_historical_data(&pool.id, days).await {
                        Ok(series) => {
                            histories.insert(pool.id.clone(), series);
                        }
                        Err(e) => {
                            tracing::error!(protocol = "neptune", pool_id = %pool.id, error = %e, "History unavailable");
                        }
                    }
                }
            }
        }
        (histories, performance)
    }

    async fn try_history(&self, days: u32) -> Result<HistoricalPerformance, AdapterError> {
        let pools = self.adapter.get_pools().await?;
        let (histories, performance) = self.collect_performance(&pools, days).await;
        let strategies = self.collect_strategies(&pools).await;

        let mut protocol_metrics = scoring::daily_metrics(&histories, days);
        for (i, day) in protocol_metrics.iter_mut().enumerate() {
            let harvest_points: Vec<&StrategyPerformancePoint> =
                performance.values().filter_map(|series| series.get(i)).collect();
            day.harvests = Some(harvest_points.iter().map(|p| p.harvests).sum());
            day.fees_collected = Some(round_to(harvest_points.iter().map(|p| p.fees_collected).sum(), 2));
        }

        let mut strategy_performance: BTreeMap<String, StrategyPerformance> = BTreeMap::new();
        for (pool_id, strategy) in &strategies {
            let Some(pool) = pools.iter().find(|p| &p.id == pool_id) else {
                continue;
            };
            let entry = strategy_performance
                .entry(strategy.strategy_type.as_str().to_string())
                .or_insert_with(|| StrategyPerformance {
                    pool_ids: Vec::new(),
                    total_tvl: 0.0,
                    avg_apy: 0.0,
                });
            entry.pool_ids.push(pool.id.clone());
            entry.total_tvl += pool.tvl;
        }
        for group in strategy_performance.values_mut() {
            let apys: Vec<f64> = pools
                .iter()
                .filter(|p| group.pool_ids.contains(&p.id))
                .map(|p| p.apy)
                .collect();
            group.avg_apy = mean(&apys).unwrap_or(0.0);
        }

        Ok(HistoricalPerformance {
            protocol_id: self.protocol_id().to_string(),
            days,
            pools: histories,
            protocol_metrics,
            breakdown: PerformanceBreakdown::Strategy {
                performance,
                strategies,
                strategy_performance,
            },
            timestamp: Utc::now(),
            error: None,
        })
    }

    /// How efficiently each vault harvests and compounds, best first
    pub async fn analyze_strategy_efficiency(&self) -> StrategyEfficiencyReport {
        let pools = match self.adapter.get_pools().await {
            Ok(pools) => pools,
            Err(e) => {
                tracing::error!(protocol = "neptune", error = %e, "Strategy efficiency analysis failed");
                return StrategyEfficiencyReport {
                    protocol_id: self.protocol_id().to_string(),
                    strategy_count: 0,
                    average_efficiency_score: 0.0,
                    top_strategy: None,
                    strategy_efficiencies: Vec::new(),
                    strategy_type_metrics: BTreeMap::new(),
                    timestamp: Utc::now(),
                    error: Some(e.to_string()),
                };
            }
        };

        let mut efficiencies = Vec::with_capacity(pools.len());
        for pool in &pools {
            match self.strategy_efficiency(pool).await {
                Ok(efficiency) => efficiencies.push(efficiency),
                Err(e) => {
                    tracing::warn!(protocol = "neptune", pool_id = %pool.id, error = %e, "Skipping strategy efficiency");
                }
            }
        }
        efficiencies.sort_by(|a, b| scoring::descending(a.efficiency_score, b.efficiency_score));

        let mut strategy_type_metrics: BTreeMap<String, StrategyTypeEfficiency> = BTreeMap::new();
        for efficiency in &efficiencies {
            let entry = strategy_type_metrics
                .entry(efficiency.strategy_type.clone())
                .or_insert_with(|| StrategyTypeEfficiency {
                    count: 0,
                    avg_efficiency: 0.0,
                    pool_ids: Vec::new(),
                });
            entry.count += 1;
            entry.avg_efficiency += efficiency.efficiency_score;
            entry.pool_ids.push(efficiency.pool_id.clone());
        }
        for metrics in strategy_type_metrics.values_mut() {
            metrics.avg_efficiency = round_to(metrics.avg_efficiency / metrics.count as f64, 2);
        }

        let scores: Vec<f64> = efficiencies.iter().map(|e| e.efficiency_score).collect();
        StrategyEfficiencyReport {
            protocol_id: self.protocol_id().to_string(),
            strategy_count: efficiencies.len(),
            average_efficiency_score: round_to(mean(&scores).unwrap_or(0.0), 2),
            top_strategy: efficiencies.first().cloned(),
            strategy_efficiencies: efficiencies,
            strategy_type_metrics,
            timestamp: Utc::now(),
            error: None,
        }
    }

    async fn strategy_efficiency(&self, pool: &Pool) -> Result<StrategyEfficiency, AdapterError> {
        let strategy = self.adapter.get_strategy_details(&pool.id).await?;
        let performance = self
            .adapter
            .get_performance_history(&pool.id, EFFICIENCY_WINDOW_DAYS)
            .await?;

        let harvests: Vec<f64> = performance.iter().map(|p| p.harvests as f64).collect();
        let efficiency: Vec<f64> = performance.iter().map(|p| p.strategy_efficiency).collect();
        let avg_harvests_per_day = mean(&harvests).unwrap_or(0.0);
        let avg_efficiency = mean(&efficiency).unwrap_or(0.0);

        Ok(StrategyEfficiency {
            pool_id: pool.id.clone(),
            name: pool.name.clone(),
            strategy_type: strategy.strategy_type.as_str().to_string(),
            avg_harvests_per_day: round_to(avg_harvests_per_day, 2),
            avg_efficiency: round_to(avg_efficiency, 4),
            performance_fee: strategy.performance_fee,
            apy: pool.apy,
            efficiency_score: strategy_efficiency_score(
                avg_efficiency,
                &strategy.harvesting_frequency,
                strategy.performance_fee,
            ),
            harvesting_frequency: strategy.harvesting_frequency,
            underlying_protocol: strategy.underlying_protocol,
        })
    }
}

#[async_trait]
impl ProtocolAgent for NeptuneAgent {
    fn protocol_id(&self) -> &'static str {
        ProtocolKind::Neptune.id()
    }

    async fn analyze_opportunities(&self) -> OpportunityAnalysis {
        match self.try_analyze().await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(protocol = "neptune", error = %e, "Opportunity analysis failed");
                OpportunityAnalysis::failed(self.summary("Neptune Finance".to_string(), &[]), e)
            }
        }
    }

    async fn get_risk_assessment(&self) -> RiskAssessment {
        match self.try_assess().await {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::error!(protocol = "neptune", error = %e, "Risk assessment failed");
                RiskAssessment::degraded(self.protocol_id(), NEPTUNE_DEFAULT_OVERALL_RISK, e)
            }
        }
    }

    async fn get_recommended_pools(&self, profile: RiskProfile) -> RecommendationSet {
        let risk_ceiling = NEPTUNE_CEILINGS.ceiling(profile);
        let analysis = self.analyze_opportunities().await;
        let eligible = Self::eligible_for(profile, risk_ceiling, &analysis.opportunities);

        let recommendations = scoring::select_recommendations(&analysis.opportunities, eligible, |o| {
            let strategy_type = o.pool.strategy_type;
            match profile {
                RiskProfile::Conservative if strategy_type == Some(StrategyType::LpCompounding) => {
                    format!("Simple strategy with {}% APY and lower complexity", o.pool.apy)
                }
                RiskProfile::Conservative => "Relatively stable strategy despite some complexity".to_string(),
                RiskProfile::Aggressive if strategy_type == Some(StrategyType::MultiProtocol) => {
                    "Complex strategy with high yield potential".to_string()
                }
                RiskProfile::Aggressive => "Strong yield option with good performance history".to_string(),
                RiskProfile::Moderate => format!(
                    "Balanced risk-reward profile with {} strategy",
                    strategy_label(strategy_type)
                ),
            }
        });

        tracing::info!(
            protocol = "neptune",
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
        lookup_correlation(self.protocol_id(), &NEPTUNE_CORRELATIONS, other_protocol_id)
    }

    async fn get_historical_performance(&self, days: u32) -> HistoricalPerformance {
        match self.try_history(days).await {
            Ok(performance) => performance,
            Err(e) => {
                tracing::error!(protocol = "neptune", error = %e, "Historical performance failed");
                HistoricalPerformance::failed(self.protocol_id(), days, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_agent() -> NeptuneAgent {
        NeptuneAgent::from_config(ProtocolConfig::for_protocol(ProtocolKind::Neptune)).unwrap()
    }

    #[test]
    fn test_strategy_factors() {
        assert_eq!(strategy_complexity(Some(StrategyType::MultiProtocol)), 2.0);
        assert_eq!(strategy_complexity(None), 1.5);
        assert_eq!(strategy_risk_factor(Some(StrategyType::LpCompounding)), 1.0);
        assert_eq!(strategy_risk_factor(None), 1.3);
    }

    #[test]
    fn test_strategy_efficiency_score() {
        // 0.95*10*0.5 + 8*0.3 + 5*0.2
        assert_eq!(strategy_efficiency_score(0.95, "4 hours", 10.0), 8.15);
        assert_eq!(harvest_frequency_score("Daily"), 5.0);
        assert_eq!(harvest_frequency_score("whenever"), 5.0);
        // fee impact floors at 1.0
        assert_eq!(strategy_efficiency_score(0.0, "1 hour", 40.0), 2.9);
    }

    #[tokio::test]
    async fn test_opportunities_penalise_complexity() {
        let analysis = catalog_agent().analyze_opportunities().await;
        assert_eq!(analysis.opportunities.len(), 2);
        for opportunity in &analysis.opportunities {
            let complexity = opportunity.strategy_complexity();
            assert_eq!(opportunity.ranking_score, opportunity.risk_adjusted_return / complexity);
            assert_eq!(opportunity.adjusted_risk(), round_to(opportunity.pool.risk_score * complexity, 2));
        }
        match &analysis.groups {
            OpportunityGroups::Strategy { strategy_groups } => {
                assert!(strategy_groups.contains_key("LP Compounding"));
                assert!(strategy_groups.contains_key("Multi-protocol"));
            }
            other => panic!("unexpected grouping {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_conservative_falls_back_to_raw_risk() {
        // adjusted risks 6.8 and 11.8 exceed 5.0, raw risks 6.8 and 5.9 do too
        let set = catalog_agent().get_recommended_pools(RiskProfile::Conservative).await;
        assert_eq!(set.recommendations.len(), 2);
        assert!(set.recommendations.iter().all(|r| r.exceeded_threshold));

        let aggressive = catalog_agent().get_recommended_pools(RiskProfile::Aggressive).await;
        assert_eq!(aggressive.recommendations[0].opportunity.pool.id, "neptune_usdc_inj");
        assert_eq!(
            aggressive.recommendations[0].recommendation_note,
            "Strong yield option with good performance history"
        );
    }

    #[tokio::test]
    async fn test_risk_assessment_factors() {
        let assessment = catalog_agent().get_risk_assessment().await;
        assert!(assessment.error.is_none());
        // one LP compounding and one multi-protocol vault
        assert_eq!(assessment.factors["average_strategy_risk"], 1.25);
        assert!((1.0..=10.0).contains(&assessment.overall_risk));
    }

    #[tokio::test]
    async fn test_history_includes_harvest_metrics() {
        let performance = catalog_agent().get_historical_performance(7).await;
        assert_eq!(performance.protocol_metrics.len(), 7);
        assert!(performance
            .protocol_metrics
            .iter()
            .all(|day| day.harvests.map(|h| (4..=12).contains(&h)).unwrap_or(false)));
        match performance.breakdown {
            PerformanceBreakdown::Strategy {
                strategies,
                strategy_performance,
                ..
            } => {
                assert_eq!(strategies.len(), 2);
                assert_eq!(strategy_performance["LP Compounding"].pool_ids, vec!["neptune_usdc_inj"]);
            }
            other => panic!("unexpected breakdown {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_strategy_efficiency_report() {
        let report = catalog_agent().analyze_strategy_efficiency().await;
        assert_eq!(report.strategy_count, 2);
        assert!(report.error.is_none());
        let scores: Vec<f64> = report.strategy_efficiencies.iter().map(|s| s.efficiency_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.top_strategy.map(|s| s.efficiency_score), scores.first().copied());
        assert_eq!(report.strategy_type_metrics["LP Compounding"].count, 1);
        let lp = report.strategy_efficiencies.iter().find(|s| s.pool_id == "neptune_usdc_inj").unwrap();
        assert_eq!(lp.harvesting_frequency, "4 hours");
        assert!(lp.avg_harvests_per_day >= 2.0 && lp.avg_harvests_per_day <= 6.0);
    }
}
