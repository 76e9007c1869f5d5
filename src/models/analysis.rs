use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pool::{HistoricalPoint, Pool, StrategyPerformancePoint};
use super::protocol_extensions::StrategyDetail;
use super::risk_profile::RiskProfile;

/// Protocol-specific correction applied on top of the plain risk-adjusted return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "adjustment", rename_all = "snake_case")]
pub enum Adjustment {
    None,
    Stability {
        is_stable_pool: bool,
        stability_bonus: f64,
    },
    Strategy {
        strategy_complexity: f64,
        adjusted_risk: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        performance_fee: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        harvesting_frequency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        underlying_protocol: Option<String>,
    },
}

/// A pool enriched with the metrics used to rank it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(flatten)]
    pub pool: Pool,
    /// Coefficient of variation of the recent APY series
    pub apy_volatility: f64,
    /// `apy / risk_score`
    pub risk_adjusted_return: f64,
    #[serde(flatten)]
    pub adjustment: Adjustment,
    /// Sort key after the protocol adjustment
    pub ranking_score: f64,
}

impl Opportunity {
    /// Risk after strategy complexity is priced in, the raw score otherwise
    pub fn adjusted_risk(&self) -> f64 {
        match &self.adjustment {
            Adjustment::Strategy { adjusted_risk, .. } => *adjusted_risk,
            _ => self.pool.risk_score,
        }
    }

    pub fn strategy_complexity(&self) -> f64 {
        match &self.adjustment {
            Adjustment::Strategy { strategy_complexity, .. } => *strategy_complexity,
            _ => 1.0,
        }
    }

    pub fn is_stable_pool(&self) -> bool {
        match &self.adjustment {
            Adjustment::Stability { is_stable_pool, .. } => *is_stable_pool,
            _ => self.pool.is_stable_pool(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub id: String,
    pub name: String,
    pub total_tvl: f64,
    pub pool_count: usize,
}

/// Extra views over the ranked opportunities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "grouping", rename_all = "snake_case")]
pub enum OpportunityGroups {
    None,
    PoolType {
        stable_pools: Vec<Opportunity>,
        weighted_pools: Vec<Opportunity>,
        top_stable: Option<Opportunity>,
    },
    Strategy {
        strategy_groups: BTreeMap<String, Vec<Opportunity>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityAnalysis {
    pub protocol: ProtocolSummary,
    pub opportunities: Vec<Opportunity>,
    pub top_opportunity: Option<Opportunity>,
    #[serde(flatten)]
    pub groups: OpportunityGroups,
    pub analysis_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpportunityAnalysis {
    pub fn failed(protocol: ProtocolSummary, error: impl ToString) -> Self {
        OpportunityAnalysis {
            protocol,
            opportunities: Vec::new(),
            top_opportunity: None,
            groups: OpportunityGroups::None,
            analysis_timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub protocol_id: String,
    /// Weighted overall score in `[1, 10]`
    pub overall_risk: f64,
    pub protocol_risk: f64,
    pub average_pool_risk: f64,
    pub tvl_risk: f64,
    /// Protocol-specific component factors by name
    pub factors: BTreeMap<String, f64>,
    pub assessment_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskAssessment {
    /// Neutral assessment used when the inputs could not be gathered
    pub fn degraded(protocol_id: impl Into<String>, default_risk: f64, error: impl ToString) -> Self {
        RiskAssessment {
            protocol_id: protocol_id.into(),
            overall_risk: default_risk,
            protocol_risk: default_risk,
            average_pool_risk: default_risk,
            tvl_risk: default_risk,
            factors: BTreeMap::new(),
            assessment_timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub recommendation_note: String,
    /// Set when the pool was included although it is above the profile ceiling
    pub exceeded_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub protocol_id: String,
    pub risk_profile: RiskProfile,
    pub risk_ceiling: f64,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Protocol-wide aggregate for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: String,
    pub total_tvl: f64,
    pub avg_apy: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_collected: Option<f64>,
}

/// Daily aggregate over a subset of pools (stable or weighted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub date: String,
    pub total_tvl: f64,
    pub avg_apy: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub pool_ids: Vec<String>,
    pub total_tvl: f64,
    pub avg_apy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "breakdown", rename_all = "snake_case")]
pub enum PerformanceBreakdown {
    None,
    PoolType {
        stable_pool_metrics: Vec<SegmentMetrics>,
        weighted_pool_metrics: Vec<SegmentMetrics>,
    },
    Strategy {
        performance: BTreeMap<String, Vec<StrategyPerformancePoint>>,
        strategies: BTreeMap<String, StrategyDetail>,
        strategy_performance: BTreeMap<String, StrategyPerformance>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPerformance {
    pub protocol_id: String,
    pub days: u32,
    pub pools: BTreeMap<String, Vec<HistoricalPoint>>,
    pub protocol_metrics: Vec<DailyMetrics>,
    #[serde(flatten)]
    pub breakdown: PerformanceBreakdown,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoricalPerformance {
    pub fn failed(protocol_id: impl Into<String>, days: u32, error: impl ToString) -> Self {
        HistoricalPerformance {
            protocol_id: protocol_id.into(),
            days,
            pools: BTreeMap::new(),
            protocol_metrics: Vec::new(),
            breakdown: PerformanceBreakdown::None,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
        }
    }

    /// Every TVL value across all pool series
    pub fn tvl_values(&self) -> Vec<f64> {
        self.pools.values().flatten().map(|p| p.tvl).collect()
    }

    /// Every APY value across all pool series
    pub fn apy_values(&self) -> Vec<f64> {
        self.pools.values().flatten().map(|p| p.apy).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolHealth {
    pub protocol_id: String,
    pub risk_score: f64,
    pub tvl_stability: f64,
    pub apy_stability: f64,
    pub health_score: f64,
    pub analysis_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StablePoolEfficiency {
    pub pool_id: String,
    pub name: String,
    pub apy: f64,
    pub tvl: f64,
    pub avg_slippage: f64,
    pub price_stability: f64,
    pub efficiency_score: f64,
    pub amplification_coefficient: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StablePoolEfficiencyReport {
    pub protocol_id: String,
    pub stable_pool_count: usize,
    pub total_stable_tvl: f64,
    pub average_efficiency_score: f64,
    pub top_pool: Option<StablePoolEfficiency>,
    pub pool_metrics: Vec<StablePoolEfficiency>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEfficiency {
    pub pool_id: String,
    pub name: String,
    pub strategy_type: String,
    pub harvesting_frequency: String,
    pub avg_harvests_per_day: f64,
    pub avg_efficiency: f64,
    pub performance_fee: f64,
    pub apy: f64,
    pub underlying_protocol: String,
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTypeEfficiency {
    pub count: usize,
    pub avg_efficiency: f64,
    pub pool_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEfficiencyReport {
    pub protocol_id: String,
    pub strategy_count: usize,
    pub average_efficiency_score: f64,
    pub top_strategy: Option<StrategyEfficiency>,
    pub strategy_efficiencies: Vec<StrategyEfficiency>,
    pub strategy_type_metrics: BTreeMap<String, StrategyTypeEfficiency>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-protocol aggregate produced by the market data collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStats {
    pub name: String,
    pub total_tvl: f64,
    pub average_apy: f64,
    pub average_risk_score: f64,
    pub pool_count: usize,
    pub pools: Vec<Pool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
