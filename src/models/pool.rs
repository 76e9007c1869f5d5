use serde::{Deserialize, Serialize};

use crate::utils::math::clamp_risk;

/// Symbols treated as stablecoins when classifying pool composition
pub const STABLECOINS: [&str; 3] = ["USDC", "USDT", "DAI"];

/// AMM curve family of a Hydro pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    Stable,
    Weighted,
}

impl PoolType {
    /// Lenient parse of an upstream label; anything not "weighted" is a stable pool
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("weighted") {
            PoolType::Weighted
        } else {
            PoolType::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolType::Stable => "Stable",
            PoolType::Weighted => "Weighted",
        }
    }
}

/// Yield strategy family of a Neptune vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyType {
    #[serde(rename = "LP Compounding")]
    LpCompounding,
    #[serde(rename = "Yield Optimizer")]
    YieldOptimizer,
    #[serde(rename = "Multi-protocol")]
    MultiProtocol,
}

impl StrategyType {
    /// Classify a vault by its token pair.
    ///
    /// USDC-INJ vaults compound Helix LP rewards, ATOM vaults route across protocols.
    pub fn for_pair(pair: &[String]) -> Self {
        let has = |symbol: &str| pair.iter().any(|token| token.eq_ignore_ascii_case(symbol));
        if has("USDC") && has("INJ") {
            StrategyType::LpCompounding
        } else if has("ATOM") {
            StrategyType::MultiProtocol
        } else {
            StrategyType::YieldOptimizer
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "lp compounding" => Some(StrategyType::LpCompounding),
            "yield optimizer" => Some(StrategyType::YieldOptimizer),
            "multi-protocol" => Some(StrategyType::MultiProtocol),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::LpCompounding => "LP Compounding",
            StrategyType::YieldOptimizer => "Yield Optimizer",
            StrategyType::MultiProtocol => "Multi-protocol",
        }
    }

    pub fn underlying_protocol(&self) -> &'static str {
        match self {
            StrategyType::LpCompounding => "Helix",
            StrategyType::YieldOptimizer => "Various",
            StrategyType::MultiProtocol => "Helix, Astroport",
        }
    }

    pub fn harvesting_frequency(&self) -> &'static str {
        match self {
            StrategyType::LpCompounding => "4 hours",
            StrategyType::YieldOptimizer => "12 hours",
            StrategyType::MultiProtocol => "6 hours",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyType::LpCompounding => "Automatically compounds LP rewards from the Helix USDC-INJ pool",
            StrategyType::YieldOptimizer => "Optimizes yield across available options",
            StrategyType::MultiProtocol => "Allocates capital across multiple ATOM yield sources",
        }
    }
}

/// Canonical pool representation shared by every protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Unique within a protocol, e.g. "helix_usdc_inj"
    pub id: String,
    pub name: String,
    /// Annual percentage yield, in percent
    pub apy: f64,
    /// Total value locked in USD
    pub tvl: f64,
    /// Ordered token symbols
    pub pair: Vec<String>,
    /// Protocol display name
    pub provider: String,
    /// Relative APY volatility as a fraction
    pub volatility: f64,
    /// 1 (safest) to 10 (riskiest)
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_type: Option<PoolType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<StrategyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Pool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        pair: &[&str],
        apy: f64,
        tvl: f64,
        volatility: f64,
        risk_score: f64,
    ) -> Self {
        Pool {
            id: id.into(),
            name: name.into(),
            apy,
            tvl,
            pair: pair.iter().map(|s| s.to_string()).collect(),
            provider: provider.into(),
            volatility,
            risk_score,
            pool_type: None,
            strategy_type: None,
            volume_24h: None,
            fee_tier: None,
            swap_fee: None,
            created_at: None,
        }
    }

    pub fn with_pool_type(mut self, pool_type: PoolType) -> Self {
        self.pool_type = Some(pool_type);
        self
    }

    pub fn with_strategy_type(mut self, strategy_type: StrategyType) -> Self {
        self.strategy_type = Some(strategy_type);
        self
    }

    pub fn is_stable_pool(&self) -> bool {
        self.pool_type == Some(PoolType::Stable)
    }

    /// Every token in the pair is a stablecoin
    pub fn has_stablecoin_pair(&self) -> bool {
        self.pair.len() >= 2
            && self
                .pair
                .iter()
                .all(|token| STABLECOINS.iter().any(|s| s.eq_ignore_ascii_case(token)))
    }

    /// Bring every score back into its documented domain
    pub fn clamped(mut self) -> Self {
        self.apy = if self.apy.is_finite() { self.apy.max(0.0) } else { 0.0 };
        self.tvl = if self.tvl.is_finite() { self.tvl.max(0.0) } else { 0.0 };
        self.volatility = if self.volatility.is_finite() { self.volatility.max(0.0) } else { 0.0 };
        self.risk_score = clamp_risk(self.risk_score);
        self
    }
}

/// One day of a pool's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// ISO-8601 calendar date
    pub date: String,
    pub apy: f64,
    pub tvl: f64,
    pub volume_24h: f64,
}

/// History point enriched with vault harvesting metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformancePoint {
    #[serde(flatten)]
    pub point: HistoricalPoint,
    pub harvests: u32,
    pub fees_collected: f64,
    pub strategy_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub symbol: String,
    pub name: String,
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub name: String,
    pub description: String,
    pub website: String,
    pub tvl: f64,
    pub pool_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}
