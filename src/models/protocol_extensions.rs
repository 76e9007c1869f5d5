use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pool::{PoolType, StrategyType};

/// Vault strategy metadata for yield-aggregator pools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDetail {
    pub pool_id: String,
    pub strategy_name: String,
    pub strategy_type: StrategyType,
    pub description: String,
    pub underlying_protocol: String,
    pub harvesting_frequency: String,
    /// Percent of harvested yield
    pub performance_fee: f64,
    /// Percent of withdrawn principal
    pub withdrawal_fee: f64,
    pub risk_level: f64,
    pub expected_apy: f64,
    pub last_harvest: String,
}

/// AMM curve parameters of a Hydro pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolParameters {
    pub pool_id: String,
    pub pool_type: PoolType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplification_coefficient: Option<u32>,
    /// Token symbol to weight in percent, weighted pools only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
    pub swap_fee: f64,
    pub admin_fee: f64,
    pub price_range: String,
    pub min_trade_size: String,
    pub oracle_enabled: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Percent charged per swap
    pub tier: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeShare {
    pub recipient: String,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum HydroFeeStructure {
    Pool {
        pool_id: String,
        pool_type: PoolType,
        swap_fee: f64,
        admin_fee: f64,
        fee_recipient: String,
    },
    General {
        fee_tiers: Vec<FeeTier>,
        admin_fee: f64,
        fee_distribution: Vec<FeeShare>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum NeptuneFeeStructure {
    Pool {
        pool_id: String,
        performance_fee: f64,
        withdrawal_fee: f64,
        deposit_fee: f64,
    },
    General {
        performance_fee_standard: f64,
        performance_fee_premium: f64,
        withdrawal_fee_standard: f64,
        withdrawal_fee_same_day: f64,
        fee_distribution: Vec<FeeShare>,
    },
}
