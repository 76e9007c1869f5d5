//! Defensive extraction of canonical records from unstandardised endpoint JSON.
//!
//! Upstream schemas differ per protocol and change without notice, so every field
//! is optional here and falls back to a neutral default.

use serde_json::Value;

use crate::error::AdapterError;
use crate::models::{HistoricalPoint, Pool, PoolType, ProtocolInfo, ProtocolKind, StrategyType};
use crate::utils::time::{iso_date_from_epoch, normalize_iso_date};

pub const DEFAULT_VOLATILITY: f64 = 0.05;
pub const DEFAULT_RISK_SCORE: f64 = 5.0;

/// Finite numeric field under the first matching key, accepting numeric strings
pub fn number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let parsed: Option<f64> = match value.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite())
    })
}

/// `YYYY-MM-DD` from an ISO date, an RFC 3339 timestamp or epoch seconds/millis
fn history_date(entry: &Value) -> Option<String> {
    ["date", "timestamp"].iter().find_map(|key| match entry.get(*key)? {
        Value::String(s) => normalize_iso_date(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .and_then(iso_date_from_epoch),
        _ => None,
    })
}

pub fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// List stored under `key`, or the document itself when it is a bare array
pub fn list<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, AdapterError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
        .ok_or_else(|| AdapterError::InvalidData(format!("Response has no '{}' list", key)))
}

fn token_symbols(value: &Value) -> Vec<String> {
    value
        .get("tokens")
        .or_else(|| value.get("pair"))
        .and_then(Value::as_array)
        .map(|tokens| {
            tokens
                .iter()
                .filter_map(|token| match token {
                    Value::String(s) => Some(s.clone()),
                    other => text(other, &["symbol", "denom"]),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// "USDC-INJ LP" -> ["USDC", "INJ"]
fn symbols_from_name(name: &str) -> Vec<String> {
    name.split_whitespace()
        .next()
        .map(|head| head.split('-').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Canonical pool from one upstream entry, `None` when it lacks an id or a token pair
pub fn parse_pool(protocol: ProtocolKind, value: &Value) -> Option<Pool> {
    let id = text(value, &["id", "pool_id"])?;
    let name = text(value, &["name"]).unwrap_or_else(|| id.clone());

    let mut pair = token_symbols(value);
    if pair.len() < 2 {
        pair = symbols_from_name(&name);
    }
    if pair.len() < 2 {
        tracing::debug!(protocol = %protocol, pool_id = %id, "Skipping pool without a token pair");
        return None;
    }

    let mut pool = Pool {
        id,
        name,
        apy: number(value, &["apy"]).unwrap_or(0.0),
        tvl: number(value, &["tvl"]).unwrap_or(0.0),
        pair,
        provider: protocol.provider_name().to_string(),
        volatility: number(value, &["volatility"]).unwrap_or(DEFAULT_VOLATILITY),
        risk_score: number(value, &["risk", "risk_score"]).unwrap_or(DEFAULT_RISK_SCORE),
        pool_type: None,
        strategy_type: None,
        volume_24h: None,
        fee_tier: None,
        swap_fee: None,
        created_at: None,
    };

    match protocol {
        ProtocolKind::Hydro => {
            pool.pool_type = Some(
                text(value, &["pool_type"])
                    .map(|label| PoolType::from_label(&label))
                    .unwrap_or(PoolType::Stable),
            );
        }
        ProtocolKind::Neptune => {
            pool.strategy_type = Some(
                text(value, &["strategy_type"])
                    .and_then(|label| StrategyType::from_label(&label))
                    .unwrap_or_else(|| StrategyType::for_pair(&pool.pair)),
            );
        }
        ProtocolKind::Helix => {}
    }

    Some(pool.clamped())
}

/// Every parseable pool of a `pools` response
pub fn parse_pools(protocol: ProtocolKind, value: &Value) -> Result<Vec<Pool>, AdapterError> {
    let entries = list(value, "pools")?;
    Ok(entries.iter().filter_map(|entry| parse_pool(protocol, entry)).collect())
}

/// Pool with the detail-only fields of a `pools/{id}` response
pub fn parse_pool_details(protocol: ProtocolKind, value: &Value) -> Result<Pool, AdapterError> {
    let entry = value.get("pool").filter(|v| v.is_object()).unwrap_or(value);
    let mut pool = parse_pool(protocol, entry)
        .ok_or_else(|| AdapterError::InvalidData("Pool details missing id or tokens".to_string()))?;

    pool.volume_24h = number(entry, &["volume_24h", "volume"]).map(|v| v.max(0.0));
    pool.created_at = text(entry, &["created_at"]);
    pool.fee_tier = text(entry, &["fee_tier"]);
    pool.swap_fee = text(entry, &["swap_fee"]);
    Ok(with_detail_defaults(protocol, pool))
}

/// Fill the fee fields a detail lookup always reports
pub fn with_detail_defaults(protocol: ProtocolKind, mut pool: Pool) -> Pool {
    match protocol {
        ProtocolKind::Helix => {
            pool.fee_tier.get_or_insert_with(|| "0.3%".to_string());
        }
        ProtocolKind::Hydro => {
            let default_fee = match pool.pool_type {
                Some(PoolType::Weighted) => "0.3%",
                _ => "0.04%",
            };
            pool.swap_fee.get_or_insert_with(|| default_fee.to_string());
        }
        ProtocolKind::Neptune => {}
    }
    pool
}

/// History points of a `pools/{id}/history` response with ISO dates.
///
/// Entries without a recognisable date are dropped.
pub fn parse_history(value: &Value) -> Result<Vec<HistoricalPoint>, AdapterError> {
    let entries = list(value, "history")?;
    Ok(entries
        .iter()
        .filter_map(|entry| {
            Some(HistoricalPoint {
                date: history_date(entry)?,
                apy: number(entry, &["apy"]).unwrap_or(0.0).max(0.0),
                tvl: number(entry, &["tvl"]).unwrap_or(0.0).max(0.0),
                volume_24h: number(entry, &["volume_24h", "volume"]).unwrap_or(0.0).max(0.0),
            })
        })
        .collect())
}

/// Overlay whatever the `info` endpoint reports on top of locally derived info
pub fn merge_protocol_info(value: &Value, mut info: ProtocolInfo) -> ProtocolInfo {
    if let Some(name) = text(value, &["name"]) {
        info.name = name;
    }
    if let Some(description) = text(value, &["description"]) {
        info.description = description;
    }
    if let Some(website) = text(value, &["website", "url"]) {
        info.website = website;
    }
    if let Some(tvl) = number(value, &["tvl", "total_tvl"]) {
        info.tvl = tvl.max(0.0);
    }
    if let Some(count) = number(value, &["pool_count"]) {
        info.pool_count = count.max(0.0) as usize;
    }
    if let Some(features) = value.get("features").and_then(Value::as_array) {
        info.features = features.iter().filter_map(|f| f.as_str().map(str::to_string)).collect();
    }
    if let Some(status) = text(value, &["audit_status"]) {
        info.audit_status = Some(status);
    }
    if let Some(date) = text(value, &["launch_date"]) {
        info.launch_date = Some(date);
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pool_with_defaults() {
        let pool = parse_pool(
            ProtocolKind::Helix,
            &json!({"id": "helix_x", "name": "USDC-INJ LP", "apy": "31.2", "tokens": ["USDC", "INJ"]}),
        )
        .unwrap();
        assert_eq!(pool.apy, 31.2);
        assert_eq!(pool.tvl, 0.0);
        assert_eq!(pool.volatility, DEFAULT_VOLATILITY);
        assert_eq!(pool.risk_score, DEFAULT_RISK_SCORE);
        assert_eq!(pool.provider, "Helix");
    }

    #[test]
    fn test_pair_recovered_from_name() {
        let pool = parse_pool(ProtocolKind::Hydro, &json!({"id": "hydro_y", "name": "USDC-DAI Stable Pool"})).unwrap();
        assert_eq!(pool.pair, vec!["USDC".to_string(), "DAI".to_string()]);
        assert_eq!(pool.pool_type, Some(PoolType::Stable));
        assert!(parse_pool(ProtocolKind::Hydro, &json!({"id": "hydro_z", "name": "Mystery"})).is_none());
        assert!(parse_pool(ProtocolKind::Hydro, &json!({"name": "USDC-DAI"})).is_none());
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let pool = parse_pool(
            ProtocolKind::Neptune,
            &json!({"id": "n", "tokens": [{"symbol": "USDC"}, {"symbol": "ATOM"}], "apy": -2, "risk": 42}),
        )
        .unwrap();
        assert_eq!(pool.apy, 0.0);
        assert_eq!(pool.risk_score, 10.0);
        assert_eq!(pool.strategy_type, Some(StrategyType::MultiProtocol));
    }

    #[test]
    fn test_parse_pools_requires_list() {
        assert!(parse_pools(ProtocolKind::Helix, &json!({"data": {}})).is_err());
        let pools = parse_pools(
            ProtocolKind::Helix,
            &json!([{"id": "a", "tokens": ["USDC", "USDT"]}, {"name": "no id"}]),
        )
        .unwrap();
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn test_parse_pool_details_fields() {
        let pool = parse_pool_details(
            ProtocolKind::Helix,
            &json!({"pool": {"id": "helix_usdc_inj", "tokens": ["USDC", "INJ"], "volume_24h": 120000}}),
        )
        .unwrap();
        assert_eq!(pool.fee_tier.as_deref(), Some("0.3%"));
        assert_eq!(pool.volume_24h, Some(120000.0));
    }

    #[test]
    fn test_parse_history() {
        let points = parse_history(&json!({"history": [
            {"date": "2024-05-02", "apy": 12.1, "tvl": 100, "volume": 7},
            {"apy": 9.0}
        ]}))
        .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].volume_24h, 7.0);
    }

    #[test]
    fn test_non_finite_numbers_are_ignored() {
        let entry = json!({"apy": "NaN", "yield": "12.5", "tvl": "inf", "risk": "-Infinity"});
        assert_eq!(number(&entry, &["apy"]), None);
        assert_eq!(number(&entry, &["apy", "yield"]), Some(12.5));
        assert_eq!(number(&entry, &["tvl"]), None);

        let pool = parse_pool(
            ProtocolKind::Helix,
            &json!({"id": "helix_x", "tokens": ["USDC", "INJ"], "apy": "inf", "tvl": "NaN", "risk": "inf"}),
        )
        .unwrap();
        assert_eq!(pool.apy, 0.0);
        assert_eq!(pool.tvl, 0.0);
        assert_eq!(pool.risk_score, DEFAULT_RISK_SCORE);

        let points = parse_history(&json!([{"date": "2024-05-02", "apy": "inf", "tvl": "NaN"}])).unwrap();
        assert_eq!(points[0].apy, 0.0);
        assert_eq!(points[0].tvl, 0.0);
    }

    #[test]
    fn test_history_dates_normalized() {
        let points = parse_history(&json!([
            {"timestamp": 999_999_999, "apy": 1.0},
            {"timestamp": "1709251200", "apy": 2.0},
            {"date": "2024-03-02T12:00:00Z", "apy": 3.0},
            {"timestamp": 1_709_424_000_000i64, "apy": 4.0},
            {"date": "last tuesday", "apy": 5.0}
        ]))
        .unwrap();
        let dates: Vec<_> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2001-09-09", "2024-03-01", "2024-03-02", "2024-03-03"]);
    }
}
