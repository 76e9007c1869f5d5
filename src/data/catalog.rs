use crate::models::{AssetInfo, Pool, PoolType, ProtocolKind, StrategyType};

/// Baseline pools served while live endpoints are disabled or unreachable.
pub fn baseline_pools(protocol: ProtocolKind) -> Vec<Pool> {
    let provider = protocol.provider_name();
    match protocol {
        ProtocolKind::Helix => vec![
            Pool::new("helix_usdc_inj", "USDC-INJ LP", provider, &["USDC", "INJ"], 28.5, 1_850_000.0, 0.08, 6.2),
            Pool::new("helix_usdc_atom", "USDC-ATOM LP", provider, &["USDC", "ATOM"], 22.3, 920_000.0, 0.06, 5.7),
            Pool::new("helix_usdc_usdt", "USDC-USDT LP", provider, &["USDC", "USDT"], 12.8, 4_300_000.0, 0.03, 2.8),
        ],
        ProtocolKind::Hydro => vec![
            Pool::new("hydro_usdc_usdt", "USDC-USDT Stable Pool", provider, &["USDC", "USDT"], 8.2, 5_600_000.0, 0.02, 2.1)
                .with_pool_type(PoolType::Stable),
            Pool::new("hydro_usdc_dai", "USDC-DAI Stable Pool", provider, &["USDC", "DAI"], 7.9, 2_900_000.0, 0.02, 2.3)
                .with_pool_type(PoolType::Stable),
            Pool::new("hydro_inj_atom", "INJ-ATOM Trading Pool", provider, &["INJ", "ATOM"], 32.5, 840_000.0, 0.09, 7.1)
                .with_pool_type(PoolType::Weighted),
        ],
        ProtocolKind::Neptune => vec![
            Pool::new("neptune_usdc_atom", "USDC-ATOM Yield Pool", provider, &["USDC", "ATOM"], 24.8, 1_250_000.0, 0.07, 5.9)
                .with_strategy_type(StrategyType::MultiProtocol),
            Pool::new("neptune_usdc_inj", "USDC-INJ Yield Pool", provider, &["USDC", "INJ"], 29.2, 1_650_000.0, 0.09, 6.8)
                .with_strategy_type(StrategyType::LpCompounding),
        ],
    }
}

/// Injective token metadata by symbol.
///
/// Unknown symbols get a placeholder denom and 18 decimals.
pub fn token_metadata(symbol: &str) -> AssetInfo {
    let (name, address, decimals) = match symbol.to_ascii_uppercase().as_str() {
        "USDC" => ("USD Coin", "inj1k9x9k779hwz8r9f5mcjs9qnkef9n4l9z6vv7f5", 6),
        "USDT" => ("Tether USD", "inj1ktmz4uzdgn7ydvlnfgmkssh0jn9mje3cn3czug", 6),
        "INJ" => ("Injective Protocol", "inj", 18),
        "ATOM" => ("Cosmos", "inj1cdwt8g7nxgtg6gqv0lnzdhnckcfqzh8v058frc", 6),
        "DAI" => ("Dai Stablecoin", "inj1lxkgvxrf8q0ym3qygsahm74f09keq5as2psk7s", 18),
        _ => {
            return AssetInfo {
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                address: format!("inj1...{}", symbol.to_ascii_lowercase()),
                decimals: 18,
            }
        }
    };

    AssetInfo {
        symbol: symbol.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        decimals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_carry_protocol_prefix() {
        for protocol in ProtocolKind::ALL {
            let pools = baseline_pools(protocol);
            assert!(!pools.is_empty());
            for pool in pools {
                assert!(pool.id.starts_with(protocol.id()));
                assert_eq!(pool.provider, protocol.provider_name());
                assert!(pool.pair.len() >= 2);
            }
        }
    }

    #[test]
    fn test_hydro_pool_types() {
        let pools = baseline_pools(ProtocolKind::Hydro);
        let stable = pools.iter().filter(|p| p.is_stable_pool()).count();
        assert_eq!(stable, 2);
    }

    #[test]
    fn test_token_metadata() {
        assert_eq!(token_metadata("USDC").decimals, 6);
        assert_eq!(token_metadata("INJ").address, "inj");
        let unknown = token_metadata("WETH");
        assert_eq!(unknown.name, "WETH");
        assert_eq!(unknown.address, "inj1...weth");
        assert_eq!(unknown.decimals, 18);
    }
}
