use proptest::prelude::*;
use serde_json::json;

use defi_yield_advisor::{
    adapters::normalize,
    agents::{hydro::stable_efficiency_score, scoring},
    data::{synthesize_history, SeriesProfile},
    models::{Pool, ProtocolKind},
};

/// Property-based checks of the normalization and scoring invariants

fn pool_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("helix"), Just("hydro"), Just("neptune")]
        .prop_flat_map(|protocol| "[a-z]{3,5}_[a-z]{3,5}".prop_map(move |pair| format!("{}_{}", protocol, pair)))
}

fn series_profile() -> impl Strategy<Value = SeriesProfile> {
    (0.1f64..80.0, 10_000.0f64..50_000_000.0, 0.0f64..0.1, 0.0f64..0.003).prop_map(|(apy, tvl, noise, trend)| {
        SeriesProfile {
            base_apy: apy,
            base_tvl: tvl,
            apy_noise: noise,
            apy_trend: trend,
            tvl_noise: noise / 2.0,
            tvl_trend: trend / 2.0,
            volume_range: (0.02, 0.18),
        }
    })
}

fn pool() -> impl Strategy<Value = Pool> {
    (pool_id(), 0.0f64..60.0, 0.0f64..10_000_000.0, 1.0f64..10.0)
        .prop_map(|(id, apy, tvl, risk)| Pool::new(id, "USDC-INJ LP", "Helix", &["USDC", "INJ"], apy, tvl, 0.05, risk))
}

proptest! {
    /// Synthetic history is exactly `days` long and reproducible
    #[test]
    fn test_synthetic_history_length_and_determinism(
        id in pool_id(),
        profile in series_profile(),
        days in 0u32..120,
    ) {
        let first = synthesize_history(&id, &profile, days);
        let second = synthesize_history(&id, &profile, days);

        prop_assert_eq!(first.len(), days as usize);
        prop_assert_eq!(&first, &second);
        for point in &first {
            prop_assert!(point.apy >= 0.0);
            prop_assert!(point.tvl >= 1000.0);
            prop_assert!(point.volume_24h >= 0.0);
        }
    }

    /// Whatever an endpoint reports, normalized scores land in their domain
    #[test]
    fn test_parsed_pool_scores_are_clamped(
        risk in -50.0f64..50.0,
        apy in -100.0f64..500.0,
        tvl in -1e6f64..1e9,
    ) {
        let entry = json!({ "id": "helix_usdc_inj", "name": "USDC-INJ LP", "risk": risk, "apy": apy, "tvl": tvl });
        let pool = normalize::parse_pool(ProtocolKind::Helix, &entry).unwrap();

        prop_assert!((1.0..=10.0).contains(&pool.risk_score));
        prop_assert!(pool.apy >= 0.0);
        prop_assert!(pool.tvl >= 0.0);
    }

    /// Never more than three recommendations, and the fallback flags every pick
    #[test]
    fn test_recommendation_selection_bounds(
        pools in prop::collection::vec(pool(), 0..8),
        ceiling in 1.0f64..10.0,
    ) {
        let mut ranked: Vec<_> = pools.into_iter().map(|p| scoring::plain_opportunity(p, None)).collect();
        scoring::sort_by_ranking(&mut ranked);
        let eligible: Vec<_> = ranked.iter().filter(|o| o.pool.risk_score <= ceiling).cloned().collect();
        let eligible_count = eligible.len();
        let any_eligible = eligible_count > 0;

        let picks = scoring::select_recommendations(&ranked, eligible, |_| "note".to_string());

        let available = if any_eligible { eligible_count } else { ranked.len() };
        prop_assert_eq!(picks.len(), available.min(scoring::MAX_RECOMMENDATIONS));
        for pick in &picks {
            prop_assert_eq!(pick.exceeded_threshold, !any_eligible);
            if !pick.exceeded_threshold {
                prop_assert!(pick.opportunity.pool.risk_score <= ceiling);
            }
        }
    }

    /// Ranking is non-increasing after sorting
    #[test]
    fn test_ranking_is_sorted(pools in prop::collection::vec(pool(), 1..10)) {
        let mut ranked: Vec<_> = pools.into_iter().map(|p| scoring::plain_opportunity(p, None)).collect();
        scoring::sort_by_ranking(&mut ranked);
        prop_assert!(ranked.windows(2).all(|w| w[0].ranking_score >= w[1].ranking_score));
    }

    #[test]
    fn test_stable_efficiency_score_range(
        slippage in 0.0f64..1.0,
        stability in 0.0f64..1.0,
        tvl in 0.0f64..1e9,
    ) {
        let score = stable_efficiency_score(slippage, stability, tvl);
        prop_assert!((0.0..=10.0).contains(&score));
    }
}
