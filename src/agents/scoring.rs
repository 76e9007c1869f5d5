use futures::future::join_all;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::adapters::ProtocolAdapter;
use crate::models::{Adjustment, DailyMetrics, HistoricalPoint, Opportunity, Pool, Recommendation};
use crate::utils::math::{coefficient_of_variation, mean, round_to};

/// Days of history behind the volatility estimate
pub const VOLATILITY_WINDOW_DAYS: u32 = 14;
pub const MAX_RECOMMENDATIONS: usize = 3;
pub const NEUTRAL_POOL_RISK: f64 = 5.0;
pub const EXCEEDED_THRESHOLD_NOTE: &str = "Included despite exceeding risk threshold due to limited options";

/// Coefficient of variation of the APY series, 0 when undefined
pub fn apy_volatility(history: &[HistoricalPoint]) -> f64 {
    let apys: Vec<f64> = history.iter().map(|p| p.apy).collect();
    coefficient_of_variation(&apys).map(|cv| round_to(cv, 4)).unwrap_or(0.0)
}

pub fn risk_adjusted_return(pool: &Pool) -> f64 {
    if pool.risk_score <= 0.0 {
        return 0.0;
    }
    round_to(pool.apy / pool.risk_score, 2)
}

/// Opportunity without any protocol adjustment, ranked by plain risk-adjusted return
pub fn plain_opportunity(pool: Pool, history: Option<&Vec<HistoricalPoint>>) -> Opportunity {
    let risk_adjusted_return = risk_adjusted_return(&pool);
    Opportunity {
        apy_volatility: history.map(|h| apy_volatility(h)).unwrap_or(0.0),
        risk_adjusted_return,
        adjustment: Adjustment::None,
        ranking_score: risk_adjusted_return,
        pool,
    }
}

pub fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

pub fn sort_by_ranking(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| descending(a.ranking_score, b.ranking_score));
}

/// Lowest risk first, higher APY breaking ties
pub fn by_risk_then_apy(a: &Opportunity, b: &Opportunity) -> Ordering {
    a.pool
        .risk_score
        .total_cmp(&b.pool.risk_score)
        .then_with(|| descending(a.pool.apy, b.pool.apy))
}

pub fn by_apy(a: &Opportunity, b: &Opportunity) -> Ordering {
    descending(a.pool.apy, b.pool.apy)
}

pub fn by_risk_adjusted_return(a: &Opportunity, b: &Opportunity) -> Ordering {
    descending(a.risk_adjusted_return, b.risk_adjusted_return)
}

pub fn average_risk(pools: &[Pool], default: f64) -> f64 {
    let risks: Vec<f64> = pools.iter().map(|p| p.risk_score).collect();
    mean(&risks).unwrap_or(default)
}

pub fn total_tvl(pools: &[Pool]) -> f64 {
    pools.iter().map(|p| p.tvl).sum()
}

/// Up to three eligible pools with a note each, or the top unfiltered
/// opportunities flagged as over the ceiling when nothing is eligible.
pub fn select_recommendations<F>(
    ranked: &[Opportunity],
    eligible: Vec<Opportunity>,
    note: F,
) -> Vec<Recommendation>
where
    F: Fn(&Opportunity) -> String,
{
    if eligible.is_empty() {
        return ranked
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .cloned()
            .map(|opportunity| Recommendation {
                opportunity,
                recommendation_note: EXCEEDED_THRESHOLD_NOTE.to_string(),
                exceeded_threshold: true,
            })
            .collect();
    }

    eligible
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|opportunity| Recommendation {
            recommendation_note: note(&opportunity),
            opportunity,
            exceeded_threshold: false,
        })
        .collect()
}

/// History of every pool, fetched concurrently; pools whose history fails are left out
pub async fn collect_histories<A>(adapter: &A, pools: &[Pool], days: u32) -> BTreeMap<String, Vec<HistoricalPoint>>
where
    A: ProtocolAdapter + ?Sized,
{
    let fetches = pools.iter().map(|pool| async move {
        let result = adapter.get_historical_data(&pool.id, days).await;
        (pool.id.clone(), result)
    });

    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(pool_id, result)| match result {
            Ok(series) => Some((pool_id, series)),
            Err(e) => {
                tracing::warn!(
                    protocol = adapter.protocol_id(),
                    pool_id = %pool_id,
                    error = %e,
                    "History unavailable, skipping pool"
                );
                None
            }
        })
        .collect()
}

/// Number of days every series can contribute to, capped at `days`
pub fn aligned_days<T>(series: &BTreeMap<String, Vec<T>>, days: u32) -> usize {
    series
        .values()
        .map(Vec::len)
        .min()
        .unwrap_or(0)
        .min(days as usize)
}

/// Protocol-wide totals per day, most recent first
pub fn daily_metrics(series: &BTreeMap<String, Vec<HistoricalPoint>>, days: u32) -> Vec<DailyMetrics> {
    (0..aligned_days(series, days))
        .map(|i| {
            let points: Vec<&HistoricalPoint> = series.values().map(|s| &s[i]).collect();
            let apys: Vec<f64> = points.iter().map(|p| p.apy).collect();
            DailyMetrics {
                date: points.first().map(|p| p.date.clone()).unwrap_or_default(),
                total_tvl: points.iter().map(|p| p.tvl).sum(),
                avg_apy: mean(&apys).unwrap_or(0.0),
                volume: points.iter().map(|p| p.volume_24h).sum(),
                harvests: None,
                fees_collected: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, apy: f64, tvl: f64) -> HistoricalPoint {
        HistoricalPoint {
            date: date.to_string(),
            apy,
            tvl,
            volume_24h: tvl / 10.0,
        }
    }

    fn pool(id: &str, apy: f64, risk: f64) -> Pool {
        Pool::new(id, id, "Helix", &["USDC", "INJ"], apy, 1_000_000.0, 0.05, risk)
    }

    #[test]
    fn test_apy_volatility() {
        assert_eq!(apy_volatility(&[]), 0.0);
        assert_eq!(apy_volatility(&[point("d", 10.0, 1.0), point("d", 10.0, 1.0)]), 0.0);
        // mean 10, population std 2
        assert_eq!(apy_volatility(&[point("a", 8.0, 1.0), point("b", 12.0, 1.0)]), 0.2);
    }

    #[test]
    fn test_risk_adjusted_return() {
        assert_eq!(risk_adjusted_return(&pool("a", 28.5, 6.2)), 4.6);
        let mut zero_risk = pool("b", 10.0, 1.0);
        zero_risk.risk_score = 0.0;
        assert_eq!(risk_adjusted_return(&zero_risk), 0.0);
    }

    #[test]
    fn test_select_recommendations_fallback() {
        let ranked: Vec<Opportunity> = (0..5)
            .map(|i| plain_opportunity(pool(&format!("p{}", i), 10.0 + i as f64, 9.0), None))
            .collect();

        let fallback = select_recommendations(&ranked, Vec::new(), |_| String::new());
        assert_eq!(fallback.len(), 3);
        assert!(fallback.iter().all(|r| r.exceeded_threshold));
        assert_eq!(fallback[0].opportunity.pool.id, "p0");
        assert_eq!(fallback[0].recommendation_note, EXCEEDED_THRESHOLD_NOTE);

        let picked = select_recommendations(&ranked, ranked[3..].to_vec(), |o| o.pool.id.clone());
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[1].recommendation_note, "p4");
        assert!(!picked[0].exceeded_threshold);
    }

    #[test]
    fn test_daily_metrics_bounded_by_shortest_series() {
        let mut series = BTreeMap::new();
        series.insert("a".to_string(), vec![point("d0", 10.0, 100.0), point("d1", 12.0, 200.0)]);
        series.insert("b".to_string(), vec![point("d0", 20.0, 300.0)]);

        let metrics = daily_metrics(&series, 30);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].date, "d0");
        assert_eq!(metrics[0].total_tvl, 400.0);
        assert_eq!(metrics[0].avg_apy, 15.0);
        assert_eq!(metrics[0].volume, 40.0);

        assert!(daily_metrics(&BTreeMap::new(), 30).is_empty());
        assert_eq!(aligned_days(&series, 0), 0);
    }

    #[test]
    fn test_profile_orderings() {
        let mut opportunities = vec![
            plain_opportunity(pool("risky", 30.0, 6.0), None),
            plain_opportunity(pool("safe_low", 8.0, 2.0), None),
            plain_opportunity(pool("safe_high", 12.0, 2.0), None),
        ];

        opportunities.sort_by(by_risk_then_apy);
        assert_eq!(opportunities[0].pool.id, "safe_high");
        assert_eq!(opportunities[2].pool.id, "risky");

        opportunities.sort_by(by_apy);
        assert_eq!(opportunities[0].pool.id, "risky");

        opportunities.sort_by(by_risk_adjusted_return);
        assert_eq!(opportunities[0].pool.id, "safe_high");
    }
}
