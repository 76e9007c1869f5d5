use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::models::HistoricalPoint;
use crate::utils::math::round_to;
use crate::utils::time::iso_date_days_ago;

pub const MIN_APY: f64 = 0.1;
pub const MIN_TVL: f64 = 1000.0;
/// Longest series any source serves, ten years of daily points
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Shape of a generated series around a pool's baseline.
///
/// Noise terms are half-amplitudes relative to the baseline, trends are the
/// relative decline per day going back in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesProfile {
    pub base_apy: f64,
    pub base_tvl: f64,
    pub apy_noise: f64,
    pub apy_trend: f64,
    pub tvl_noise: f64,
    pub tvl_trend: f64,
    /// Daily volume as a fraction of TVL, `(low, high)`
    pub volume_range: (f64, f64),
}

/// Stable 64-bit seed derived from a pool identifier
pub fn seed_for(pool_id: &str) -> u64 {
    let digest = Sha256::digest(pool_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Generator seeded from a pool identifier
pub fn seeded_rng(pool_id: &str) -> StdRng {
    StdRng::seed_from_u64(seed_for(pool_id))
}

/// Build `days` points for a pool, most recent first.
///
/// Identical `(pool_id, profile, days)` inputs always produce identical values.
/// `days` is capped at [`MAX_HISTORY_DAYS`].
pub fn synthesize_history(pool_id: &str, profile: &SeriesProfile, days: u32) -> Vec<HistoricalPoint> {
    let days = days.min(MAX_HISTORY_DAYS);
    let mut rng = seeded_rng(pool_id);
    let (volume_low, volume_high) = profile.volume_range;

    (0..days)
        .map(|i| {
            let day = i as f64;

            let apy_noise = (rng.gen::<f64>() - 0.5) * 2.0 * profile.apy_noise * profile.base_apy;
            let apy = (profile.base_apy * (1.0 - profile.apy_trend * day) + apy_noise).max(MIN_APY);

            let tvl_noise = (rng.gen::<f64>() - 0.5) * 2.0 * profile.tvl_noise * profile.base_tvl;
            let tvl = (profile.base_tvl * (1.0 - profile.tvl_trend * day) + tvl_noise).max(MIN_TVL);

            let volume_fraction = if volume_high > volume_low {
                rng.gen_range(volume_low..volume_high)
            } else {
                volume_low
            };

            HistoricalPoint {
                date: iso_date_days_ago(i as i64),
                apy: round_to(apy, 2),
                tvl: round_to(tvl, 0),
                volume_24h: round_to(tvl * volume_fraction, 0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SeriesProfile {
        SeriesProfile {
            base_apy: 28.5,
            base_tvl: 1_850_000.0,
            apy_noise: 0.08,
            apy_trend: 0.001,
            tvl_noise: 0.015,
            tvl_trend: 0.0005,
            volume_range: (0.05, 0.15),
        }
    }

    #[test]
    fn test_same_pool_same_series() {
        let first = synthesize_history("helix_usdc_inj", &profile(), 30);
        let second = synthesize_history("helix_usdc_inj", &profile(), 30);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_pools_diverge() {
        let a = synthesize_history("helix_usdc_inj", &profile(), 10);
        let b = synthesize_history("helix_usdc_atom", &profile(), 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_days_capped() {
        let series = synthesize_history("helix_usdc_inj", &profile(), u32::MAX);
        assert_eq!(series.len(), MAX_HISTORY_DAYS as usize);
    }

    #[test]
    fn test_length_and_floors() {
        let mut tiny = profile();
        tiny.base_apy = 0.01;
        tiny.base_tvl = 10.0;
        let series = synthesize_history("tiny", &tiny, 45);
        assert_eq!(series.len(), 45);
        assert!(series.iter().all(|p| p.apy >= MIN_APY && p.tvl >= MIN_TVL));
        assert!(synthesize_history("tiny", &tiny, 0).is_empty());
    }

    #[test]
    fn test_volume_within_fraction_range() {
        for point in synthesize_history("helix_usdc_usdt", &profile(), 20) {
            assert!(point.volume_24h >= point.tvl * 0.05 - 1.0);
            assert!(point.volume_24h <= point.tvl * 0.15 + 1.0);
        }
    }

    #[test]
    fn test_most_recent_first() {
        let series = synthesize_history("helix_usdc_inj", &profile(), 3);
        assert!(series[0].date > series[1].date);
        assert!(series[1].date > series[2].date);
    }
}
