use super::traits::ProtocolAgent;
use crate::models::ProtocolHealth;
use crate::utils::math::{round_to, stability_score};

pub const HEALTH_WINDOW_DAYS: u32 = 30;
pub const TVL_STABILITY_SCALE: f64 = 100.0;
pub const APY_STABILITY_SCALE: f64 = 50.0;
pub const NEUTRAL_HEALTH: f64 = 5.0;

/// `0.4 * (10 - risk) + 0.3 * tvl_stability + 0.3 * apy_stability`, one decimal
pub fn health_score(risk: f64, tvl_stability: f64, apy_stability: f64) -> f64 {
    round_to((10.0 - risk) * 0.4 + tvl_stability * 0.3 + apy_stability * 0.3, 1)
}

/// Health from the agent's risk assessment and 30 days of history
pub async fn protocol_health<A>(agent: &A) -> ProtocolHealth
where
    A: ProtocolAgent + ?Sized,
{
    let risk = agent.get_risk_assessment().await;
    let history = agent.get_historical_performance(HEALTH_WINDOW_DAYS).await;

    if let Some(error) = history.error {
        tracing::error!(protocol = agent.protocol_id(), error = %error, "Protocol health unavailable");
        return ProtocolHealth {
            protocol_id: agent.protocol_id().to_string(),
            risk_score: risk.overall_risk,
            tvl_stability: NEUTRAL_HEALTH,
            apy_stability: NEUTRAL_HEALTH,
            health_score: NEUTRAL_HEALTH,
            analysis_timestamp: history.timestamp,
            error: Some(error),
        };
    }

    let tvl_stability = stability_score(&history.tvl_values(), TVL_STABILITY_SCALE);
    let apy_stability = stability_score(&history.apy_values(), APY_STABILITY_SCALE);
    let health_score = health_score(risk.overall_risk, tvl_stability, apy_stability);

    tracing::debug!(
        protocol = agent.protocol_id(),
        risk = risk.overall_risk,
        tvl_stability,
        apy_stability,
        health_score,
        "Computed protocol health"
    );

    ProtocolHealth {
        protocol_id: agent.protocol_id().to_string(),
        risk_score: risk.overall_risk,
        tvl_stability,
        apy_stability,
        health_score,
        analysis_timestamp: history.timestamp,
        error: risk.error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_score_weights() {
        // 0.4*6 + 0.3*9 + 0.3*8
        assert_eq!(health_score(4.0, 9.0, 8.0), 7.5);
        assert_eq!(health_score(10.0, 1.0, 1.0), 0.6);
    }
}
