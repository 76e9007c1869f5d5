use defi_yield_advisor::{
    agents::{HelixAgent, HydroAgent, NeptuneAgent, ProtocolAgent},
    config::Settings,
    models::{ProtocolKind, RiskProfile},
    services::MarketDataCollector,
    utils::logging::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new();
    init_tracing(&settings.logging)?;

    info!(config_dir = %settings.config_dir.display(), "Starting DeFi yield advisor");

    let profile: RiskProfile = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => RiskProfile::default(),
    };

    let agents: Vec<Box<dyn ProtocolAgent>> = vec![
        Box::new(HelixAgent::from_config(settings.protocol(ProtocolKind::Helix).clone())?),
        Box::new(HydroAgent::from_config(settings.protocol(ProtocolKind::Hydro).clone())?),
        Box::new(NeptuneAgent::from_config(settings.protocol(ProtocolKind::Neptune).clone())?),
    ];

    for agent in &agents {
        let recommendations = agent.get_recommended_pools(profile).await;
        println!("{}", serde_json::to_string_pretty(&recommendations)?);

        let health = agent.get_protocol_health().await;
        info!(
            protocol = agent.protocol_id(),
            health_score = health.health_score,
            risk_score = health.risk_score,
            "Protocol health"
        );
    }

    let collector = MarketDataCollector::with_default_adapters(&settings)?;
    let stats = collector.get_protocol_stats(None).await?;
    for (protocol_id, stat) in &stats {
        info!(
            protocol = %protocol_id,
            total_tvl = stat.total_tvl,
            average_apy = stat.average_apy,
            pool_count = stat.pool_count,
            "Protocol stats"
        );
    }

    Ok(())
}
