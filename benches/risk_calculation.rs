use criterion::{black_box, criterion_group, criterion_main, Criterion};
use defi_yield_advisor::{
    agents::{scoring, HelixAgent, NeptuneAgent, ProtocolAgent},
    config::ProtocolConfig,
    data::{baseline_pools, synthesize_history, SeriesProfile},
    models::{ProtocolKind, RiskProfile},
};

fn benchmark_history_synthesis(c: &mut Criterion) {
    let profile = SeriesProfile {
        base_apy: 28.5,
        base_tvl: 1_850_000.0,
        apy_noise: 0.08,
        apy_trend: 0.001,
        tvl_noise: 0.015,
        tvl_trend: 0.0005,
        volume_range: ProtocolKind::Helix.volume_fraction_range(),
    };

    c.bench_function("synthesize_history_90d", |b| {
        b.iter(|| synthesize_history(black_box("helix_usdc_inj"), black_box(&profile), black_box(90)))
    });
}

fn benchmark_ranking(c: &mut Criterion) {
    let pools: Vec<_> = ProtocolKind::ALL.iter().flat_map(|p| baseline_pools(*p)).collect();

    c.bench_function("rank_opportunities", |b| {
        b.iter(|| {
            let mut ranked: Vec<_> = black_box(&pools)
                .iter()
                .cloned()
                .map(|pool| scoring::plain_opportunity(pool, None))
                .collect();
            scoring::sort_by_ranking(&mut ranked);
            ranked
        })
    });
}

fn benchmark_agents(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let helix = HelixAgent::from_config(ProtocolConfig::for_protocol(ProtocolKind::Helix)).unwrap();
    let neptune = NeptuneAgent::from_config(ProtocolConfig::for_protocol(ProtocolKind::Neptune)).unwrap();

    c.bench_function("helix_analyze_opportunities", |b| {
        b.iter(|| runtime.block_on(helix.analyze_opportunities()))
    });

    c.bench_function("neptune_recommended_pools", |b| {
        b.iter(|| runtime.block_on(neptune.get_recommended_pools(black_box(RiskProfile::Moderate))))
    });

    c.bench_function("helix_risk_assessment", |b| {
        b.iter(|| runtime.block_on(helix.get_risk_assessment()))
    });
}

criterion_group!(benches, benchmark_history_synthesis, benchmark_ranking, benchmark_agents);
criterion_main!(benches);
