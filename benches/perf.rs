use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchday_analytics::config::AnalysisConfig;
use matchday_analytics::events::{EventKind, MatchEvent};
use matchday_analytics::fake_match::{FakeMatchSpec, fake_teamsheet, fake_tracking, fake_workload};
use matchday_analytics::fatigue::{BinsegParams, binseg_predict};
use matchday_analytics::physical;
use matchday_analytics::pitch::Side;
use matchday_analytics::technical;
use matchday_analytics::velocity::{SmoothedVelocity, VelocityEstimator};

fn short_match() -> FakeMatchSpec {
    FakeMatchSpec {
        seconds: 10 * 60,
        ..Default::default()
    }
}

fn sample_events(n: usize) -> Vec<MatchEvent> {
    const KINDS: [&str; 8] = [
        "Pass",
        "Shot",
        "Duel",
        "Interception",
        "Clearance",
        "Carry",
        "Miscontrol",
        "Foul Committed",
    ];
    (0..n)
        .map(|i| {
            let player = (i % 22) as u64;
            let team = if player < 11 { "Home FC" } else { "Away FC" };
            let mut event = MatchEvent::new(
                team,
                Some(player),
                Some("Player"),
                EventKind::from_label(KINDS[i % KINDS.len()]),
            );
            if i % 5 == 0 {
                event.pass_outcome = Some("Incomplete".to_string());
            }
            event
        })
        .collect()
}

fn bench_velocity(c: &mut Criterion) {
    let table = fake_tracking(Side::Home, short_match());
    let estimator = SmoothedVelocity::default();
    c.bench_function("velocity_one_player", |b| {
        b.iter(|| {
            let v = estimator.estimate(black_box(&table), &table.players[0]);
            black_box(v.speed.len());
        })
    });
}

fn bench_physical(c: &mut Criterion) {
    let spec = short_match();
    let table = fake_tracking(Side::Home, spec);
    let sheet = fake_teamsheet(spec);
    let cfg = AnalysisConfig::default();
    let estimator = SmoothedVelocity::from(&cfg);
    c.bench_function("physical_aggregate", |b| {
        b.iter(|| {
            let rows = physical::aggregate(black_box(&table), &sheet, &estimator, &cfg);
            black_box(rows.len());
        })
    });
}

fn bench_technical(c: &mut Criterion) {
    let events = sample_events(3500);
    c.bench_function("technical_aggregate", |b| {
        b.iter(|| {
            let rows = technical::aggregate(black_box(&events));
            black_box(rows.len());
        })
    });
}

fn bench_binseg(c: &mut Criterion) {
    let workload = fake_workload(Side::Home, FakeMatchSpec::default());
    let (_, series) = &workload.series[0];
    c.bench_function("binseg_single_split", |b| {
        b.iter(|| {
            let bkps = binseg_predict(black_box(series), 1, BinsegParams::default()).unwrap();
            black_box(bkps);
        })
    });
}

criterion_group!(benches, bench_velocity, bench_physical, bench_technical, bench_binseg);
criterion_main!(benches);
