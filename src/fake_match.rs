use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{PITCH_LENGTH_M, PITCH_WIDTH_M};
use crate::pitch::Side;
use crate::tracking::{PlayerTrack, Teamsheet, TeamsheetEntry, TrackingTable, WorkloadTable};

/// Shape of a seeded synthetic match, for benches and demo runs.
#[derive(Debug, Clone, Copy)]
pub struct FakeMatchSpec {
    pub players: usize,
    pub seconds: u32,
    pub hz: u32,
    pub seed: u64,
}

impl Default for FakeMatchSpec {
    fn default() -> Self {
        Self {
            players: 14,
            seconds: 90 * 60,
            hz: 25,
            seed: 7,
        }
    }
}

const FIRST_NAMES: [&str; 8] = ["Alex", "Sam", "Jo", "Kim", "Lee", "Robin", "Casey", "Drew"];
const SURNAMES: [&str; 8] = ["Hart", "Moss", "Reid", "Shaw", "Vale", "Wood", "Lane", "Cole"];

pub fn fake_teamsheet(spec: FakeMatchSpec) -> Teamsheet {
    let entries: Vec<TeamsheetEntry> = (0..spec.players)
        .map(|i| TeamsheetEntry {
            jersey_number: i as u32 + 1,
            player: format!(
                "{}. {}{}",
                &FIRST_NAMES[i % FIRST_NAMES.len()][..1],
                SURNAMES[i % SURNAMES.len()],
                if i >= SURNAMES.len() { "son" } else { "" }
            ),
        })
        .collect();
    Teamsheet {
        home: entries.clone(),
        away: entries,
    }
}

/// Random-walk positions. The first eleven play from kick-off; the rest come
/// on at a random point in the second half and one starter leaves for each.
pub fn fake_tracking(side: Side, spec: FakeMatchSpec) -> TrackingTable {
    let mut rng = StdRng::seed_from_u64(spec.seed ^ side_seed(side));
    let n = (spec.seconds * spec.hz) as usize;
    let dt = 1.0 / spec.hz as f64;
    let periods: Vec<u8> = (0..n).map(|i| if i < n / 2 { 1 } else { 2 }).collect();
    let times: Vec<f64> = (0..n).map(|i| (i + 1) as f64 * dt).collect();

    let starters = spec.players.min(11);
    let mut spans: Vec<(usize, usize)> = vec![(0, n); spec.players];
    for sub in starters..spec.players {
        let on = rng.gen_range(n / 2..n.max(n / 2 + 1));
        spans[sub] = (on, n);
        let off = sub - starters;
        if off < starters {
            spans[off].1 = on;
        }
    }

    let players = spans
        .iter()
        .enumerate()
        .map(|(tag, (on, off))| {
            let mut x = vec![None; n];
            let mut y = vec![None; n];
            let mut px = rng.gen_range(5.0..PITCH_WIDTH_M - 5.0);
            let mut py = rng.gen_range(5.0..PITCH_LENGTH_M - 5.0);
            let mut speed: f64 = rng.gen_range(1.0..3.0);
            let mut heading: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            for i in *on..*off {
                if rng.gen_bool(0.02) {
                    speed = if rng.gen_bool(0.1) {
                        rng.gen_range(7.0..9.0)
                    } else {
                        rng.gen_range(0.5..5.0)
                    };
                    heading = rng.gen_range(0.0..std::f64::consts::TAU);
                }
                px = (px + speed * heading.cos() * dt).clamp(0.0, PITCH_WIDTH_M);
                py = (py + speed * heading.sin() * dt).clamp(0.0, PITCH_LENGTH_M);
                x[i] = Some(px);
                y[i] = Some(py);
            }
            PlayerTrack {
                tag: tag as u32,
                x,
                y,
            }
        })
        .collect();

    TrackingTable {
        side,
        periods,
        times: Some(times),
        players,
    }
}

/// One-hertz metabolic power with a drop at a random second-half point.
pub fn fake_workload(side: Side, spec: FakeMatchSpec) -> WorkloadTable {
    let mut rng = StdRng::seed_from_u64(spec.seed ^ side_seed(side) ^ 0x5eed);
    let n = spec.seconds as usize;
    let half = n / 2;
    let series = (0..spec.players)
        .map(|tag| {
            let drop_at = rng.gen_range(half..n.max(half + 1));
            let base = rng.gen_range(8.0..12.0);
            let tired = base * rng.gen_range(0.5..0.8);
            let values = (0..n)
                .map(|i| {
                    let level = if i < drop_at { base } else { tired };
                    level + rng.gen_range(-0.5..0.5)
                })
                .collect();
            (WorkloadTable::column_name(side, tag as u32), values)
        })
        .collect();
    WorkloadTable {
        periods: (0..n).map(|i| if i < half { 1 } else { 2 }).collect(),
        time_sec: (1..=n).map(|i| i as f64).collect(),
        official_clock: (1..=n).map(|i| format!("{:02}:{:02}", i / 60, i % 60)).collect(),
        series,
    }
}

fn side_seed(side: Side) -> u64 {
    match side {
        Side::Home => 0x686f6d65,
        Side::Away => 0x61776179,
    }
}
