use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::pitch::Side;
use crate::tracking::{PlayerTrack, Teamsheet, TrackingTable};
use crate::velocity::VelocityEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedZone {
    Walking,
    Jogging,
    Running,
    Sprinting,
}

pub const SPEED_ZONES: [SpeedZone; 4] = [
    SpeedZone::Walking,
    SpeedZone::Jogging,
    SpeedZone::Running,
    SpeedZone::Sprinting,
];

impl SpeedZone {
    /// Half-open bands in m/s, lower bound inclusive.
    pub fn from_speed(speed: f64) -> Self {
        if speed < 2.0 {
            SpeedZone::Walking
        } else if speed < 4.0 {
            SpeedZone::Jogging
        } else if speed < 7.0 {
            SpeedZone::Running
        } else {
            SpeedZone::Sprinting
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedZone::Walking => "Walking [km]",
            SpeedZone::Jogging => "Jogging [km]",
            SpeedZone::Running => "Running [km]",
            SpeedZone::Sprinting => "Sprinting [km]",
        }
    }

    fn index(self) -> usize {
        match self {
            SpeedZone::Walking => 0,
            SpeedZone::Jogging => 1,
            SpeedZone::Running => 2,
            SpeedZone::Sprinting => 3,
        }
    }
}

/// Unrounded workload summary for one tracked player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStatRow {
    pub side: Side,
    pub tag: u32,
    pub jersey_number: Option<u32>,
    pub player_name: Option<String>,
    pub minutes_played: f64,
    pub distance_km: f64,
    pub walking_km: f64,
    pub jogging_km: f64,
    pub running_km: f64,
    pub sprinting_km: f64,
    pub sprints: u32,
}

impl PhysicalStatRow {
    pub fn zone_km(&self, zone: SpeedZone) -> f64 {
        match zone {
            SpeedZone::Walking => self.walking_km,
            SpeedZone::Jogging => self.jogging_km,
            SpeedZone::Running => self.running_km,
            SpeedZone::Sprinting => self.sprinting_km,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Span between first and last recorded sample; gaps inside the span count.
pub fn minutes_played(track: &PlayerTrack, hz: u32) -> f64 {
    match (track.first_valid(), track.last_valid()) {
        (Some(first), Some(last)) => (last - first + 1) as f64 / hz as f64 / 60.0,
        _ => 0.0,
    }
}

pub fn distance_km(speed: &[Option<f64>], hz: u32) -> f64 {
    speed.iter().flatten().sum::<f64>() / hz as f64 / 1000.0
}

pub fn zone_distances(speed: &[Option<f64>], hz: u32) -> [f64; 4] {
    let mut out = [0.0; 4];
    for s in speed.iter().flatten() {
        out[SpeedZone::from_speed(*s).index()] += s;
    }
    out.map(|sum| sum / hz as f64 / 1000.0)
}

/// Rising edges of a centred `window`-sample indicator that is set only where
/// every sample in the window is at or above `threshold`.
pub fn sustained_sprints(speed: &[Option<f64>], threshold: f64, window: usize) -> u32 {
    let n = speed.len();
    if window == 0 || n < window {
        return 0;
    }
    let mut prefix = vec![0usize; n + 1];
    for (i, s) in speed.iter().enumerate() {
        let hit = s.is_some_and(|v| v >= threshold);
        prefix[i + 1] = prefix[i] + usize::from(hit);
    }
    let reach = (window - 1) / 2;
    let full = |i: usize| -> bool {
        let hi = i + reach;
        if hi >= n || hi + 1 < window {
            return false;
        }
        let lo = hi + 1 - window;
        prefix[hi + 1] - prefix[lo] == window
    };

    let mut count = 0;
    let mut prev = full(0);
    for i in 1..n {
        let now = full(i);
        if now && !prev {
            count += 1;
        }
        prev = now;
    }
    count
}

pub fn aggregate(
    table: &TrackingTable,
    teamsheet: &Teamsheet,
    estimator: &dyn VelocityEstimator,
    cfg: &AnalysisConfig,
) -> Vec<PhysicalStatRow> {
    let hz = cfg.tracking_hz;
    let sprint_window = cfg.sprint_window();
    let rows: Vec<PhysicalStatRow> = table
        .players
        .par_iter()
        .map(|track| {
            let velocity = estimator.estimate(table, track);
            let zones = zone_distances(&velocity.speed, hz);
            let entry = teamsheet.entry(table.side, track.tag);
            PhysicalStatRow {
                side: table.side,
                tag: track.tag,
                jersey_number: entry.map(|e| e.jersey_number),
                player_name: entry.map(|e| e.player.clone()),
                minutes_played: minutes_played(track, hz),
                distance_km: distance_km(&velocity.speed, hz),
                walking_km: zones[0],
                jogging_km: zones[1],
                running_km: zones[2],
                sprinting_km: zones[3],
                sprints: sustained_sprints(&velocity.speed, cfg.sprint_threshold, sprint_window),
            }
        })
        .collect();
    debug!(side = %table.side, players = rows.len(), "physical aggregates");
    rows
}
