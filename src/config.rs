use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const PITCH_LENGTH_M: f64 = 105.0;
pub const PITCH_WIDTH_M: f64 = 68.0;
pub const TRACKING_HZ: u32 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub pitch_length: f64,
    pub pitch_width: f64,
    pub tracking_hz: u32,
    /// Raw speeds above this (m/s) are treated as tracking glitches.
    pub max_speed: f64,
    pub smoothing_window: usize,
    pub sprint_threshold: f64,
    pub sprint_min_secs: u32,
    /// Samples with `Time_sec` at or below this are ignored by the fatigue detector.
    pub fatigue_warmup: usize,
    pub binseg_jump: usize,
    pub binseg_min_size: usize,
    #[serde(default)]
    pub home_team: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pitch_length: PITCH_LENGTH_M,
            pitch_width: PITCH_WIDTH_M,
            tracking_hz: TRACKING_HZ,
            max_speed: 12.0,
            smoothing_window: 7,
            sprint_threshold: 7.0,
            sprint_min_secs: 1,
            fatigue_warmup: 3000,
            binseg_jump: 5,
            binseg_min_size: 2,
            home_team: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            pitch_length: env_or("PITCH_LENGTH", d.pitch_length).max(1.0),
            pitch_width: env_or("PITCH_WIDTH", d.pitch_width).max(1.0),
            tracking_hz: env_or("TRACKING_HZ", d.tracking_hz).max(1),
            max_speed: env_or("MAX_SPEED_MS", d.max_speed),
            smoothing_window: env_or("SMOOTHING_WINDOW", d.smoothing_window).max(1),
            sprint_threshold: env_or("SPRINT_THRESHOLD_MS", d.sprint_threshold),
            sprint_min_secs: env_or("SPRINT_MIN_SECS", d.sprint_min_secs).max(1),
            fatigue_warmup: env_or("FATIGUE_WARMUP", d.fatigue_warmup),
            binseg_jump: env_or("BINSEG_JUMP", d.binseg_jump).max(1),
            binseg_min_size: env_or("BINSEG_MIN_SIZE", d.binseg_min_size).max(1),
            home_team: env::var("HOME_TEAM")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Consecutive samples a sprint must hold to count as sustained.
    pub fn sprint_window(&self) -> usize {
        self.sprint_min_secs.saturating_mul(self.tracking_hz) as usize
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Input files for one match load.
#[derive(Debug, Clone, Default)]
pub struct MatchPaths {
    pub lineups: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub tracking_home: Option<PathBuf>,
    pub tracking_away: Option<PathBuf>,
    pub teamsheet: Option<PathBuf>,
    pub workload_home: Option<PathBuf>,
    pub workload_away: Option<PathBuf>,
}

impl MatchPaths {
    /// CLI flags win over environment variables.
    pub fn resolve(args: &[String]) -> Self {
        Self {
            lineups: path_arg(args, "--lineups", "MATCH_LINEUPS"),
            events: path_arg(args, "--events", "MATCH_EVENTS"),
            tracking_home: path_arg(args, "--tracking-home", "TRACKING_HOME"),
            tracking_away: path_arg(args, "--tracking-away", "TRACKING_AWAY"),
            teamsheet: path_arg(args, "--teamsheet", "TEAMSHEET"),
            workload_home: path_arg(args, "--workload-home", "WORKLOAD_HOME"),
            workload_away: path_arg(args, "--workload-away", "WORKLOAD_AWAY"),
        }
    }
}

pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn path_arg(args: &[String], flag: &str, env_key: &str) -> Option<PathBuf> {
    flag_value(args, flag)
        .or_else(|| {
            env::var(env_key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .map(PathBuf::from)
}
