use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, PITCH_LENGTH_M, PITCH_WIDTH_M};
use crate::error::PipelineError;

pub const YARDS_TO_METERS: f64 = 1.09361;
pub const PENALTY_BOX_YARDS: f64 = 18.0;
pub const GOALKEEPER: &str = "Goalkeeper";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The formations the pitch diagram knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    F433,
    F343,
    F4141,
    F4231,
    F442,
    F4411,
    F3412,
}

pub const SUPPORTED_FORMATIONS: [Formation; 7] = [
    Formation::F433,
    Formation::F343,
    Formation::F4141,
    Formation::F4231,
    Formation::F442,
    Formation::F4411,
    Formation::F3412,
];

impl Formation {
    pub fn code(self) -> &'static str {
        match self {
            Formation::F433 => "433",
            Formation::F343 => "343",
            Formation::F4141 => "4141",
            Formation::F4231 => "4231",
            Formation::F442 => "442",
            Formation::F4411 => "4411",
            Formation::F3412 => "3412",
        }
    }

    /// Outfield lines from defence to attack, each listed left to right.
    pub fn lines(self) -> &'static [&'static [&'static str]] {
        match self {
            Formation::F433 => &[
                &["Left Back", "Left Center Back", "Right Center Back", "Right Back"],
                &["Left Center Midfield", "Center Defensive Midfield", "Right Center Midfield"],
                &["Left Wing", "Center Forward", "Right Wing"],
            ],
            Formation::F343 => &[
                &["Left Center Back", "Center Back", "Right Center Back"],
                &["Left Wing Back", "Left Defensive Midfield", "Right Defensive Midfield", "Right Wing Back"],
                &["Left Wing", "Center Forward", "Right Wing"],
            ],
            Formation::F4141 => &[
                &["Left Back", "Left Center Back", "Right Center Back", "Right Back"],
                &["Center Defensive Midfield"],
                &["Left Midfield", "Left Center Midfield", "Right Center Midfield", "Right Midfield"],
                &["Center Forward"],
            ],
            Formation::F4231 => &[
                &["Left Back", "Left Center Back", "Right Center Back", "Right Back"],
                &["Left Defensive Midfield", "Right Defensive Midfield"],
                &["Left Wing", "Center Attacking Midfield", "Right Wing"],
                &["Center Forward"],
            ],
            Formation::F442 => &[
                &["Left Back", "Left Center Back", "Right Center Back", "Right Back"],
                &["Left Midfield", "Left Defensive Midfield", "Right Defensive Midfield", "Right Midfield"],
                &["Left Center Forward", "Right Center Forward"],
            ],
            Formation::F4411 => &[
                &["Left Back", "Left Center Back", "Right Center Back", "Right Back"],
                &["Left Midfield", "Left Defensive Midfield", "Right Defensive Midfield", "Right Midfield"],
                &["Center Attacking Midfield"],
                &["Center Forward"],
            ],
            Formation::F3412 => &[
                &["Left Center Back", "Center Back", "Right Center Back"],
                &["Left Wing Back", "Left Defensive Midfield", "Right Defensive Midfield", "Right Wing Back"],
                &["Center Attacking Midfield"],
                &["Left Center Forward", "Right Center Forward"],
            ],
        }
    }

    pub fn line_counts(self) -> Vec<usize> {
        self.lines().iter().map(|line| line.len()).collect()
    }

    pub fn contains_position(self, position: &str) -> bool {
        position == GOALKEEPER || self.lines().iter().any(|line| line.contains(&position))
    }
}

impl FromStr for Formation {
    type Err = PipelineError;

    /// Accepts `"433"`, `"4-3-3"` or `" 433 "`; anything outside the seven
    /// drawable formations is rejected rather than guessed.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        SUPPORTED_FORMATIONS
            .iter()
            .copied()
            .find(|f| f.code() == code)
            .ok_or_else(|| PipelineError::UnsupportedFormation(raw.trim().to_string()))
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchGeometry {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchGeometry {
    fn default() -> Self {
        Self {
            length: PITCH_LENGTH_M,
            width: PITCH_WIDTH_M,
        }
    }
}

impl From<&AnalysisConfig> for PitchGeometry {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            length: cfg.pitch_length,
            width: cfg.pitch_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchSlot {
    pub position: String,
    pub x: f64,
    pub y: f64,
}

/// Slice midpoints across the pitch width for a line of `n` players.
pub fn x_coords(n: usize, width: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let slice = width / n as f64;
    (0..n).map(|i| i as f64 * slice + slice / 2.0).collect()
}

/// Goalkeeper depth followed by one depth per outfield line.
pub fn y_coords(n_lines: usize, length: f64) -> Vec<f64> {
    let penalty_box = PENALTY_BOX_YARDS / YARDS_TO_METERS;
    let penalty_spot = 2.0 * penalty_box / 3.0;
    let mid_span = length / 2.0 - penalty_spot - length / 10.0;
    let mut out = Vec::with_capacity(n_lines + 1);
    out.push(penalty_spot);
    for i in 1..=n_lines {
        out.push(penalty_spot + i as f64 * mid_span / n_lines as f64);
    }
    out
}

pub fn layout(formation: Formation, side: Side, geometry: PitchGeometry) -> Vec<PitchSlot> {
    let lines = formation.lines();
    let depths = y_coords(lines.len(), geometry.length);
    let mirror = |y: f64| match side {
        Side::Home => y,
        Side::Away => geometry.length - y,
    };

    let mut slots = Vec::with_capacity(11);
    slots.push(PitchSlot {
        position: GOALKEEPER.to_string(),
        x: geometry.width / 2.0,
        y: mirror(depths[0]),
    });
    for (line, depth) in lines.iter().zip(depths.iter().skip(1)) {
        for (name, x) in line.iter().zip(x_coords(line.len(), geometry.width)) {
            slots.push(PitchSlot {
                position: (*name).to_string(),
                x,
                y: mirror(*depth),
            });
        }
    }
    slots
}

/// Off-pitch stacking for the `rank`-th substitute (1-based). Purely visual.
pub fn bench_slot(rank: usize) -> (f64, f64) {
    (0.0, 2.0 * rank as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_formation_fields_eleven_distinct_slots() {
        for formation in SUPPORTED_FORMATIONS {
            let digits: usize = formation
                .code()
                .chars()
                .map(|c| c.to_digit(10).unwrap() as usize)
                .sum();
            assert_eq!(digits, 10, "{formation}");
            assert_eq!(formation.line_counts().iter().sum::<usize>(), 10);

            let slots = layout(formation, Side::Home, PitchGeometry::default());
            assert_eq!(slots.len(), 11, "{formation}");
            for (i, a) in slots.iter().enumerate() {
                for b in slots.iter().skip(i + 1) {
                    assert!(
                        (a.x - b.x).abs() > 1e-9 || (a.y - b.y).abs() > 1e-9,
                        "{formation}: {} and {} overlap",
                        a.position,
                        b.position
                    );
                    assert_ne!(a.position, b.position);
                }
            }
        }
    }

    #[test]
    fn goalkeeper_slot_433() {
        let y_gk = (2.0 * (18.0 / 1.09361)) / 3.0;
        let home = layout(Formation::F433, Side::Home, PitchGeometry::default());
        assert_eq!(home[0].position, GOALKEEPER);
        assert!((home[0].x - 34.0).abs() < 1e-9);
        assert!((home[0].y - y_gk).abs() < 1e-9);

        let away = layout(Formation::F433, Side::Away, PitchGeometry::default());
        assert!((away[0].y - (105.0 - y_gk)).abs() < 1e-9);
    }

    #[test]
    fn away_is_mirror_of_home() {
        for formation in SUPPORTED_FORMATIONS {
            let home = layout(formation, Side::Home, PitchGeometry::default());
            let away = layout(formation, Side::Away, PitchGeometry::default());
            for (h, a) in home.iter().zip(away.iter()) {
                assert_eq!(h.position, a.position);
                assert!((h.x - a.x).abs() < 1e-9);
                assert!((a.y - (105.0 - h.y)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn x_coords_are_slice_midpoints() {
        assert_eq!(x_coords(4, 68.0), vec![8.5, 25.5, 42.5, 59.5]);
        assert_eq!(x_coords(1, 68.0), vec![34.0]);
    }

    #[test]
    fn unsupported_code_fails() {
        assert!(matches!(
            "532".parse::<Formation>(),
            Err(PipelineError::UnsupportedFormation(_))
        ));
        assert_eq!("4-2-3-1".parse::<Formation>().unwrap(), Formation::F4231);
    }

    #[test]
    fn bench_slots_stack_by_two() {
        assert_eq!(bench_slot(1), (0.0, 2.0));
        assert_eq!(bench_slot(3), (0.0, 6.0));
    }
}
