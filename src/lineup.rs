use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::extract::{ExtractedMatch, LineupEntry, LineupEvent};
use crate::pitch::{self, Formation, PitchGeometry, Side};

pub const GOAL_GLYPH: &str = "\u{26BD}";
pub const YELLOW_CARD_GLYPH: &str = "\u{1F7E8}";
pub const RED_CARD_GLYPH: &str = "\u{1F7E5}";
pub const SUB_OFF_GLYPH: &str = "\u{1F53B}";
pub const SUB_ON_GLYPH: &str = "\u{1F53A}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Pitch,
    /// Stacked beside the pitch; coordinates carry no tactical meaning.
    Bench,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMarker {
    None,
    SubbedOff,
    SubbedOn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineUpStatRow {
    pub team_id: u64,
    pub team_name: String,
    pub side: Side,
    pub player_id: u64,
    pub player_name: String,
    pub jersey_number: Option<u32>,
    pub goals: Option<u32>,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub position: String,
    pub position_id: u32,
    pub from_period: u8,
    pub from_minute: u32,
    pub from_display: String,
    pub x: f64,
    pub y: f64,
    pub placement: Placement,
    pub counterpart_id: Option<u64>,
    pub counterpart_name: Option<String>,
}

impl LineUpStatRow {
    pub fn sub_marker(&self) -> SubMarker {
        if self.from_minute != 0 {
            SubMarker::SubbedOn
        } else if self.counterpart_id.is_some() {
            SubMarker::SubbedOff
        } else {
            SubMarker::None
        }
    }

    pub fn on_pitch(&self) -> bool {
        self.placement == Placement::Pitch
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardTally {
    pub yellow: u32,
    pub red: u32,
}

/// Elapsed match minutes, rounded up, from a `HH:MM:SS.ffffff` clock.
pub fn match_minute(timestamp: &str) -> PipelineResult<u32> {
    let raw = timestamp.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| PipelineError::InvalidTimestamp(raw.to_string()))?;
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    Ok((seconds / 60.0).ceil() as u32)
}

fn period_cap(period: u8) -> u32 {
    match period {
        1 => 45,
        2 => 90,
        3 => 105,
        _ if period >= 4 => 120,
        _ => 90,
    }
}

/// Stoppage-aware minute label: `47` in the first half becomes `45'+2`.
pub fn format_match_minute(minute: u32, period: u8) -> String {
    let cap = period_cap(period);
    if minute > cap {
        format!("{cap}'+{}", minute - cap)
    } else {
        minute.to_string()
    }
}

pub fn tally_cards(events: &[LineupEvent]) -> HashMap<u64, CardTally> {
    let mut out: HashMap<u64, CardTally> = HashMap::new();
    for event in events {
        let (Some(player_id), Some(outcome)) = (event.player_id, event.outcome.as_deref()) else {
            continue;
        };
        if !outcome.contains("Card") {
            continue;
        }
        let tally = out.entry(player_id).or_default();
        match outcome.trim() {
            "Yellow Card" => tally.yellow += 1,
            "Red Card" => tally.red += 1,
            other => debug!(outcome = other, player_id, "card outcome not tallied"),
        }
    }
    out
}

/// Build one team's rows: starters on their formation slots, substitutes on
/// the bench stack, each with card counts and a formatted entry minute.
pub fn assemble_team(
    entries: &[&LineupEntry],
    formation: Formation,
    side: Side,
    events: &[LineupEvent],
    geometry: PitchGeometry,
) -> PipelineResult<Vec<LineUpStatRow>> {
    let slots = pitch::layout(formation, side, geometry);
    let cards = tally_cards(events);

    let starters: Vec<&LineupEntry> = entries.iter().copied().filter(|e| e.is_starter()).collect();
    let substitutes: Vec<&LineupEntry> = entries.iter().copied().filter(|e| e.is_substitute()).collect();

    for starter in &starters {
        if !formation.contains_position(&starter.position) {
            return Err(PipelineError::FormationMismatch {
                formation: formation.code().to_string(),
                position: starter.position.clone(),
            });
        }
    }

    let mut rows = Vec::with_capacity(starters.len() + substitutes.len());
    for slot in &slots {
        let mut matching = starters.iter().filter(|e| e.position == slot.position);
        let (Some(entry), None) = (matching.next(), matching.next()) else {
            return Err(PipelineError::FormationMismatch {
                formation: formation.code().to_string(),
                position: slot.position.clone(),
            });
        };
        rows.push(build_row(entry, side, slot.x, slot.y, Placement::Pitch, &cards)?);
    }

    for (idx, entry) in substitutes.iter().enumerate() {
        let (x, y) = pitch::bench_slot(idx + 1);
        rows.push(build_row(entry, side, x, y, Placement::Bench, &cards)?);
    }

    Ok(rows)
}

fn build_row(
    entry: &LineupEntry,
    side: Side,
    x: f64,
    y: f64,
    placement: Placement,
    cards: &HashMap<u64, CardTally>,
) -> PipelineResult<LineUpStatRow> {
    let minute = match_minute(&entry.from)?;
    let tally = cards.get(&entry.player_id).copied().unwrap_or_default();
    Ok(LineUpStatRow {
        team_id: entry.team_id,
        team_name: entry.team_name.clone(),
        side,
        player_id: entry.player_id,
        player_name: entry.display_name().to_string(),
        jersey_number: entry.jersey_number,
        goals: entry.goals(),
        yellow_cards: tally.yellow,
        red_cards: tally.red,
        position: entry.position.clone(),
        position_id: entry.position_id,
        from_period: entry.from_period,
        from_minute: minute,
        from_display: format_match_minute(minute, entry.from_period),
        x,
        y,
        placement,
        counterpart_id: entry.counterpart_id,
        counterpart_name: entry.counterpart_name.clone(),
    })
}

/// Home is the configured team when set, otherwise the first team in the document.
pub fn resolve_sides(team_names: &[String], home_team: Option<&str>) -> Vec<(String, Side)> {
    let home_idx = home_team
        .and_then(|home| team_names.iter().position(|t| t == home))
        .unwrap_or(0);
    team_names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let side = if idx == home_idx { Side::Home } else { Side::Away };
            (name.clone(), side)
        })
        .collect()
}

pub fn assemble_match(extracted: &ExtractedMatch, cfg: &AnalysisConfig) -> PipelineResult<Vec<LineUpStatRow>> {
    let geometry = PitchGeometry::from(cfg);
    let mut rows = Vec::new();
    for (team, side) in resolve_sides(&extracted.team_names(), cfg.home_team.as_deref()) {
        let code = extracted
            .starting_formation(&team)
            .ok_or_else(|| PipelineError::missing("formations.Starting XI"))?;
        let formation = code.parse::<Formation>()?;
        let entries: Vec<&LineupEntry> = extracted.lineup_for(&team).collect();
        debug!(team = %team, %side, %formation, players = entries.len(), "assembling lineup");
        rows.extend(assemble_team(&entries, formation, side, &extracted.events, geometry)?);
    }
    Ok(rows)
}

/// Glyph-decorated strings for the pitch diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMarkers {
    pub goals: String,
    pub yellow_cards: String,
    pub red_cards: String,
    pub player_name: String,
}

pub fn display_markers(row: &LineUpStatRow) -> DisplayMarkers {
    let player_name = match row.sub_marker() {
        SubMarker::None => row.player_name.clone(),
        SubMarker::SubbedOff => format!("{SUB_OFF_GLYPH}{}", row.player_name),
        SubMarker::SubbedOn => format!("{SUB_ON_GLYPH}{}", row.player_name),
    };
    DisplayMarkers {
        goals: GOAL_GLYPH.repeat(row.goals.unwrap_or(0) as usize),
        yellow_cards: YELLOW_CARD_GLYPH.repeat(row.yellow_cards as usize),
        red_cards: RED_CARD_GLYPH.repeat(row.red_cards as usize),
        player_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player_id: u64, position: &str, from: &str, start_reason: &str) -> LineupEntry {
        LineupEntry {
            team_id: 1,
            team_name: "Home FC".to_string(),
            player_id,
            player_name: format!("Player {player_id}"),
            player_nickname: None,
            birth_date: None,
            player_gender: None,
            player_height: None,
            player_weight: None,
            jersey_number: Some(player_id as u32),
            country_id: None,
            country_name: None,
            position_id: 1,
            position: position.to_string(),
            from: from.to_string(),
            to: None,
            from_period: 1,
            to_period: None,
            start_reason: start_reason.to_string(),
            end_reason: None,
            counterpart_id: None,
            counterpart_name: None,
            totals: None,
        }
    }

    fn card(player_id: u64, outcome: &str) -> LineupEvent {
        LineupEvent {
            team_id: 1,
            team_name: "Home FC".to_string(),
            player_id: Some(player_id),
            player_name: None,
            time: None,
            period: Some(1),
            event_type: None,
            outcome: Some(outcome.to_string()),
        }
    }

    fn starting_433() -> Vec<LineupEntry> {
        let mut out = vec![entry(1, "Goalkeeper", "00:00:00.000", "Starting XI")];
        for (i, line) in Formation::F433.lines().iter().enumerate() {
            for (j, pos) in line.iter().enumerate() {
                out.push(entry((10 * (i + 1) + j) as u64, pos, "00:00:00.000", "Starting XI"));
            }
        }
        out
    }

    #[test]
    fn minute_formatting_is_stoppage_aware() {
        assert_eq!(match_minute("00:47:00.000000").unwrap(), 47);
        assert_eq!(format_match_minute(47, 1), "45'+2");
        assert_eq!(format_match_minute(44, 1), "44");
        assert_eq!(format_match_minute(93, 2), "90'+3");
        assert_eq!(format_match_minute(90, 2), "90");
        // partial minutes round up
        assert_eq!(match_minute("00:47:12.0").unwrap(), 48);
        assert_eq!(match_minute("00:00:00.000").unwrap(), 0);
        assert!(match_minute("kick-off").is_err());
    }

    #[test]
    fn card_pivot_counts_per_type() {
        let events = vec![card(5, "Yellow Card"), card(5, "Yellow Card"), card(6, "Red Card")];
        let tally = tally_cards(&events);
        assert_eq!(tally[&5], CardTally { yellow: 2, red: 0 });
        assert_eq!(tally[&6], CardTally { yellow: 0, red: 1 });
        assert!(!tally.contains_key(&7));
    }

    #[test]
    fn assembles_starters_and_bench() {
        let mut entries = starting_433();
        let mut sub = entry(99, "Center Forward", "01:01:30.000", "Substitution - On");
        sub.from_period = 2;
        sub.counterpart_id = Some(31);
        entries.push(sub);
        entries[1].totals = Some(crate::extract::PlayerMatchTotals {
            goals: 1,
            ..Default::default()
        });
        let refs: Vec<&LineupEntry> = entries.iter().collect();
        let events = vec![card(99, "Yellow Card")];

        let rows = assemble_team(&refs, Formation::F433, Side::Home, &events, PitchGeometry::default()).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows.iter().filter(|r| r.on_pitch()).count(), 11);

        let bench = rows.iter().find(|r| r.player_id == 99).unwrap();
        assert_eq!(bench.placement, Placement::Bench);
        assert_eq!((bench.x, bench.y), (0.0, 2.0));
        assert_eq!(bench.yellow_cards, 1);
        assert_eq!(bench.from_minute, 62);
        assert_eq!(bench.from_display, "62");
        assert_eq!(bench.sub_marker(), SubMarker::SubbedOn);
    }

    #[test]
    fn position_outside_formation_fails() {
        let mut entries = starting_433();
        entries[3].position = "Center Back".to_string();
        let refs: Vec<&LineupEntry> = entries.iter().collect();
        let err = assemble_team(&refs, Formation::F433, Side::Home, &[], PitchGeometry::default()).unwrap_err();
        assert!(matches!(err, PipelineError::FormationMismatch { .. }));
    }

    #[test]
    fn markers_follow_counts_and_substitution_direction() {
        let mut entries = starting_433();
        entries[0].counterpart_id = Some(77);
        let refs: Vec<&LineupEntry> = entries.iter().collect();
        let events = vec![card(1, "Yellow Card"), card(1, "Yellow Card")];
        let rows = assemble_team(&refs, Formation::F433, Side::Away, &events, PitchGeometry::default()).unwrap();
        let keeper = &rows[0];
        let markers = display_markers(keeper);
        assert_eq!(markers.yellow_cards, format!("{YELLOW_CARD_GLYPH}{YELLOW_CARD_GLYPH}"));
        assert_eq!(markers.red_cards, "");
        assert_eq!(markers.goals, "");
        assert!(markers.player_name.starts_with(SUB_OFF_GLYPH));
    }

    #[test]
    fn configured_home_team_wins() {
        let teams = vec!["A".to_string(), "B".to_string()];
        let sides = resolve_sides(&teams, Some("B"));
        assert_eq!(sides[0].1, Side::Away);
        assert_eq!(sides[1].1, Side::Home);
        let default = resolve_sides(&teams, None);
        assert_eq!(default[0].1, Side::Home);
    }
}
