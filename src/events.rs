use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PipelineResult;

/// Outcome labels counted as a won contest (tackle, duel, interception).
pub const SUCCESS_OUTCOMES: [&str; 4] = ["Success In Play", "Won", "Success Out", "Success"];

/// Pass outcomes that are not real pass attempts.
pub const IGNORED_PASS_OUTCOMES: [&str; 2] = ["Injury Clearance", "Unknown"];

pub const PASS_OFFSIDE: &str = "Pass Offside";

const UNTRACKED_TYPES: &[&str] = &[
    "Starting XI",
    "Half Start",
    "Half End",
    "Ball Receipt*",
    "Carry",
    "Pressure",
    "Ball Recovery",
    "Block",
    "Dribble",
    "Dribbled Past",
    "Goal Keeper",
    "Foul Won",
    "Substitution",
    "Tactical Shift",
    "Injury Stoppage",
    "Player Off",
    "Player On",
    "Referee Ball-Drop",
    "Shield",
    "50/50",
    "Bad Behaviour",
    "Error",
    "Own Goal Against",
    "Own Goal For",
    "Camera On",
    "Camera off",
    "Camera Off",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Shot,
    Pass,
    Duel,
    FoulCommitted,
    Interception,
    Clearance,
    Dispossessed,
    Miscontrol,
    Offside,
    /// A known event type that no technical counter reads.
    Untracked(String),
    Unrecognized(String),
}

impl EventKind {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim() {
            "Shot" => EventKind::Shot,
            "Pass" => EventKind::Pass,
            "Duel" => EventKind::Duel,
            "Foul Committed" => EventKind::FoulCommitted,
            "Interception" => EventKind::Interception,
            "Clearance" => EventKind::Clearance,
            "Dispossessed" => EventKind::Dispossessed,
            "Miscontrol" => EventKind::Miscontrol,
            "Offside" => EventKind::Offside,
            other if UNTRACKED_TYPES.contains(&other) => EventKind::Untracked(other.to_string()),
            other => EventKind::Unrecognized(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventKind::Shot => "Shot",
            EventKind::Pass => "Pass",
            EventKind::Duel => "Duel",
            EventKind::FoulCommitted => "Foul Committed",
            EventKind::Interception => "Interception",
            EventKind::Clearance => "Clearance",
            EventKind::Dispossessed => "Dispossessed",
            EventKind::Miscontrol => "Miscontrol",
            EventKind::Offside => "Offside",
            EventKind::Untracked(s) | EventKind::Unrecognized(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelType {
    Tackle,
    AerialLost,
    Other(String),
}

impl DuelType {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim() {
            "Tackle" => DuelType::Tackle,
            "Aerial Lost" => DuelType::AerialLost,
            other => DuelType::Other(other.to_string()),
        }
    }
}

pub fn is_success(outcome: Option<&str>) -> bool {
    outcome.is_some_and(|o| SUCCESS_OUTCOMES.contains(&o))
}

/// One flattened row of the match event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub index: Option<u64>,
    pub period: Option<u8>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub team_id: Option<u64>,
    pub team_name: String,
    pub player_id: Option<u64>,
    pub player_name: Option<String>,
    pub position_id: Option<u32>,
    pub kind: EventKind,
    pub shot_outcome: Option<String>,
    pub pass_outcome: Option<String>,
    pub pass_cross: bool,
    pub duel_type: Option<DuelType>,
    pub duel_outcome: Option<String>,
    pub interception_outcome: Option<String>,
    pub card: Option<String>,
}

impl MatchEvent {
    pub fn new(team_name: &str, player_id: Option<u64>, player_name: Option<&str>, kind: EventKind) -> Self {
        Self {
            index: None,
            period: None,
            minute: None,
            second: None,
            team_id: None,
            team_name: team_name.to_string(),
            player_id,
            player_name: player_name.map(str::to_string),
            position_id: None,
            kind,
            shot_outcome: None,
            pass_outcome: None,
            pass_cross: false,
            duel_type: None,
            duel_outcome: None,
            interception_outcome: None,
            card: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    #[serde(default)]
    id: Option<u64>,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutcomeBlock {
    #[serde(default)]
    outcome: Option<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPass {
    #[serde(default)]
    outcome: Option<RawNamed>,
    #[serde(default)]
    cross: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDuel {
    #[serde(rename = "type", default)]
    duel_type: Option<RawNamed>,
    #[serde(default)]
    outcome: Option<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCardBlock {
    #[serde(default)]
    card: Option<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    index: Option<u64>,
    #[serde(default)]
    period: Option<u8>,
    #[serde(default)]
    minute: Option<u32>,
    #[serde(default)]
    second: Option<u32>,
    #[serde(rename = "type")]
    event_type: RawNamed,
    #[serde(default)]
    team: Option<RawNamed>,
    #[serde(default)]
    player: Option<RawNamed>,
    #[serde(default)]
    position: Option<RawNamed>,
    #[serde(default)]
    shot: Option<RawOutcomeBlock>,
    #[serde(default)]
    pass: Option<RawPass>,
    #[serde(default)]
    duel: Option<RawDuel>,
    #[serde(default)]
    interception: Option<RawOutcomeBlock>,
    #[serde(default)]
    foul_committed: Option<RawCardBlock>,
    #[serde(default)]
    bad_behaviour: Option<RawCardBlock>,
}

fn outcome_name(block: Option<RawOutcomeBlock>) -> Option<String> {
    block.and_then(|b| b.outcome).map(|o| o.name)
}

impl From<RawEvent> for MatchEvent {
    fn from(raw: RawEvent) -> Self {
        let (team_id, team_name) = match raw.team {
            Some(team) => (team.id, team.name),
            None => (None, String::new()),
        };
        let (player_id, player_name) = match raw.player {
            Some(player) => (player.id, Some(player.name)),
            None => (None, None),
        };
        let pass = raw.pass.unwrap_or_default();
        let duel = raw.duel.unwrap_or_default();
        let card = raw
            .foul_committed
            .and_then(|b| b.card)
            .or_else(|| raw.bad_behaviour.and_then(|b| b.card))
            .map(|c| c.name);

        MatchEvent {
            index: raw.index,
            period: raw.period,
            minute: raw.minute,
            second: raw.second,
            team_id,
            team_name,
            player_id,
            player_name,
            position_id: raw.position.and_then(|p| p.id).map(|id| id as u32),
            kind: EventKind::from_label(&raw.event_type.name),
            shot_outcome: outcome_name(raw.shot),
            pass_outcome: pass.outcome.map(|o| o.name),
            pass_cross: pass.cross.unwrap_or(false),
            duel_type: duel.duel_type.map(|t| DuelType::from_label(&t.name)),
            duel_outcome: duel.outcome.map(|o| o.name),
            interception_outcome: outcome_name(raw.interception),
            card,
        }
    }
}

/// Parse a StatsBomb event export into flat rows. `null` yields no events.
pub fn parse_events_json(raw: &str) -> PipelineResult<Vec<MatchEvent>> {
    let parsed = serde_json::from_str::<Option<Vec<RawEvent>>>(raw)?;
    let events: Vec<MatchEvent> = parsed
        .unwrap_or_default()
        .into_iter()
        .map(MatchEvent::from)
        .collect();
    for tag in unrecognized_event_types(&events) {
        warn!(event_type = %tag, "unrecognized event type, no counter reads it");
    }
    Ok(events)
}

pub fn unrecognized_event_types(events: &[MatchEvent]) -> BTreeSet<String> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Unrecognized(tag) => Some(tag.clone()),
            _ => None,
        })
        .collect()
}
