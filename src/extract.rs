use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

pub const STARTING_XI: &str = "Starting XI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationRow {
    pub team_id: u64,
    pub team_name: String,
    pub period: Option<u8>,
    pub time: Option<String>,
    pub formation: String,
    pub reason: String,
}

/// Per-player match totals carried alongside the lineup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMatchTotals {
    #[serde(default)]
    pub own_goals: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub penalties_scored: u32,
    #[serde(default)]
    pub penalties_missed: u32,
    #[serde(default)]
    pub penalties_saved: u32,
}

/// One player in one position slot for some span of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub team_id: u64,
    pub team_name: String,
    pub player_id: u64,
    pub player_name: String,
    pub player_nickname: Option<String>,
    pub birth_date: Option<String>,
    pub player_gender: Option<String>,
    pub player_height: Option<f64>,
    pub player_weight: Option<f64>,
    pub jersey_number: Option<u32>,
    pub country_id: Option<u64>,
    pub country_name: Option<String>,
    pub position_id: u32,
    pub position: String,
    pub from: String,
    pub to: Option<String>,
    pub from_period: u8,
    pub to_period: Option<u8>,
    pub start_reason: String,
    pub end_reason: Option<String>,
    pub counterpart_id: Option<u64>,
    pub counterpart_name: Option<String>,
    /// `None` when the document had no stats block for the player.
    pub totals: Option<PlayerMatchTotals>,
}

impl LineupEntry {
    /// Nickname when present, formal name otherwise.
    pub fn display_name(&self) -> &str {
        self.player_nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.player_name)
    }

    pub fn goals(&self) -> Option<u32> {
        self.totals.map(|t| t.goals)
    }

    pub fn is_starter(&self) -> bool {
        self.start_reason == STARTING_XI
    }

    pub fn is_substitute(&self) -> bool {
        self.start_reason.contains("Substitution")
    }
}

/// Card and goal timeline attached to the lineup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEvent {
    pub team_id: u64,
    pub team_name: String,
    pub player_id: Option<u64>,
    pub player_name: Option<String>,
    pub time: Option<String>,
    pub period: Option<u8>,
    pub event_type: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedMatch {
    pub formations: Vec<FormationRow>,
    pub lineup: Vec<LineupEntry>,
    pub events: Vec<LineupEvent>,
}

impl ExtractedMatch {
    /// Team names in document order.
    pub fn team_names(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for row in &self.formations {
            if !out.contains(&row.team_name) {
                out.push(row.team_name.clone());
            }
        }
        for row in &self.lineup {
            if !out.contains(&row.team_name) {
                out.push(row.team_name.clone());
            }
        }
        out
    }

    pub fn starting_formation(&self, team_name: &str) -> Option<&str> {
        self.formations
            .iter()
            .find(|f| f.team_name == team_name && f.reason == STARTING_XI)
            .map(|f| f.formation.as_str())
    }

    pub fn lineup_for<'a>(&'a self, team_name: &'a str) -> impl Iterator<Item = &'a LineupEntry> + 'a {
        self.lineup.iter().filter(move |e| e.team_name == team_name)
    }

    pub fn player_entries(&self, player_id: u64) -> impl Iterator<Item = &LineupEntry> {
        self.lineup.iter().filter(move |e| e.player_id == player_id)
    }
}

#[derive(Debug, Deserialize)]
struct RawTeamDocument {
    team_id: u64,
    team_name: String,
    #[serde(default)]
    formations: Option<Vec<RawFormation>>,
    #[serde(default)]
    lineup: Option<Vec<RawLineupPlayer>>,
    #[serde(default)]
    events: Option<Vec<RawLineupEvent>>,
}

#[derive(Debug, Deserialize)]
struct RawFormation {
    #[serde(default)]
    period: Option<u8>,
    #[serde(default)]
    time: Option<String>,
    formation: Value,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLineupPlayer {
    player_id: u64,
    player_name: String,
    #[serde(default)]
    player_nickname: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    player_gender: Option<String>,
    #[serde(default)]
    player_height: Option<f64>,
    #[serde(default)]
    player_weight: Option<f64>,
    #[serde(default)]
    jersey_number: Option<u32>,
    #[serde(default)]
    country: Option<RawCountry>,
    #[serde(default)]
    stats: Option<PlayerMatchTotals>,
    #[serde(default)]
    positions: Option<Vec<RawPosition>>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    position_id: u32,
    position: String,
    from: String,
    #[serde(default)]
    to: Option<String>,
    from_period: u8,
    #[serde(default)]
    to_period: Option<u8>,
    start_reason: String,
    #[serde(default)]
    end_reason: Option<String>,
    #[serde(default)]
    counterpart_id: Option<u64>,
    #[serde(default)]
    counterpart_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLineupEvent {
    #[serde(default)]
    player_id: Option<u64>,
    #[serde(default)]
    player_name: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    period: Option<u8>,
    #[serde(rename = "type", default)]
    event_type: Option<String>,
    #[serde(default)]
    outcome: Option<String>,
}

fn formation_code(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Flattens the per-team documents into formation, lineup and event rows,
/// copying team fields onto every row.
pub fn extract_match(raw: &str) -> PipelineResult<ExtractedMatch> {
    let docs = serde_json::from_str::<Vec<RawTeamDocument>>(raw)?;
    extract_documents(docs)
}

fn extract_documents(docs: Vec<RawTeamDocument>) -> PipelineResult<ExtractedMatch> {
    let mut out = ExtractedMatch::default();

    for doc in docs {
        let formations = doc.formations.ok_or_else(|| PipelineError::missing("formations"))?;
        let lineup = doc.lineup.ok_or_else(|| PipelineError::missing("lineup"))?;
        let events = doc.events.ok_or_else(|| PipelineError::missing("events"))?;

        for f in formations {
            out.formations.push(FormationRow {
                team_id: doc.team_id,
                team_name: doc.team_name.clone(),
                period: f.period,
                time: f.time,
                formation: formation_code(&f.formation),
                reason: f.reason.unwrap_or_default(),
            });
        }

        for player in lineup {
            let positions = player
                .positions
                .ok_or_else(|| PipelineError::missing("lineup.positions"))?;
            let (country_id, country_name) = match player.country {
                Some(c) => (c.id, c.name),
                None => (None, None),
            };
            for pos in positions {
                out.lineup.push(LineupEntry {
                    team_id: doc.team_id,
                    team_name: doc.team_name.clone(),
                    player_id: player.player_id,
                    player_name: player.player_name.clone(),
                    player_nickname: player.player_nickname.clone(),
                    birth_date: player.birth_date.clone(),
                    player_gender: player.player_gender.clone(),
                    player_height: player.player_height,
                    player_weight: player.player_weight,
                    jersey_number: player.jersey_number,
                    country_id,
                    country_name: country_name.clone(),
                    position_id: pos.position_id,
                    position: pos.position,
                    from: pos.from,
                    to: pos.to,
                    from_period: pos.from_period,
                    to_period: pos.to_period,
                    start_reason: pos.start_reason,
                    end_reason: pos.end_reason,
                    counterpart_id: pos.counterpart_id,
                    counterpart_name: pos.counterpart_name,
                    totals: player.stats,
                });
            }
        }

        for e in events {
            out.events.push(LineupEvent {
                team_id: doc.team_id,
                team_name: doc.team_name.clone(),
                player_id: e.player_id,
                player_name: e.player_name,
                time: e.time,
                period: e.period,
                event_type: e.event_type,
                outcome: e.outcome,
            });
        }
    }

    debug!(
        formations = out.formations.len(),
        lineup = out.lineup.len(),
        events = out.events.len(),
        "extracted lineup document"
    );
    Ok(out)
}
