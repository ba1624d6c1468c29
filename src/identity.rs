use std::collections::BTreeSet;

use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::extract::LineupEntry;
use crate::pitch::Side;
use crate::tracking::Teamsheet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityMatch<T> {
    Unique(T),
    /// Every candidate, in teamsheet or lineup order.
    Ambiguous(Vec<T>),
    NoMatch,
}

impl<T: std::fmt::Debug> IdentityMatch<T> {
    pub fn unique(self) -> Option<T> {
        match self {
            IdentityMatch::Unique(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_result(self, name: &str) -> PipelineResult<T> {
        match self {
            IdentityMatch::Unique(v) => Ok(v),
            IdentityMatch::Ambiguous(candidates) => Err(PipelineError::AmbiguousPlayerMatch {
                name: name.to_string(),
                candidates: candidates.iter().map(|c| format!("{c:?}")).collect(),
            }),
            IdentityMatch::NoMatch => Err(PipelineError::NoPlayerMatch {
                name: name.to_string(),
            }),
        }
    }

    fn from_candidates(mut candidates: Vec<T>, name: &str) -> Self {
        match candidates.len() {
            0 => IdentityMatch::NoMatch,
            1 => IdentityMatch::Unique(candidates.remove(0)),
            _ => {
                warn!(player = name, candidates = ?candidates, "ambiguous name match");
                IdentityMatch::Ambiguous(candidates)
            }
        }
    }
}

fn tokens(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// `"A. Greenwood"` -> `{"greenwood"}`; names without an initial are kept whole.
pub fn tracking_tokens(display: &str) -> BTreeSet<String> {
    tokens(display.rsplit(". ").next().unwrap_or(display))
}

/// Token-subset test against the formal name or, failing that, the nickname.
pub fn names_match(tracking_display: &str, entry: &LineupEntry) -> bool {
    let wanted = tracking_tokens(tracking_display);
    if wanted.is_empty() {
        return false;
    }
    let formal = tokens(&entry.player_name);
    if wanted.is_subset(&formal) {
        return true;
    }
    entry
        .player_nickname
        .as_deref()
        .is_some_and(|nick| wanted.is_subset(&tokens(nick)))
}

/// Tracking tags on `side` whose teamsheet name fits the lineup player.
pub fn resolve_tracking_tag(entry: &LineupEntry, teamsheet: &Teamsheet, side: Side) -> IdentityMatch<u32> {
    let candidates: Vec<u32> = teamsheet
        .side(side)
        .iter()
        .enumerate()
        .filter(|(_, sheet)| names_match(&sheet.player, entry))
        .map(|(tag, _)| tag as u32)
        .collect();
    IdentityMatch::from_candidates(candidates, &entry.player_name)
}

/// Lineup player ids whose names fit the teamsheet entry at `tag`.
pub fn resolve_player_id<'a>(
    tag: u32,
    side: Side,
    teamsheet: &Teamsheet,
    lineup: impl IntoIterator<Item = &'a LineupEntry>,
) -> IdentityMatch<u64> {
    let Some(sheet) = teamsheet.entry(side, tag) else {
        return IdentityMatch::NoMatch;
    };
    let mut candidates: Vec<u64> = Vec::new();
    for entry in lineup {
        if !candidates.contains(&entry.player_id) && names_match(&sheet.player, entry) {
            candidates.push(entry.player_id);
        }
    }
    IdentityMatch::from_candidates(candidates, &sheet.player)
}
