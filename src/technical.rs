use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::events::{is_success, EventKind, MatchEvent, DuelType, IGNORED_PASS_OUTCOMES, PASS_OFFSIDE};

const SHOT_ON_TARGET: [&str; 2] = ["Goal", "Saved"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechnicalStat {
    TotalShots,
    ShotsOnTarget,
    ShotAccuracy,
    Offsides,
    TotalCrosses,
    SuccessfulCrosses,
    TotalPasses,
    SuccessfulPasses,
    PassAccuracy,
    Fouls,
    TotalTackles,
    SuccessfulTackles,
    TackleAccuracy,
    Duels,
    SuccessfulDuels,
    Interceptions,
    Clearances,
    LostBalls,
}

pub const ALL_STATS: [TechnicalStat; 18] = [
    TechnicalStat::TotalShots,
    TechnicalStat::ShotsOnTarget,
    TechnicalStat::ShotAccuracy,
    TechnicalStat::Offsides,
    TechnicalStat::TotalCrosses,
    TechnicalStat::SuccessfulCrosses,
    TechnicalStat::TotalPasses,
    TechnicalStat::SuccessfulPasses,
    TechnicalStat::PassAccuracy,
    TechnicalStat::Fouls,
    TechnicalStat::TotalTackles,
    TechnicalStat::SuccessfulTackles,
    TechnicalStat::TackleAccuracy,
    TechnicalStat::Duels,
    TechnicalStat::SuccessfulDuels,
    TechnicalStat::Interceptions,
    TechnicalStat::Clearances,
    TechnicalStat::LostBalls,
];

impl TechnicalStat {
    pub fn label(self) -> &'static str {
        match self {
            TechnicalStat::TotalShots => "Total shots",
            TechnicalStat::ShotsOnTarget => "Shots on target",
            TechnicalStat::ShotAccuracy => "Shot accuracy (%)",
            TechnicalStat::Offsides => "Offsides",
            TechnicalStat::TotalCrosses => "Total crosses",
            TechnicalStat::SuccessfulCrosses => "Successful crosses",
            TechnicalStat::TotalPasses => "Total passes",
            TechnicalStat::SuccessfulPasses => "Successful passes",
            TechnicalStat::PassAccuracy => "Pass accuracy (%)",
            TechnicalStat::Fouls => "Fouls",
            TechnicalStat::TotalTackles => "Total tackles",
            TechnicalStat::SuccessfulTackles => "Successful tackles",
            TechnicalStat::TackleAccuracy => "Tackle accuracy (%)",
            TechnicalStat::Duels => "Duels",
            TechnicalStat::SuccessfulDuels => "Successful duels",
            TechnicalStat::Interceptions => "Interceptions",
            TechnicalStat::Clearances => "Clearances",
            TechnicalStat::LostBalls => "Lost balls",
        }
    }

    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            TechnicalStat::ShotAccuracy | TechnicalStat::PassAccuracy | TechnicalStat::TackleAccuracy
        )
    }
}

impl fmt::Display for TechnicalStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalStatRow {
    pub team_name: String,
    pub player_id: u64,
    pub player_name: String,
    pub total_shots: u32,
    pub shots_on_target: u32,
    pub shot_accuracy: f64,
    pub offsides: u32,
    pub total_crosses: u32,
    pub successful_crosses: u32,
    pub total_passes: u32,
    pub successful_passes: u32,
    pub pass_accuracy: f64,
    pub fouls: u32,
    pub total_tackles: u32,
    pub successful_tackles: u32,
    pub tackle_accuracy: f64,
    pub duels: u32,
    pub successful_duels: u32,
    pub interceptions: u32,
    pub clearances: u32,
    pub lost_balls: u32,
}

impl TechnicalStatRow {
    pub fn empty(team_name: &str, player_id: u64, player_name: &str) -> Self {
        Self {
            team_name: team_name.to_string(),
            player_id,
            player_name: player_name.to_string(),
            ..Default::default()
        }
    }

    pub fn value(&self, stat: TechnicalStat) -> f64 {
        match stat {
            TechnicalStat::TotalShots => self.total_shots as f64,
            TechnicalStat::ShotsOnTarget => self.shots_on_target as f64,
            TechnicalStat::ShotAccuracy => self.shot_accuracy,
            TechnicalStat::Offsides => self.offsides as f64,
            TechnicalStat::TotalCrosses => self.total_crosses as f64,
            TechnicalStat::SuccessfulCrosses => self.successful_crosses as f64,
            TechnicalStat::TotalPasses => self.total_passes as f64,
            TechnicalStat::SuccessfulPasses => self.successful_passes as f64,
            TechnicalStat::PassAccuracy => self.pass_accuracy,
            TechnicalStat::Fouls => self.fouls as f64,
            TechnicalStat::TotalTackles => self.total_tackles as f64,
            TechnicalStat::SuccessfulTackles => self.successful_tackles as f64,
            TechnicalStat::TackleAccuracy => self.tackle_accuracy,
            TechnicalStat::Duels => self.duels as f64,
            TechnicalStat::SuccessfulDuels => self.successful_duels as f64,
            TechnicalStat::Interceptions => self.interceptions as f64,
            TechnicalStat::Clearances => self.clearances as f64,
            TechnicalStat::LostBalls => self.lost_balls as f64,
        }
    }

    fn count(&mut self, event: &MatchEvent) {
        match &event.kind {
            EventKind::Shot => {
                self.total_shots += 1;
                if event
                    .shot_outcome
                    .as_deref()
                    .is_some_and(|o| SHOT_ON_TARGET.contains(&o))
                {
                    self.shots_on_target += 1;
                }
            }
            EventKind::Offside => self.offsides += 1,
            EventKind::Pass => {
                let outcome = event.pass_outcome.as_deref();
                if outcome == Some(PASS_OFFSIDE) {
                    self.offsides += 1;
                }
                if event.pass_cross {
                    self.total_crosses += 1;
                    if outcome.is_none() {
                        self.successful_crosses += 1;
                    }
                }
                if !outcome.is_some_and(|o| IGNORED_PASS_OUTCOMES.contains(&o)) {
                    self.total_passes += 1;
                    if outcome.is_none() {
                        self.successful_passes += 1;
                    }
                }
            }
            EventKind::FoulCommitted => self.fouls += 1,
            EventKind::Duel => {
                let won = is_success(event.duel_outcome.as_deref());
                self.duels += 1;
                if won {
                    self.successful_duels += 1;
                }
                if event.duel_type == Some(DuelType::Tackle) {
                    self.total_tackles += 1;
                    if won {
                        self.successful_tackles += 1;
                    }
                }
            }
            EventKind::Interception => {
                if is_success(event.interception_outcome.as_deref()) {
                    self.interceptions += 1;
                }
            }
            EventKind::Clearance => self.clearances += 1,
            EventKind::Dispossessed | EventKind::Miscontrol => self.lost_balls += 1,
            EventKind::Untracked(_) | EventKind::Unrecognized(_) => {}
        }
    }

    fn finish(&mut self) {
        self.shot_accuracy = accuracy(self.shots_on_target, self.total_shots);
        self.pass_accuracy = accuracy(self.successful_passes, self.total_passes);
        self.tackle_accuracy = accuracy(self.successful_tackles, self.total_tackles);
    }
}

/// Percentage rounded to one decimal; zero attempts gives 0.
pub fn accuracy(successful: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (successful as f64 / total as f64 * 1000.0).round() / 10.0
}

/// One row per distinct player seen in the event stream, in first-appearance
/// order. Events without a player id are not attributed to anyone.
pub fn aggregate(events: &[MatchEvent]) -> Vec<TechnicalStatRow> {
    let mut rows: Vec<TechnicalStatRow> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for event in events {
        let Some(player_id) = event.player_id else { continue };
        let slot = *index.entry(player_id).or_insert_with(|| {
            rows.push(TechnicalStatRow::empty(
                &event.team_name,
                player_id,
                event.player_name.as_deref().unwrap_or_default(),
            ));
            rows.len() - 1
        });
        rows[slot].count(event);
    }

    for row in &mut rows {
        row.finish();
    }
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    /// Goalkeeper and back line.
    Defence,
    Midfield,
    Attack,
}

impl PositionGroup {
    /// Id 1 (goalkeeper) maps to `Defence` on purpose; keepers get the back-line columns.
    pub fn from_position_id(position_id: u32) -> PipelineResult<Self> {
        match position_id {
            1..=8 => Ok(PositionGroup::Defence),
            9..=20 => Ok(PositionGroup::Midfield),
            21.. => Ok(PositionGroup::Attack),
            0 => Err(PipelineError::UnknownPositionId(position_id)),
        }
    }

    pub fn columns(self) -> &'static [TechnicalStat] {
        match self {
            PositionGroup::Attack => &[
                TechnicalStat::ShotAccuracy,
                TechnicalStat::PassAccuracy,
                TechnicalStat::TotalShots,
                TechnicalStat::LostBalls,
                TechnicalStat::ShotsOnTarget,
                TechnicalStat::Offsides,
            ],
            PositionGroup::Midfield => &[
                TechnicalStat::ShotAccuracy,
                TechnicalStat::PassAccuracy,
                TechnicalStat::TackleAccuracy,
                TechnicalStat::SuccessfulTackles,
                TechnicalStat::Interceptions,
                TechnicalStat::LostBalls,
            ],
            PositionGroup::Defence => &[
                TechnicalStat::PassAccuracy,
                TechnicalStat::TotalCrosses,
                TechnicalStat::TackleAccuracy,
                TechnicalStat::Interceptions,
                TechnicalStat::Clearances,
                TechnicalStat::LostBalls,
                TechnicalStat::Fouls,
            ],
        }
    }
}

/// A stat row cut down to the columns that matter for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedStats {
    pub team_name: String,
    pub player_id: u64,
    pub player_name: String,
    pub group: PositionGroup,
    pub values: Vec<(TechnicalStat, f64)>,
}

impl PositionedStats {
    pub fn get(&self, stat: TechnicalStat) -> Option<f64> {
        self.values.iter().find(|(s, _)| *s == stat).map(|(_, v)| *v)
    }
}

pub fn differentiate(row: &TechnicalStatRow, position_id: u32) -> PipelineResult<PositionedStats> {
    let group = PositionGroup::from_position_id(position_id)?;
    Ok(PositionedStats {
        team_name: row.team_name.clone(),
        player_id: row.player_id,
        player_name: row.player_name.clone(),
        group,
        values: group.columns().iter().map(|s| (*s, row.value(*s))).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(player: u64, kind: EventKind) -> MatchEvent {
        MatchEvent::new("Home FC", Some(player), Some("Player"), kind)
    }

    fn pass(player: u64, outcome: Option<&str>, cross: bool) -> MatchEvent {
        let mut e = ev(player, EventKind::Pass);
        e.pass_outcome = outcome.map(str::to_string);
        e.pass_cross = cross;
        e
    }

    fn duel(player: u64, tackle: bool, outcome: &str) -> MatchEvent {
        let mut e = ev(player, EventKind::Duel);
        e.duel_type = Some(if tackle { DuelType::Tackle } else { DuelType::AerialLost });
        e.duel_outcome = Some(outcome.to_string());
        e
    }

    #[test]
    fn counters_follow_filters() {
        let mut goal = ev(1, EventKind::Shot);
        goal.shot_outcome = Some("Goal".to_string());
        let mut wide = ev(1, EventKind::Shot);
        wide.shot_outcome = Some("Off T".to_string());
        let mut interception = ev(1, EventKind::Interception);
        interception.interception_outcome = Some("Won".to_string());
        let mut lost_interception = ev(1, EventKind::Interception);
        lost_interception.interception_outcome = Some("Lost In Play".to_string());

        let events = vec![
            goal,
            wide,
            pass(1, None, true),
            pass(1, Some("Incomplete"), true),
            pass(1, Some("Injury Clearance"), false),
            pass(1, Some(PASS_OFFSIDE), false),
            ev(1, EventKind::Offside),
            duel(1, true, "Won"),
            duel(1, true, "Lost In Play"),
            duel(1, false, "Success"),
            interception,
            lost_interception,
            ev(1, EventKind::Dispossessed),
            ev(1, EventKind::Miscontrol),
            ev(1, EventKind::Clearance),
            ev(1, EventKind::FoulCommitted),
        ];
        let rows = aggregate(&events);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!((r.total_shots, r.shots_on_target), (2, 1));
        assert_eq!(r.shot_accuracy, 50.0);
        assert_eq!(r.offsides, 2);
        assert_eq!((r.total_crosses, r.successful_crosses), (2, 1));
        assert_eq!((r.total_passes, r.successful_passes), (3, 1));
        assert_eq!(r.pass_accuracy, 33.3);
        assert_eq!((r.total_tackles, r.successful_tackles), (2, 1));
        assert_eq!((r.duels, r.successful_duels), (3, 2));
        assert_eq!(r.interceptions, 1);
        assert_eq!(r.lost_balls, 2);
        assert_eq!(r.clearances, 1);
        assert_eq!(r.fouls, 1);
    }

    #[test]
    fn zero_attempts_gives_zero_accuracy() {
        let rows = aggregate(&[ev(9, EventKind::Clearance)]);
        assert_eq!(rows[0].shot_accuracy, 0.0);
        assert_eq!(rows[0].pass_accuracy, 0.0);
        assert_eq!(rows[0].tackle_accuracy, 0.0);
    }

    #[test]
    fn roster_skips_null_players_and_keeps_order() {
        let events = vec![
            ev(5, EventKind::Clearance),
            MatchEvent::new("Home FC", None, None, EventKind::Pass),
            ev(3, EventKind::Untracked("Carry".to_string())),
            ev(5, EventKind::Clearance),
        ];
        let rows = aggregate(&events);
        let ids: Vec<u64> = rows.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![5, 3]);
        assert_eq!(rows[1].clearances, 0);
        assert_eq!(rows[0].clearances, 2);
    }

    #[test]
    fn position_groups_select_fixed_columns() {
        let row = TechnicalStatRow::empty("A", 1, "P");
        assert_eq!(differentiate(&row, 3).unwrap().group, PositionGroup::Defence);
        assert_eq!(differentiate(&row, 13).unwrap().values.len(), 6);
        let attack = differentiate(&row, 23).unwrap();
        assert_eq!(attack.group, PositionGroup::Attack);
        assert_eq!(attack.get(TechnicalStat::Offsides), Some(0.0));
        assert!(attack.get(TechnicalStat::Clearances).is_none());
        assert!(matches!(
            differentiate(&row, 0),
            Err(PipelineError::UnknownPositionId(0))
        ));
    }
}
