use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::{AnalysisConfig, MatchPaths};
use crate::error::{PipelineError, PipelineResult};
use crate::events::{self, MatchEvent};
use crate::extract::{self, ExtractedMatch, LineupEntry};
use crate::fatigue::{self, FatigueWindow};
use crate::identity::{self, IdentityMatch};
use crate::lineup::{self, LineUpStatRow};
use crate::physical::{self, PhysicalStatRow};
use crate::pitch::Side;
use crate::technical::{self, PositionedStats, TechnicalStatRow};
use crate::tracking::{self, Teamsheet, TrackingTable, WorkloadTable};
use crate::velocity::SmoothedVelocity;

const COORD_EPS: f64 = 1e-6;

fn read_file(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Everything derived from one match load. Built once, read-only afterwards;
/// the technical and physical tables are computed on first use.
pub struct MatchContext {
    cfg: AnalysisConfig,
    extracted: ExtractedMatch,
    events: Vec<MatchEvent>,
    sides: Vec<(String, Side)>,
    lineup_rows: Vec<LineUpStatRow>,
    teamsheet: Option<Teamsheet>,
    tracking: Vec<TrackingTable>,
    workloads: Vec<(Side, WorkloadTable)>,
    technical: OnceCell<Vec<TechnicalStatRow>>,
    physical: OnceCell<Vec<PhysicalStatRow>>,
}

impl MatchContext {
    pub fn new(cfg: AnalysisConfig, extracted: ExtractedMatch, events: Vec<MatchEvent>) -> PipelineResult<Self> {
        let lineup_rows = lineup::assemble_match(&extracted, &cfg)?;
        let sides = lineup::resolve_sides(&extracted.team_names(), cfg.home_team.as_deref());
        info!(
            teams = sides.len(),
            players = lineup_rows.len(),
            events = events.len(),
            "match loaded"
        );
        Ok(Self {
            cfg,
            extracted,
            events,
            sides,
            lineup_rows,
            teamsheet: None,
            tracking: Vec::new(),
            workloads: Vec::new(),
            technical: OnceCell::new(),
            physical: OnceCell::new(),
        })
    }

    pub fn from_files(lineups: &Path, events: &Path, cfg: AnalysisConfig) -> PipelineResult<Self> {
        let extracted = extract::extract_match(&read_file(lineups)?)?;
        let events = events::parse_events_json(&read_file(events)?)?;
        Self::new(cfg, extracted, events)
    }

    pub fn with_teamsheet(mut self, teamsheet: Teamsheet) -> Self {
        self.teamsheet = Some(teamsheet);
        self.physical = OnceCell::new();
        self
    }

    /// Replaces any table already loaded for the same side.
    pub fn with_tracking(mut self, table: TrackingTable) -> Self {
        self.tracking.retain(|t| t.side != table.side);
        self.tracking.push(table);
        self.physical = OnceCell::new();
        self
    }

    pub fn with_workload(mut self, side: Side, table: WorkloadTable) -> Self {
        self.workloads.retain(|(s, _)| *s != side);
        self.workloads.push((side, table));
        self
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn lineup_rows(&self) -> &[LineUpStatRow] {
        &self.lineup_rows
    }

    pub fn team_name(&self, side: Side) -> Option<&str> {
        self.sides
            .iter()
            .find(|(_, s)| *s == side)
            .map(|(name, _)| name.as_str())
    }

    pub fn side_of(&self, team_name: &str) -> Option<Side> {
        self.sides.iter().find(|(name, _)| name == team_name).map(|(_, s)| *s)
    }

    pub fn has_workload(&self) -> bool {
        !self.workloads.is_empty()
    }

    pub fn unrecognized_event_types(&self) -> BTreeSet<String> {
        events::unrecognized_event_types(&self.events)
    }

    pub fn technical(&self) -> &[TechnicalStatRow] {
        self.technical.get_or_init(|| technical::aggregate(&self.events))
    }

    /// Physical rows for every loaded tracking table, home first.
    pub fn physical(&self) -> &[PhysicalStatRow] {
        self.physical.get_or_init(|| {
            let empty = Teamsheet::default();
            let teamsheet = self.teamsheet.as_ref().unwrap_or(&empty);
            let estimator = SmoothedVelocity::from(&self.cfg);
            let mut tables: Vec<&TrackingTable> = self.tracking.iter().collect();
            tables.sort_by_key(|t| t.side != Side::Home);
            tables
                .into_iter()
                .flat_map(|t| physical::aggregate(t, teamsheet, &estimator, &self.cfg))
                .collect()
        })
    }

    /// The on-pitch player drawn at `(x, y)`. Bench rows are never hit.
    pub fn player_at(&self, x: f64, y: f64) -> Option<&LineUpStatRow> {
        self.lineup_rows
            .iter()
            .filter(|r| r.on_pitch())
            .find(|r| (r.x - x).abs() < COORD_EPS && (r.y - y).abs() < COORD_EPS)
    }

    pub fn player(&self, player_id: u64) -> PipelineResult<&LineUpStatRow> {
        self.lineup_rows
            .iter()
            .find(|r| r.player_id == player_id)
            .ok_or(PipelineError::UnknownPlayer(player_id))
    }

    fn lineup_entry(&self, player_id: u64) -> PipelineResult<&LineupEntry> {
        self.extracted
            .player_entries(player_id)
            .next()
            .ok_or(PipelineError::UnknownPlayer(player_id))
    }

    /// Position-reduced technical stats; players without events get zeros.
    pub fn technical_for(&self, player_id: u64) -> PipelineResult<PositionedStats> {
        let row = self.player(player_id)?;
        let zeros;
        let stats = match self.technical().iter().find(|t| t.player_id == player_id) {
            Some(stats) => stats,
            None => {
                zeros = TechnicalStatRow::empty(&row.team_name, player_id, &row.player_name);
                &zeros
            }
        };
        technical::differentiate(stats, row.position_id)
    }

    pub fn tracking_tag(&self, player_id: u64) -> PipelineResult<(Side, u32)> {
        let row = self.player(player_id)?;
        let entry = self.lineup_entry(player_id)?;
        let teamsheet = self
            .teamsheet
            .as_ref()
            .ok_or_else(|| PipelineError::missing("teamsheet"))?;
        let tag = identity::resolve_tracking_tag(entry, teamsheet, row.side).into_result(&entry.player_name)?;
        Ok((row.side, tag))
    }

    /// Lineup player behind a tracking column. Without a teamsheet nothing matches.
    pub fn player_for_tag(&self, side: Side, tag: u32) -> IdentityMatch<u64> {
        let Some(teamsheet) = self.teamsheet.as_ref() else {
            return IdentityMatch::NoMatch;
        };
        let Some(team) = self.team_name(side) else {
            return IdentityMatch::NoMatch;
        };
        identity::resolve_player_id(tag, side, teamsheet, self.extracted.lineup_for(team))
    }

    /// `None` when the player's side has no tracking table loaded.
    pub fn physical_for(&self, player_id: u64) -> PipelineResult<Option<&PhysicalStatRow>> {
        let (side, tag) = self.tracking_tag(player_id)?;
        Ok(self.physical().iter().find(|r| r.side == side && r.tag == tag))
    }

    pub fn fatigue_window_for(&self, player_id: u64) -> PipelineResult<FatigueWindow> {
        let (side, tag) = self.tracking_tag(player_id)?;
        let table = self
            .workloads
            .iter()
            .find(|(s, _)| *s == side)
            .map(|(_, t)| t)
            .ok_or_else(|| PipelineError::missing("workload"))?;
        fatigue::detect(table.series_for(side, tag)?, &table.time_sec, &self.cfg)
    }

    /// Bench rows for one side, earliest entry first.
    pub fn substitutes(&self, side: Side) -> Vec<&LineUpStatRow> {
        let mut out: Vec<&LineUpStatRow> = self
            .lineup_rows
            .iter()
            .filter(|r| r.side == side && !r.on_pitch())
            .collect();
        out.sort_by_key(|r| (r.from_period, r.from_minute));
        out
    }
}

/// Loads every file `paths` names. Lineups and events are required; tracking,
/// teamsheet and workload files are attached when present.
pub fn load_match(paths: &MatchPaths, cfg: AnalysisConfig) -> anyhow::Result<MatchContext> {
    let lineups = paths.lineups.as_deref().context("missing --lineups / MATCH_LINEUPS")?;
    let events = paths.events.as_deref().context("missing --events / MATCH_EVENTS")?;
    let mut ctx = MatchContext::from_files(lineups, events, cfg)
        .with_context(|| format!("failed loading match from {}", lineups.display()))?;

    if let Some(path) = paths.teamsheet.as_deref() {
        let sheet = tracking::load_teamsheet(path).with_context(|| format!("teamsheet {}", path.display()))?;
        ctx = ctx.with_teamsheet(sheet);
    }
    for (side, path) in [(Side::Home, &paths.tracking_home), (Side::Away, &paths.tracking_away)] {
        let Some(path) = path.as_deref() else { continue };
        let table = tracking::load_tracking(path, side).with_context(|| format!("tracking {}", path.display()))?;
        ctx = ctx.with_tracking(table);
    }
    for (side, path) in [(Side::Home, &paths.workload_home), (Side::Away, &paths.workload_away)] {
        let Some(path) = path.as_deref() else { continue };
        let table = tracking::load_workload(path).with_context(|| format!("workload {}", path.display()))?;
        ctx = ctx.with_workload(side, table);
    }
    Ok(ctx)
}
