use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::context::MatchContext;
use crate::lineup::{display_markers, Placement};
use crate::physical::{round2, SPEED_ZONES};
use crate::pitch::Side;
use crate::technical::ALL_STATS;

pub struct ExportReport {
    pub lineups: usize,
    pub technical: usize,
    pub physical: usize,
    pub fatigue: usize,
    pub errors: Vec<String>,
}

pub fn lineup_rows(ctx: &MatchContext) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Side".to_string(),
        "Team".to_string(),
        "Player ID".to_string(),
        "Shirt #".to_string(),
        "Player".to_string(),
        "Position".to_string(),
        "From".to_string(),
        "Goals".to_string(),
        "Yellow Card".to_string(),
        "Red Card".to_string(),
        "x".to_string(),
        "y".to_string(),
        "Bench".to_string(),
    ]];
    for row in ctx.lineup_rows() {
        let markers = display_markers(row);
        rows.push(vec![
            row.side.to_string(),
            row.team_name.clone(),
            row.player_id.to_string(),
            opt_to_string(row.jersey_number),
            markers.player_name,
            row.position.clone(),
            row.from_display.clone(),
            markers.goals,
            markers.yellow_cards,
            markers.red_cards,
            format!("{:.2}", row.x),
            format!("{:.2}", row.y),
            if row.placement == Placement::Bench {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        ]);
    }
    rows
}

pub fn technical_rows(ctx: &MatchContext) -> Vec<Vec<String>> {
    let mut header = vec!["Team".to_string(), "Player ID".to_string(), "Player".to_string()];
    header.extend(ALL_STATS.iter().map(|s| s.label().to_string()));
    let mut rows = vec![header];
    for stats in ctx.technical() {
        let mut row = vec![
            stats.team_name.clone(),
            stats.player_id.to_string(),
            stats.player_name.clone(),
        ];
        row.extend(ALL_STATS.iter().map(|s| {
            let v = stats.value(*s);
            if s.is_percentage() {
                format!("{v:.1}")
            } else {
                format!("{v:.0}")
            }
        }));
        rows.push(row);
    }
    rows
}

/// Values are rounded to two decimals for display.
pub fn physical_rows(ctx: &MatchContext, side: Side) -> Vec<Vec<String>> {
    let mut header = vec![
        "jID".to_string(),
        "player".to_string(),
        "Minutes Played".to_string(),
        "Distance [km]".to_string(),
    ];
    header.extend(SPEED_ZONES.iter().map(|z| z.label().to_string()));
    header.push("Number of sprints".to_string());
    header.push("Player ID".to_string());
    let mut rows = vec![header];
    for stats in ctx.physical().iter().filter(|r| r.side == side) {
        let mut row = vec![
            opt_to_string(stats.jersey_number),
            stats.player_name.clone().unwrap_or_else(|| format!("{side}_{}", stats.tag)),
            round2(stats.minutes_played).to_string(),
            round2(stats.distance_km).to_string(),
        ];
        row.extend(SPEED_ZONES.iter().map(|z| round2(stats.zone_km(*z)).to_string()));
        row.push(stats.sprints.to_string());
        row.push(opt_to_string(ctx.player_for_tag(side, stats.tag).unique()));
        rows.push(row);
    }
    rows
}

/// One row per player with a resolvable workload series; failures are
/// collected instead of aborting the sheet.
pub fn fatigue_rows(ctx: &MatchContext, errors: &mut Vec<String>) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Side".to_string(),
        "Player ID".to_string(),
        "Player".to_string(),
        "Window start".to_string(),
        "Window end".to_string(),
    ]];
    if !ctx.has_workload() {
        return rows;
    }
    for row in ctx.lineup_rows() {
        match ctx.fatigue_window_for(row.player_id) {
            Ok(window) => rows.push(vec![
                row.side.to_string(),
                row.player_id.to_string(),
                row.player_name.clone(),
                window.start.to_string(),
                window.end.to_string(),
            ]),
            Err(err) => errors.push(format!("{} ({}): {err}", row.player_name, row.player_id)),
        }
    }
    rows
}

pub fn write_workbook(ctx: &MatchContext, path: &Path) -> Result<ExportReport> {
    let mut errors = Vec::new();
    let lineups = lineup_rows(ctx);
    let technical = technical_rows(ctx);
    let physical_home = physical_rows(ctx, Side::Home);
    let physical_away = physical_rows(ctx, Side::Away);
    let fatigue = fatigue_rows(ctx, &mut errors);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Lineups")?;
        write_rows(sheet, &lineups)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Technical")?;
        write_rows(sheet, &technical)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Physical Home")?;
        write_rows(sheet, &physical_home)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Physical Away")?;
        write_rows(sheet, &physical_away)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fatigue")?;
        write_rows(sheet, &fatigue)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        lineups: lineups.len().saturating_sub(1),
        technical: technical.len().saturating_sub(1),
        physical: (physical_home.len() + physical_away.len()).saturating_sub(2),
        fatigue: fatigue.len().saturating_sub(1),
        errors,
    })
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
