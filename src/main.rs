use anyhow::{Context, Result};
use tracing::warn;

use matchday_analytics::config::{flag_value, AnalysisConfig, MatchPaths};
use matchday_analytics::export;
use matchday_analytics::pitch::Side;
use matchday_analytics::{init_tracing, load_match, MatchContext};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let paths = MatchPaths::resolve(&args);
    let ctx = load_match(&paths, AnalysisConfig::from_env())?;

    println!(
        "{} vs {}: {} events, {} lineup rows",
        ctx.team_name(Side::Home).unwrap_or("?"),
        ctx.team_name(Side::Away).unwrap_or("?"),
        ctx.events().len(),
        ctx.lineup_rows().len()
    );

    let unknown = ctx.unrecognized_event_types();
    if !unknown.is_empty() {
        warn!(types = ?unknown, "event types without a counter");
    }

    let lineups = export::lineup_rows(&ctx);
    for side in [Side::Home, Side::Away] {
        let team = ctx.team_name(side).unwrap_or("?");
        println!("== {side}: {team} ==");
        // header row plus this side's players
        let rows = lineups
            .iter()
            .enumerate()
            .filter(|(i, row)| *i == 0 || row.first().is_some_and(|s| s == side.label()))
            .map(|(_, row)| row.clone())
            .collect::<Vec<_>>();
        print_table(&rows);
        println!();
    }

    println!("== Technical ==");
    print_table(&export::technical_rows(&ctx));
    println!();

    for side in [Side::Home, Side::Away] {
        let rows = export::physical_rows(&ctx, side);
        if rows.len() > 1 {
            println!("== Physical {side} ==");
            print_table(&rows);
            println!();
        }
    }

    if let Some(raw) = flag_value(&args, "--player") {
        let player_id = raw.parse::<u64>().with_context(|| format!("invalid --player {raw}"))?;
        print_player(&ctx, player_id)?;
    }

    Ok(())
}

fn print_player(ctx: &MatchContext, player_id: u64) -> Result<()> {
    let row = ctx.player(player_id)?;
    println!(
        "== {} ({}) {} #{} ==",
        row.player_name,
        row.team_name,
        row.position,
        row.jersey_number.map(|n| n.to_string()).unwrap_or_default()
    );

    let stats = ctx.technical_for(player_id)?;
    for (stat, value) in &stats.values {
        println!("{:<24} {value}", stat.label());
    }

    match ctx.physical_for(player_id) {
        Ok(Some(p)) => println!(
            "minutes {:.2}  distance {:.2} km  sprints {}",
            p.minutes_played, p.distance_km, p.sprints
        ),
        Ok(None) => println!("no tracking loaded for {}", row.side),
        Err(err) => println!("physical: {err}"),
    }

    if ctx.has_workload() {
        match ctx.fatigue_window_for(player_id) {
            Ok(window) => println!("substitution window: {}..{}", window.start, window.end),
            Err(err) => println!("fatigue: {err}"),
        }
    }
    Ok(())
}

fn print_table(rows: &[Vec<String>]) {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..cols)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    for row in rows {
        let line = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}
