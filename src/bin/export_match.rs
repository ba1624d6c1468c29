use std::path::PathBuf;

use anyhow::Result;

use matchday_analytics::config::{flag_value, AnalysisConfig, MatchPaths};
use matchday_analytics::{export, init_tracing, load_match};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out = flag_value(&args, "--out")
        .or_else(|| std::env::var("EXPORT_PATH").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("match_analysis.xlsx"));

    let ctx = load_match(&MatchPaths::resolve(&args), AnalysisConfig::from_env())?;
    let report = export::write_workbook(&ctx, &out)?;

    println!("Export complete: {}", out.display());
    println!("Lineup rows: {}", report.lineups);
    println!("Technical rows: {}", report.technical);
    println!("Physical rows: {}", report.physical);
    println!("Fatigue windows: {}", report.fatigue);
    if !report.errors.is_empty() {
        println!("Errors: {}", report.errors.len());
        for err in report.errors.iter().take(6) {
            println!(" - {err}");
        }
    }
    Ok(())
}
