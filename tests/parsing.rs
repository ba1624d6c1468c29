use std::fs;
use std::path::PathBuf;

use matchday_analytics::config::AnalysisConfig;
use matchday_analytics::events::{parse_events_json, unrecognized_event_types, EventKind};
use matchday_analytics::extract::extract_match;
use matchday_analytics::lineup::assemble_match;
use matchday_analytics::tracking::{parse_teamsheet_json, read_tracking, read_workload};
use matchday_analytics::pitch::Side;
use matchday_analytics::PipelineError;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_lineup_fixture() {
    let extracted = extract_match(&read_fixture("lineups.json")).expect("fixture should parse");
    assert_eq!(extracted.team_names(), vec!["Northfield WFC", "Harbour City WFC"]);
    assert_eq!(extracted.lineup.len(), 24);
    assert_eq!(extracted.formations.len(), 3);
    assert_eq!(extracted.starting_formation("Northfield WFC"), Some("433"));
    // string-coded formations are accepted too
    assert_eq!(extracted.formations[1].formation, "4231");
    assert_eq!(extracted.events.len(), 5);

    let hart = extracted.player_entries(101).next().unwrap();
    assert_eq!(hart.team_id, 968);
    assert_eq!(hart.country_name.as_deref(), Some("England"));
    assert_eq!(hart.goals(), Some(0));
}

#[test]
fn parses_event_fixture() {
    let events = parse_events_json(&read_fixture("events.json")).expect("fixture should parse");
    assert_eq!(events.len(), 35);
    let shots = events.iter().filter(|e| e.kind == EventKind::Shot).count();
    assert_eq!(shots, 5);

    let yellow = events
        .iter()
        .find(|e| e.kind == EventKind::FoulCommitted && e.card.is_some())
        .unwrap();
    assert_eq!(yellow.card.as_deref(), Some("Yellow Card"));
    let red = events.iter().find(|e| e.card.as_deref() == Some("Red Card")).unwrap();
    assert_eq!(red.player_id, Some(205));

    let unknown = unrecognized_event_types(&events);
    assert_eq!(unknown.into_iter().collect::<Vec<_>>(), vec!["Pressure Regain"]);
}

#[test]
fn unsupported_formation_is_rejected() {
    let raw = read_fixture("lineups.json").replacen("\"formation\": 433", "\"formation\": 352", 1);
    let extracted = extract_match(&raw).unwrap();
    let err = assemble_match(&extracted, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormation(ref code) if code == "352"));
}

#[test]
fn starter_outside_the_formation_is_rejected() {
    let raw = read_fixture("lineups.json").replacen(
        "\"position\": \"Center Defensive Midfield\"",
        "\"position\": \"Left Midfield\"",
        1,
    );
    let extracted = extract_match(&raw).unwrap();
    let err = assemble_match(&extracted, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::FormationMismatch { ref formation, ref position }
            if formation == "433" && position == "Left Midfield"
    ));
}

#[test]
fn bad_timestamp_is_rejected() {
    let raw = read_fixture("lineups.json").replacen("\"from\": \"01:07:30.000\"", "\"from\": \"late\"", 1);
    let extracted = extract_match(&raw).unwrap();
    let err = assemble_match(&extracted, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTimestamp(ref raw) if raw == "late"));
}

#[test]
fn team_without_a_starting_formation_is_malformed() {
    let raw = read_fixture("lineups.json").replacen("\"reason\": \"Starting XI\"", "\"reason\": \"Tactical Shift\"", 1);
    let extracted = extract_match(&raw).unwrap();
    assert_eq!(extracted.starting_formation("Northfield WFC"), None);
    let err = assemble_match(&extracted, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedInput { ref key } if key == "formations.Starting XI"));
}

#[test]
fn document_without_lineup_is_malformed() {
    let raw = r#"[{"team_id": 1, "team_name": "A", "formations": [], "events": []}]"#;
    let err = extract_match(raw).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedInput { ref key } if key == "lineup"));

    let err = extract_match("{\"team_id\": 1}").unwrap_err();
    assert!(matches!(err, PipelineError::Json(_)));
}

#[test]
fn parses_teamsheet_fixture() {
    let sheet = parse_teamsheet_json(&read_fixture("teamsheet.json")).expect("fixture should parse");
    assert_eq!(sheet.side(Side::Home).len(), 3);
    assert_eq!(sheet.entry(Side::Home, 2).unwrap().player, "B. Lindqvist");
    assert_eq!(sheet.entry(Side::Away, 0).unwrap().jersey_number, 2);
    assert!(sheet.entry(Side::Away, 3).is_none());
}

#[test]
fn parses_tracking_fixture() {
    let raw = read_fixture("tracking_home.csv");
    let table = read_tracking(raw.as_bytes(), Side::Home).expect("fixture should parse");
    assert_eq!(table.len(), 300);
    assert_eq!(table.tags(), vec![0, 1, 2]);
    assert_eq!(table.periods[0], 1);
    assert_eq!(table.periods[299], 2);
    assert_eq!(table.player(2).unwrap().first_valid(), Some(100));
    assert!(table.times.as_ref().is_some_and(|t| (t[0] - 0.04).abs() < 1e-12));

    // the home file carries no away columns
    let err = read_tracking(raw.as_bytes(), Side::Away).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn(_)));
}

#[test]
fn parses_workload_fixture() {
    let table = read_workload(read_fixture("workload_home.csv").as_bytes()).expect("fixture should parse");
    assert_eq!(table.len(), 110);
    assert_eq!(table.series.len(), 3);
    assert_eq!(table.official_clock[0], "49:51");
    let series = table.series_for(Side::Home, 1).unwrap();
    assert_eq!(series[0], 12.0);
    assert!(table.series_for(Side::Away, 1).is_err());
}
