use std::fs;
use std::path::PathBuf;

use matchday_analytics::config::AnalysisConfig;
use matchday_analytics::extract::extract_match;
use matchday_analytics::lineup::{
    assemble_match, display_markers, Placement, SubMarker, GOAL_GLYPH, SUB_OFF_GLYPH, SUB_ON_GLYPH,
    YELLOW_CARD_GLYPH,
};
use matchday_analytics::pitch::{self, Formation, PitchGeometry, Side};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn every_starter_lands_on_a_formation_slot() {
    let extracted = extract_match(&read_fixture("lineups.json")).expect("fixture should parse");
    let rows = assemble_match(&extracted, &AnalysisConfig::default()).expect("lineup should assemble");
    assert_eq!(rows.len(), 24);

    for side in [Side::Home, Side::Away] {
        let pitch_rows: Vec<_> = rows.iter().filter(|r| r.side == side && r.on_pitch()).collect();
        let bench_rows: Vec<_> = rows
            .iter()
            .filter(|r| r.side == side && r.placement == Placement::Bench)
            .collect();
        assert_eq!(pitch_rows.len(), 11, "{side} pitch rows");
        assert_eq!(bench_rows.len(), 1, "{side} bench rows");
    }

    let home_slots = pitch::layout(Formation::F433, Side::Home, PitchGeometry::default());
    let home_rows: Vec<_> = rows.iter().filter(|r| r.side == Side::Home && r.on_pitch()).collect();
    for (slot, row) in home_slots.iter().zip(home_rows.iter()) {
        assert_eq!(slot.position, row.position);
        assert_eq!((slot.x, slot.y), (row.x, row.y));
    }
}

#[test]
fn away_side_is_mirrored() {
    let extracted = extract_match(&read_fixture("lineups.json")).unwrap();
    let rows = assemble_match(&extracted, &AnalysisConfig::default()).unwrap();
    let home_gk = rows.iter().find(|r| r.player_id == 101).unwrap();
    let away_gk = rows.iter().find(|r| r.player_id == 201).unwrap();
    assert_eq!(home_gk.side, Side::Home);
    assert_eq!(away_gk.side, Side::Away);
    assert!((home_gk.y + away_gk.y - 105.0).abs() < 1e-9);
    assert!(home_gk.y < 52.5);

    let striker = rows.iter().find(|r| r.player_id == 211).unwrap();
    assert_eq!(striker.position, "Center Forward");
    assert!(striker.y < away_gk.y);
}

#[test]
fn configured_home_team_flips_sides() {
    let extracted = extract_match(&read_fixture("lineups.json")).unwrap();
    let cfg = AnalysisConfig {
        home_team: Some("Harbour City WFC".to_string()),
        ..Default::default()
    };
    let rows = assemble_match(&extracted, &cfg).unwrap();
    let harbour_gk = rows.iter().find(|r| r.player_id == 201).unwrap();
    assert_eq!(harbour_gk.side, Side::Home);
    assert!(harbour_gk.y < 52.5);
}

#[test]
fn substitutes_carry_entry_minutes_and_markers() {
    let extracted = extract_match(&read_fixture("lineups.json")).unwrap();
    let rows = assemble_match(&extracted, &AnalysisConfig::default()).unwrap();

    let late_sub = rows.iter().find(|r| r.player_id == 112).unwrap();
    assert_eq!(late_sub.placement, Placement::Bench);
    assert_eq!(late_sub.from_minute, 68);
    assert_eq!(late_sub.from_display, "68");
    assert_eq!(late_sub.sub_marker(), SubMarker::SubbedOn);
    assert_eq!(late_sub.goals, None);

    let stoppage_sub = rows.iter().find(|r| r.player_id == 212).unwrap();
    assert_eq!(stoppage_sub.from_minute, 47);
    assert_eq!(stoppage_sub.from_display, "45'+2");

    let replaced = rows.iter().find(|r| r.player_id == 110).unwrap();
    assert_eq!(replaced.sub_marker(), SubMarker::SubbedOff);
    assert_eq!(replaced.counterpart_id, Some(112));
    let markers = display_markers(replaced);
    assert_eq!(markers.goals, GOAL_GLYPH.repeat(2));
    assert_eq!(markers.player_name, format!("{SUB_OFF_GLYPH}Bea Lindqvist"));

    let markers = display_markers(late_sub);
    assert!(markers.player_name.starts_with(SUB_ON_GLYPH));
    assert!(markers.goals.is_empty());
}

#[test]
fn cards_are_tallied_per_player() {
    let extracted = extract_match(&read_fixture("lineups.json")).unwrap();
    let rows = assemble_match(&extracted, &AnalysisConfig::default()).unwrap();
    let by_id = |id: u64| rows.iter().find(|r| r.player_id == id).unwrap();

    assert_eq!(by_id(103).yellow_cards, 1);
    assert_eq!(by_id(107).yellow_cards, 2);
    assert_eq!(by_id(107).red_cards, 0);
    assert_eq!(by_id(205).red_cards, 1);
    assert_eq!(by_id(101).yellow_cards, 0);

    let markers = display_markers(by_id(107));
    assert_eq!(markers.yellow_cards, YELLOW_CARD_GLYPH.repeat(2));
    assert!(markers.red_cards.is_empty());
    assert!(display_markers(by_id(101)).yellow_cards.is_empty());
}

#[test]
fn nickname_wins_for_display() {
    let extracted = extract_match(&read_fixture("lineups.json")).unwrap();
    let rows = assemble_match(&extracted, &AnalysisConfig::default()).unwrap();
    let row = rows.iter().find(|r| r.player_id == 106).unwrap();
    assert_eq!(row.player_name, "Saoirse Kelly-Byrne");
}
