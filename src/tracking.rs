use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::pitch::Side;

const BOM: char = '\u{feff}';
const TIME_COLUMNS: [&str; 3] = ["Time [s]", "Time_sec", "time"];
pub const WORKLOAD_SUFFIX: &str = "Metabolic_power";

/// One player's column pair; `None` where the player was off the pitch or
/// the sample was not recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTrack {
    pub tag: u32,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
}

impl PlayerTrack {
    pub fn first_valid(&self) -> Option<usize> {
        self.x.iter().position(Option::is_some)
    }

    pub fn last_valid(&self) -> Option<usize> {
        self.x.iter().rposition(Option::is_some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingTable {
    pub side: Side,
    pub periods: Vec<u8>,
    /// Clock in seconds, when the export carries one.
    pub times: Option<Vec<f64>>,
    pub players: Vec<PlayerTrack>,
}

impl TrackingTable {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn player(&self, tag: u32) -> Option<&PlayerTrack> {
        self.players.iter().find(|p| p.tag == tag)
    }

    pub fn tags(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.tag).collect()
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim().trim_start_matches(BOM).trim().to_string()
}

fn parse_cell(raw: Option<&str>) -> Result<Option<f64>, ()> {
    let Some(raw) = raw.map(str::trim) else { return Ok(None) };
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(()),
    }
}

/// `Home_7_x` -> `Some(7)` for the home side.
fn player_tag(header: &str, side: Side, axis: &str) -> Option<u32> {
    let rest = header.strip_prefix(side.label())?.strip_prefix('_')?;
    let (tag, suffix) = rest.split_once('_')?;
    if !suffix.eq_ignore_ascii_case(axis) {
        return None;
    }
    tag.parse().ok()
}

fn semicolon_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader)
}

fn open(path: &Path) -> PipelineResult<File> {
    File::open(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a `;`-delimited tracking export for one side.
pub fn read_tracking<R: Read>(reader: R, side: Side) -> PipelineResult<TrackingTable> {
    let mut rdr = semicolon_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();

    let period_col = headers.iter().position(|h| h == "Period");
    let time_col = headers
        .iter()
        .position(|h| TIME_COLUMNS.contains(&h.as_str()));

    let mut columns: Vec<(u32, usize, usize)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let Some(tag) = player_tag(header, side, "x") else { continue };
        let Some(y_idx) = headers
            .iter()
            .position(|h| player_tag(h, side, "y") == Some(tag))
        else {
            return Err(PipelineError::MissingColumn(format!("{side}_{tag}_y")));
        };
        columns.push((tag, idx, y_idx));
    }
    if columns.is_empty() {
        return Err(PipelineError::MissingColumn(format!("{side}_<n>_x")));
    }

    let mut table = TrackingTable {
        side,
        periods: Vec::new(),
        times: time_col.map(|_| Vec::new()),
        players: columns
            .iter()
            .map(|(tag, _, _)| PlayerTrack {
                tag: *tag,
                x: Vec::new(),
                y: Vec::new(),
            })
            .collect(),
    };

    let mut bad_cells = 0usize;
    for record in rdr.records() {
        let record = record?;
        let period = period_col
            .and_then(|i| record.get(i))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|p| p as u8)
            .unwrap_or(1);
        table.periods.push(period);
        if let (Some(times), Some(i)) = (table.times.as_mut(), time_col) {
            let t = parse_cell(record.get(i)).unwrap_or_else(|_| {
                bad_cells += 1;
                None
            });
            times.push(t.unwrap_or(f64::NAN));
        }
        for (track, (_, x_idx, y_idx)) in table.players.iter_mut().zip(columns.iter()) {
            let x = parse_cell(record.get(*x_idx));
            let y = parse_cell(record.get(*y_idx));
            match (x, y) {
                (Ok(x), Ok(y)) => {
                    // a sample needs both coordinates
                    let pair = x.zip(y);
                    track.x.push(pair.map(|(x, _)| x));
                    track.y.push(pair.map(|(_, y)| y));
                }
                _ => {
                    bad_cells += 1;
                    track.x.push(None);
                    track.y.push(None);
                }
            }
        }
    }

    if bad_cells > 0 {
        warn!(%side, bad_cells, "unparseable tracking cells treated as missing");
    }
    debug!(%side, samples = table.len(), players = table.players.len(), "loaded tracking");
    Ok(table)
}

pub fn load_tracking(path: &Path, side: Side) -> PipelineResult<TrackingTable> {
    read_tracking(open(path)?, side)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsheetEntry {
    #[serde(rename = "jID")]
    pub jersey_number: u32,
    pub player: String,
}

/// Tracking display names per side; list index is the tracking tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teamsheet {
    #[serde(rename = "Home", default)]
    pub home: Vec<TeamsheetEntry>,
    #[serde(rename = "Away", default)]
    pub away: Vec<TeamsheetEntry>,
}

impl Teamsheet {
    pub fn side(&self, side: Side) -> &[TeamsheetEntry] {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn entry(&self, side: Side, tag: u32) -> Option<&TeamsheetEntry> {
        self.side(side).get(tag as usize)
    }
}

pub fn parse_teamsheet_json(raw: &str) -> PipelineResult<Teamsheet> {
    Ok(serde_json::from_str(raw.trim_start_matches(BOM))?)
}

pub fn load_teamsheet(path: &Path) -> PipelineResult<Teamsheet> {
    let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_teamsheet_json(&raw)
}

/// Per-player workload series sharing one clock.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadTable {
    pub periods: Vec<u8>,
    pub time_sec: Vec<f64>,
    pub official_clock: Vec<String>,
    pub series: Vec<(String, Vec<f64>)>,
}

impl WorkloadTable {
    pub fn len(&self) -> usize {
        self.time_sec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_sec.is_empty()
    }

    pub fn column_name(side: Side, tag: u32) -> String {
        format!("{side}_{tag}_{WORKLOAD_SUFFIX}")
    }

    /// Missing cells come back as NaN.
    pub fn series_for(&self, side: Side, tag: u32) -> PipelineResult<&[f64]> {
        let name = Self::column_name(side, tag);
        self.series
            .iter()
            .find(|(col, _)| *col == name)
            .map(|(_, values)| values.as_slice())
            .ok_or(PipelineError::MissingColumn(name))
    }
}

pub fn read_workload<R: Read>(reader: R) -> PipelineResult<WorkloadTable> {
    let mut rdr = semicolon_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();

    let Some(time_col) = headers.iter().position(|h| h == "Time_sec") else {
        return Err(PipelineError::MissingColumn("Time_sec".to_string()));
    };
    let period_col = headers.iter().position(|h| h == "Period");
    let clock_col = headers.iter().position(|h| h == "official_clock");
    let value_cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.ends_with(WORKLOAD_SUFFIX))
        .map(|(i, _)| i)
        .collect();

    let mut table = WorkloadTable {
        periods: Vec::new(),
        time_sec: Vec::new(),
        official_clock: Vec::new(),
        series: value_cols
            .iter()
            .map(|i| (headers[*i].clone(), Vec::new()))
            .collect(),
    };

    for record in rdr.records() {
        let record = record?;
        table.periods.push(
            period_col
                .and_then(|i| record.get(i))
                .and_then(|s| s.trim().parse::<u8>().ok())
                .unwrap_or(1),
        );
        table.time_sec.push(
            parse_cell(record.get(time_col))
                .ok()
                .flatten()
                .unwrap_or(f64::NAN),
        );
        table.official_clock.push(
            clock_col
                .and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        );
        for ((_, values), idx) in table.series.iter_mut().zip(value_cols.iter()) {
            values.push(parse_cell(record.get(*idx)).ok().flatten().unwrap_or(f64::NAN));
        }
    }

    debug!(samples = table.len(), series = table.series.len(), "loaded workload");
    Ok(table)
}

pub fn load_workload(path: &Path) -> PipelineResult<WorkloadTable> {
    read_workload(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACKING: &str = "\u{feff}Period;Frame;Time [s];Home_0_x;Home_0_y;Home_1_x;Home_1_y;Away_0_x;Away_0_y\n\
        1;1;0.04;10.0;20.0;NaN;NaN;50;30\n\
        1;2;0.08;10.5;20.0;;;50;30\n\
        2;3;0.12;11.0;20.5;3.0;4.0;50;30\n";

    #[test]
    fn reads_side_columns_and_missing_cells() {
        let table = read_tracking(TRACKING.as_bytes(), Side::Home).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.tags(), vec![0, 1]);
        assert_eq!(table.periods, vec![1, 1, 2]);
        assert_eq!(table.times.as_ref().unwrap()[2], 0.12);
        let p1 = table.player(1).unwrap();
        assert_eq!(p1.x, vec![None, None, Some(3.0)]);
        assert_eq!(p1.first_valid(), Some(2));
        assert_eq!(table.player(0).unwrap().last_valid(), Some(2));

        let away = read_tracking(TRACKING.as_bytes(), Side::Away).unwrap();
        assert_eq!(away.tags(), vec![0]);
    }

    #[test]
    fn table_without_side_columns_fails() {
        let raw = "Period;Time [s];Ball_x;Ball_y\n1;0.04;1;2\n";
        let err = read_tracking(raw.as_bytes(), Side::Home).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }

    #[test]
    fn teamsheet_index_is_tag() {
        let sheet = parse_teamsheet_json(
            r#"{"Home": [{"jID": 1, "player": "E. Roebuck"}, {"jID": 5, "player": "A. Greenwood"}]}"#,
        )
        .unwrap();
        assert_eq!(sheet.entry(Side::Home, 1).unwrap().player, "A. Greenwood");
        assert!(sheet.side(Side::Away).is_empty());
    }

    #[test]
    fn workload_series_by_side_and_tag() {
        let raw = "Period;Time_sec;official_clock;Home_3_Metabolic_power;Away_0_Metabolic_power\n\
            1;1;00:01;4.5;2.0\n\
            1;2;00:02;;2.5\n";
        let table = read_workload(raw.as_bytes()).unwrap();
        let home = table.series_for(Side::Home, 3).unwrap();
        assert_eq!(home[0], 4.5);
        assert!(home[1].is_nan());
        assert!(table.series_for(Side::Home, 9).is_err());
        assert_eq!(table.official_clock[1], "00:02");
    }
}
