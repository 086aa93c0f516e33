// CSV loading for weekly lineups and matchup results.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use hindsight_core::lineup::position::{ActualSlot, Position};
use hindsight_core::lineup::snapshot::{Player, RosterSnapshot};
use hindsight_core::records::MatchupResult;
use hindsight_core::season::UnitFailure;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Lineups grouped by (team, week).
///
/// A team-week whose rows do not form a valid roster (a repeated player id,
/// say) lands in `rejected` and the other team-weeks still load.
#[derive(Debug, Default)]
pub struct LineupLoad {
    pub snapshots: Vec<RosterSnapshot>,
    pub rejected: Vec<UnitFailure>,
}

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

/// One player-week. `slot` is the platform label the player was actually
/// deployed in ("QB", "RB/WR/TE", "BE", "IR", ...).
#[derive(Debug, Deserialize)]
struct RawLineupRow {
    team_id: String,
    week: u32,
    player_id: i64,
    player_name: String,
    position: String,
    slot: String,
    points: f64,
}

#[derive(Debug, Deserialize)]
struct RawMatchupRow {
    week: u32,
    home_team: String,
    home_score: f64,
    away_team: String,
    away_score: f64,
}

/// A parsed lineup row, not yet grouped into a snapshot.
#[derive(Debug)]
struct LineupRow {
    team_id: String,
    week: u32,
    player: Player,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn lineup_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<LineupRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawLineupRow>() {
        match result {
            Ok(raw) => {
                let name = raw.player_name.trim();
                if !raw.points.is_finite() {
                    warn!("skipping '{}': non-finite points", name);
                    continue;
                }
                let Some(position) = Position::from_str_pos(&raw.position) else {
                    warn!("skipping '{}': unknown position '{}'", name, raw.position);
                    continue;
                };
                rows.push(LineupRow {
                    team_id: raw.team_id.trim().to_string(),
                    week: raw.week,
                    player: Player::new(
                        raw.player_id,
                        name,
                        position,
                        raw.points,
                        ActualSlot::parse(&raw.slot),
                    ),
                });
            }
            Err(e) => {
                warn!("skipping malformed lineup row: {}", e);
            }
        }
    }
    Ok(rows)
}

fn matchups_from_reader<R: Read>(rdr: R) -> Result<Vec<MatchupResult>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut matchups = Vec::new();
    for result in reader.deserialize::<RawMatchupRow>() {
        match result {
            Ok(raw) => {
                if !(raw.home_score.is_finite() && raw.away_score.is_finite()) {
                    warn!(
                        "skipping week {} matchup {} vs {}: non-finite score",
                        raw.week, raw.home_team, raw.away_team
                    );
                    continue;
                }
                matchups.push(MatchupResult {
                    week: raw.week,
                    home_team: raw.home_team.trim().to_string(),
                    home_score: raw.home_score,
                    away_team: raw.away_team.trim().to_string(),
                    away_score: raw.away_score,
                });
            }
            Err(e) => {
                warn!("skipping malformed matchup row: {}", e);
            }
        }
    }
    Ok(matchups)
}

/// Group rows by (team, week) into validated snapshots, sorted by team then
/// week. Rows after `through_week` are dropped.
fn group_snapshots(rows: Vec<LineupRow>, through_week: Option<u32>) -> LineupLoad {
    let mut groups: BTreeMap<(String, u32), Vec<Player>> = BTreeMap::new();
    for row in rows {
        if through_week.is_some_and(|last| row.week > last) {
            continue;
        }
        groups
            .entry((row.team_id, row.week))
            .or_default()
            .push(row.player);
    }

    let mut load = LineupLoad::default();
    for ((team_id, week), players) in groups {
        match RosterSnapshot::new(team_id.clone(), week, players) {
            Ok(snapshot) => load.snapshots.push(snapshot),
            Err(e) => {
                warn!("rejecting roster for team {} week {}: {}", team_id, week, e);
                load.rejected.push(UnitFailure::new(team_id, week, e));
            }
        }
    }
    load
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load weekly lineups and group them into one snapshot per (team, week).
pub fn load_lineups(path: &Path, through_week: Option<u32>) -> Result<LineupLoad, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let rows = lineup_rows_from_reader(file).map_err(|e| InputError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    let row_count = rows.len();
    let load = group_snapshots(rows, through_week);
    info!(
        "loaded {} lineup rows into {} team-weeks ({} rejected) from {}",
        row_count,
        load.snapshots.len(),
        load.rejected.len(),
        path.display()
    );
    Ok(load)
}

/// Load head-to-head results. Games after `through_week` are dropped.
pub fn load_matchups(path: &Path, through_week: Option<u32>) -> Result<Vec<MatchupResult>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut matchups = matchups_from_reader(file).map_err(|e| InputError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if let Some(last) = through_week {
        matchups.retain(|m| m.week <= last);
    }
    Ok(matchups)
}
