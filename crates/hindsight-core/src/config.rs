// Configuration loading and parsing (league.toml, report.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("slot `{label}` names unknown position `{position}`")]
    UnknownPosition { label: String, position: String },

    #[error("slot `{label}` has negative count {count}")]
    NegativeCount { label: String, count: i64 },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub report: ReportConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub season: u16,
    /// Team id -> display name. Teams missing here are reported by id.
    #[serde(default)]
    pub teams: HashMap<String, String>,
    /// Starting slots in declaration order. Bench and reserve are implicit.
    pub slots: Vec<SlotConfig>,
}

impl LeagueConfig {
    /// Display name for a team, falling back to its id.
    pub fn team_name<'a>(&'a self, team_id: &'a str) -> &'a str {
        self.teams.get(team_id).map(String::as_str).unwrap_or(team_id)
    }
}

/// One `[[league.slots]]` entry.
///
/// `count` is signed so a negative value in the file is reported as a
/// schema error rather than a TOML type error.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotConfig {
    pub label: String,
    pub count: i64,
    /// Explicit eligible positions. When omitted, derived from the label
    /// by splitting on `/` (so "RB/WR/TE" accepts RB, WR and TE).
    #[serde(default)]
    pub eligible: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// report.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire report.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ReportFile {
    report: ReportConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Number of league-wide missed starters to keep.
    pub top_n: usize,
    /// Number of missed starters to keep per team.
    pub per_team: usize,
    /// Ignore weeks after this one. `None` uses every week in the data.
    #[serde(default)]
    pub through_week: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub lineups: String,
    #[serde(default)]
    pub matchups: Option<String>,
    pub output: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/report.toml`, relative to the given `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let report_path = config_dir.join("report.toml");
    let report_text = read_file(&report_path)?;
    let report_file: ReportFile =
        toml::from_str(&report_text).map_err(|e| ConfigError::ParseError {
            path: report_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        report: report_file.report,
        data_paths: report_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

// Slot-level checks live in `lineup::schema::requirements_for`, which every
// caller runs before resolving anything.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    let report = &config.report;
    let report_fields: &[(&str, usize)] = &[
        ("report.top_n", report.top_n),
        ("report.per_team", report.per_team),
    ];
    for (name, val) in report_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if report.through_week == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "report.through_week".into(),
            message: "weeks are 1-indexed".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
