// Season report assembly and output.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use hindsight_core::config::LeagueConfig;
use hindsight_core::records::{OverallRecord, RecordTable};
use hindsight_core::resolve::LineupResolution;
use hindsight_core::season::{MissedStarter, SeasonSummary, TeamBenchSummary, UnitFailure};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Team totals with the display name attached.
#[derive(Debug, Serialize)]
pub struct TeamEntry<'a> {
    pub team_name: &'a str,
    #[serde(flatten)]
    pub summary: &'a TeamBenchSummary,
}

#[derive(Debug, Serialize)]
pub struct MissedStarterEntry<'a> {
    pub team_name: &'a str,
    #[serde(flatten)]
    pub missed: &'a MissedStarter,
}

#[derive(Debug, Serialize)]
pub struct SeasonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub league: &'a str,
    pub season: u16,
    pub through_week: Option<u32>,
    pub teams: Vec<TeamEntry<'a>>,
    /// League-wide top missed starters.
    pub missed_starters: Vec<MissedStarterEntry<'a>>,
    /// Top missed starters within each team.
    pub missed_starters_by_team: Vec<MissedStarterEntry<'a>>,
    pub resolutions: &'a [LineupResolution],
    pub failures: &'a [UnitFailure],
    pub records: Option<&'a RecordTable>,
}

/// Knobs that shape the report, taken from `[report]`.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub top_n: usize,
    pub per_team: usize,
    pub through_week: Option<u32>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

pub fn build_report<'a>(
    league: &'a LeagueConfig,
    summary: &'a SeasonSummary,
    records: Option<&'a RecordTable>,
    options: ReportOptions,
) -> SeasonReport<'a> {
    let missed_entry = move |missed: &'a MissedStarter| MissedStarterEntry {
        team_name: league.team_name(&missed.team_id),
        missed,
    };

    SeasonReport {
        generated_at: Utc::now(),
        league: &league.name,
        season: league.season,
        through_week: options.through_week,
        teams: summary
            .teams
            .iter()
            .map(|t| TeamEntry {
                team_name: league.team_name(&t.team_id),
                summary: t,
            })
            .collect(),
        missed_starters: summary
            .top_missed_starters(options.top_n)
            .into_iter()
            .map(missed_entry)
            .collect(),
        missed_starters_by_team: summary
            .top_missed_starters_per_team(options.per_team)
            .into_iter()
            .map(missed_entry)
            .collect(),
        resolutions: &summary.resolutions,
        failures: &summary.failures,
        records,
    }
}

/// Write the report as pretty JSON, creating parent directories as needed.
pub fn write_report(report: &SeasonReport<'_>, path: &Path) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(io_err)?;
    info!("wrote report to {}", path.display());
    Ok(())
}

/// Short plain-text summary for the terminal.
pub fn render_summary(report: &SeasonReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", report.league, report.season);
    let _ = writeln!(out);
    let _ = writeln!(out, "Points left on the bench");
    for entry in &report.teams {
        let _ = writeln!(
            out,
            "  {:<24} {:>8.2}  ({} subs over {} weeks)",
            entry.team_name,
            entry.summary.points_left_on_bench,
            entry.summary.substitution_count,
            entry.summary.weeks_resolved
        );
    }

    if !report.missed_starters.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Biggest missed starters");
        for entry in &report.missed_starters {
            let _ = writeln!(
                out,
                "  {:<24} {:<20} {:>8.2}  ({}x)",
                entry.missed.player_name,
                entry.team_name,
                entry.missed.potential_points,
                entry.missed.times
            );
        }
    }

    if let Some(records) = report.records {
        let luckiest: Vec<&OverallRecord> = records.luckiest();
        if let Some(lucky) = luckiest.first() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Luckiest: {} ({:+.3} win pct over all-play)",
                lucky.team, lucky.win_pct_over_expected
            );
        }
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} team-weeks could not be resolved", report.failures.len());
    }
    out
}
