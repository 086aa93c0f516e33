// Season aggregation: resolve every (team, week) lineup and fold the results.
//
// Units are independent, so they are resolved on the rayon pool and merged
// afterwards. A failed unit is recorded and skipped; it never aborts the
// batch.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ResolveError;
use crate::lineup::schema::SlotSchema;
use crate::lineup::snapshot::{PlayerId, RosterSnapshot};
use crate::resolve::{resolve, LineupResolution};

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// A (team, week) unit that could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    pub team_id: String,
    pub week: u32,
    pub message: String,
    #[serde(skip)]
    pub error: ResolveError,
}

impl UnitFailure {
    pub fn new(team_id: impl Into<String>, week: u32, error: ResolveError) -> Self {
        UnitFailure {
            team_id: team_id.into(),
            week,
            message: error.to_string(),
            error,
        }
    }
}

/// Season totals for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBenchSummary {
    pub team_id: String,
    pub weeks_resolved: usize,
    pub weeks_failed: usize,
    /// Number of substitutions that should have been made.
    pub substitution_count: usize,
    /// Sum of substitution deltas.
    pub points_left_on_bench: f64,
    /// Sum of optimal minus actual points.
    pub optimal_gap: f64,
}

impl TeamBenchSummary {
    fn new(team_id: &str) -> Self {
        TeamBenchSummary {
            team_id: team_id.to_string(),
            weeks_resolved: 0,
            weeks_failed: 0,
            substitution_count: 0,
            points_left_on_bench: 0.0,
            optimal_gap: 0.0,
        }
    }
}

/// A bench player a team should have started, summed over the season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedStarter {
    pub team_id: String,
    pub player_id: PlayerId,
    pub player_name: String,
    /// Points the team would have gained by starting this player.
    pub potential_points: f64,
    /// Weeks in which this player should have started.
    pub times: usize,
}

/// Everything the season batch produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeasonSummary {
    /// Successful resolutions, sorted by team then week.
    pub resolutions: Vec<LineupResolution>,
    /// Failed units, sorted by team then week.
    pub failures: Vec<UnitFailure>,
    /// Per-team totals, most points left on the bench first.
    pub teams: Vec<TeamBenchSummary>,
    /// Per (team, player) totals, most potential points first.
    pub missed_starters: Vec<MissedStarter>,
}

impl SeasonSummary {
    pub fn team(&self, team_id: &str) -> Option<&TeamBenchSummary> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }

    /// League-wide top `n` missed starters.
    pub fn top_missed_starters(&self, n: usize) -> Vec<&MissedStarter> {
        self.missed_starters.iter().take(n).collect()
    }

    /// Top `n` missed starters for each team, grouped by team id.
    pub fn top_missed_starters_per_team(&self, n: usize) -> Vec<&MissedStarter> {
        let mut by_team: BTreeMap<&str, Vec<&MissedStarter>> = BTreeMap::new();
        for missed in &self.missed_starters {
            let entries = by_team.entry(missed.team_id.as_str()).or_default();
            if entries.len() < n {
                entries.push(missed);
            }
        }
        by_team.into_values().flatten().collect()
    }

    /// Total substitutions across all teams.
    pub fn substitution_count(&self) -> usize {
        self.teams.iter().map(|t| t.substitution_count).sum()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Resolve every snapshot and fold the results.
pub fn resolve_season(snapshots: &[RosterSnapshot], schema: &SlotSchema) -> SeasonSummary {
    resolve_season_with(snapshots, schema, Vec::new())
}

/// Like [`resolve_season`], with units that already failed before
/// resolution (e.g. a roster that could not be built from its input rows).
/// They are folded in as failures alongside the resolved units.
pub fn resolve_season_with(
    snapshots: &[RosterSnapshot],
    schema: &SlotSchema,
    rejected: Vec<UnitFailure>,
) -> SeasonSummary {
    let mut outcomes: Vec<(String, u32, Result<LineupResolution, ResolveError>)> = snapshots
        .par_iter()
        .map(|snap| {
            (
                snap.team_id().to_string(),
                snap.week(),
                resolve(snap, schema),
            )
        })
        .collect();
    let unit_count = outcomes.len() + rejected.len();
    outcomes.extend(
        rejected
            .into_iter()
            .map(|failure| (failure.team_id, failure.week, Err(failure.error))),
    );

    let summary = summarize(outcomes);
    info!(
        "resolved {} of {} lineups ({} failed, {} substitutions)",
        summary.resolutions.len(),
        unit_count,
        summary.failures.len(),
        summary.substitution_count()
    );
    summary
}

/// Fold per-unit outcomes into a summary. Input order does not matter.
pub fn summarize(
    mut outcomes: Vec<(String, u32, Result<LineupResolution, ResolveError>)>,
) -> SeasonSummary {
    outcomes.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut teams: BTreeMap<String, TeamBenchSummary> = BTreeMap::new();
    let mut missed: BTreeMap<(String, PlayerId), MissedStarter> = BTreeMap::new();
    let mut summary = SeasonSummary::default();

    for (team_id, week, outcome) in outcomes {
        let team = teams
            .entry(team_id.clone())
            .or_insert_with(|| TeamBenchSummary::new(&team_id));

        let resolution = match outcome {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!("skipping team {} week {}: {}", team_id, week, error);
                team.weeks_failed += 1;
                summary.failures.push(UnitFailure::new(team_id, week, error));
                continue;
            }
        };

        team.weeks_resolved += 1;
        team.substitution_count += resolution.substitutions.len();
        team.points_left_on_bench += resolution.points_left_on_bench();
        team.optimal_gap += resolution.optimal_gap();

        for record in &resolution.substitutions {
            let entry = missed
                .entry((team_id.clone(), record.incoming.id))
                .or_insert_with(|| MissedStarter {
                    team_id: team_id.clone(),
                    player_id: record.incoming.id,
                    player_name: record.incoming.name.clone(),
                    potential_points: 0.0,
                    times: 0,
                });
            entry.potential_points += record.points_delta;
            entry.times += 1;
        }

        summary.resolutions.push(resolution);
    }

    summary.teams = teams.into_values().collect();
    summary.teams.sort_by(|a, b| {
        b.points_left_on_bench
            .total_cmp(&a.points_left_on_bench)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    summary.missed_starters = missed.into_values().collect();
    summary.missed_starters.sort_by(|a, b| {
        b.potential_points
            .total_cmp(&a.potential_points)
            .then_with(|| b.times.cmp(&a.times))
            .then_with(|| a.team_id.cmp(&b.team_id))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    summary
}
