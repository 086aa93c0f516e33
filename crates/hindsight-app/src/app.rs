// End-to-end season run: config, inputs, resolution, report.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use hindsight_core::config::{self, Config};
use hindsight_core::lineup::schema::{requirements_for, SlotSchema};
use hindsight_core::records::RecordTable;
use hindsight_core::season::{resolve_season_with, SeasonSummary};

use crate::input;
use crate::report::{self, ReportOptions};

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: SeasonSummary,
    pub records: Option<RecordTable>,
    /// Where the JSON report was written.
    pub output: PathBuf,
    /// Terminal summary.
    pub text: String,
}

/// Run a full season report for the league configured under `base_dir`.
///
/// Data paths in `report.toml` are resolved relative to `base_dir`.
pub fn run(base_dir: &Path) -> anyhow::Result<RunOutcome> {
    let config = config::load_config_from(base_dir).context("failed to load configuration")?;
    info!(
        "config loaded: league={}, season {}, {} slot types",
        config.league.name,
        config.league.season,
        config.league.slots.len()
    );

    let schema = requirements_for(&config.league).context("invalid slot configuration")?;
    info!("{} starting slots per lineup", schema.starter_count());

    run_with(base_dir, &config, &schema)
}

fn run_with(base_dir: &Path, config: &Config, schema: &SlotSchema) -> anyhow::Result<RunOutcome> {
    let through_week = config.report.through_week;

    let lineups_path = base_dir.join(&config.data_paths.lineups);
    let lineups =
        input::load_lineups(&lineups_path, through_week).context("failed to load lineups")?;

    // Team-weeks rejected at load time are reported alongside solver failures.
    let summary = resolve_season_with(&lineups.snapshots, schema, lineups.rejected);

    let records = match &config.data_paths.matchups {
        Some(path) => {
            let matchups = input::load_matchups(&base_dir.join(path), through_week)
                .context("failed to load matchups")?;
            info!("loaded {} matchups", matchups.len());
            Some(RecordTable::from_matchups(&matchups))
        }
        None => None,
    };

    let options = ReportOptions {
        top_n: config.report.top_n,
        per_team: config.report.per_team,
        through_week,
    };
    let output = base_dir.join(&config.data_paths.output);
    let season_report = report::build_report(&config.league, &summary, records.as_ref(), options);
    report::write_report(&season_report, &output).context("failed to write report")?;
    let text = report::render_summary(&season_report);

    Ok(RunOutcome {
        summary,
        records,
        output,
        text,
    })
}
