// Hindsight entry point.
//
// Usage: hindsight [BASE_DIR]
//
// Reads config/league.toml and config/report.toml under BASE_DIR (default:
// the current directory), resolves every team-week in the lineups CSV,
// writes the JSON report and prints a short summary.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use hindsight_app::app;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("hindsight starting up");

    let base_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let outcome = app::run(&base_dir)?;
    print!("{}", outcome.text);
    println!();
    println!("Report written to {}", outcome.output.display());

    info!("hindsight finished");
    Ok(())
}

/// Initialize tracing to stderr so stdout carries only the summary.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hindsight=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
