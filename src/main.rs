//! Exports the G-Click task report for every responsible user.
//!
//! Takes no arguments; configuration comes from the environment (see
//! `gclick_report::config`).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gclick_report::report::ExportOutcome;
use gclick_report::{Config, ReportPipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the real environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Starting task report");

    let config = Config::from_env()?;
    let pipeline = ReportPipeline::from_config(&config)?;
    let summary = pipeline.run().await?;

    match &summary.outcome {
        ExportOutcome::Written(path) => tracing::info!(
            "Done: {} tasks from {} users ({} excluded) written to {}",
            summary.tasks,
            summary.owners,
            summary.excluded,
            path.display()
        ),
        ExportOutcome::NoTasks => tracing::info!("Done: no tasks found"),
    }

    Ok(())
}
