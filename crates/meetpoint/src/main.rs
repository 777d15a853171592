mod bootstrap;
mod render;

use anyhow::{Context, Result};
use meetpoint_core::settings::{OutputFormat, Settings};
use meetpoint_data::analysis::analyze_path;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("meetpoint v{} starting", env!("CARGO_PKG_VERSION"));

    if settings.clear {
        tracing::info!("Cleared saved parameters");
        return Ok(());
    }

    let Some(input) = settings.input.as_deref() else {
        anyhow::bail!("no routes file or directory given");
    };

    let config = settings.analysis_config()?;
    tracing::info!(
        "Input: {}, threshold: {}h, durations: {:?}, anomalies: {:?}, on error: {:?}",
        input.display(),
        config.aggregation.too_long_threshold_hours,
        config.duration_source,
        config.aggregation.anomaly_scope,
        config.failure_policy
    );

    let result = analyze_path(input, &config)
        .with_context(|| format!("Failed to analyse routes in {}", input.display()))?;

    let meta = &result.metadata;
    tracing::info!(
        "Reported {} of {} slots ({} trips) in {:.3}s",
        meta.slots_reported,
        meta.slots_received,
        meta.trips_summarised,
        meta.transform_time_seconds
    );
    if !meta.skipped_slots.is_empty() {
        tracing::warn!("{} slots skipped", meta.skipped_slots.len());
    }

    let output = match settings.format {
        OutputFormat::Json => render::render_json(&result, settings.pretty)?,
        OutputFormat::Text => render::render_text(&result),
    };
    println!("{output}");

    Ok(())
}
