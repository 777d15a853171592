//! End-to-end analysis pipeline.
//!
//! Builds trip summaries for every slot, aggregates them, and applies the
//! configured failure policy, returning an [`AnalysisResult`] ready for a
//! report formatter.

use std::path::Path;

use chrono::Utc;
use meetpoint_core::error::{PlannerError, Result};
use meetpoint_core::models::{MeetingSlotRoutes, MeetingSlotSummary, MeetingStatistics};
use meetpoint_core::settings::{AnalysisConfig, FailurePolicy};
use meetpoint_core::statistics::{share_anomalies, AnomalyScope, StatisticsAggregator};
use meetpoint_core::trips::TripSummaryBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use crate::reader::load_routes;

// ── Public types ──────────────────────────────────────────────────────────────

/// A slot left out of the result under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSlot {
    pub meeting_time: String,
    pub reason: String,
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of slots handed to the pipeline.
    pub slots_received: usize,
    /// Number of slots with statistics in the result.
    pub slots_reported: usize,
    /// Trip summaries across all reported slots.
    pub trips_summarised: usize,
    pub skipped_slots: Vec<SkippedSlot>,
    /// Wall-clock seconds spent building and aggregating.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_routes`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Trip summaries of the reported slots, in input order.
    pub summaries: Vec<MeetingSlotSummary>,
    /// One statistics record per reported slot, in input order.
    pub statistics: Vec<MeetingStatistics>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over slots already in memory.
///
/// 1. Build trip summaries for each slot.
/// 2. Aggregate each slot's summaries.
/// 3. On a failing slot, abort or skip it as `config.failure_policy` says.
/// 4. Share anomaly lists across records under [`AnomalyScope::Cumulative`].
pub fn analyze_routes(slots: &[MeetingSlotRoutes], config: &AnalysisConfig) -> Result<AnalysisResult> {
    let started = std::time::Instant::now();
    let builder =
        TripSummaryBuilder::new(config.reference).with_duration_source(config.duration_source);
    let aggregator = StatisticsAggregator::new(config.aggregation.clone())?;

    let mut summaries = Vec::with_capacity(slots.len());
    let mut statistics = Vec::with_capacity(slots.len());
    let mut skipped_slots = Vec::new();

    for slot in slots {
        match analyze_slot(&builder, &aggregator, slot) {
            Ok((summary, stats)) => {
                summaries.push(summary);
                statistics.push(stats);
            }
            Err(err) if config.failure_policy == FailurePolicy::Skip => {
                let kind = if err.is_format_error() {
                    "malformed routing data"
                } else {
                    "unusable slot"
                };
                warn!("Skipping slot {} ({}): {}", slot.arrival_time, kind, err);
                skipped_slots.push(SkippedSlot {
                    meeting_time: slot.arrival_time.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    if config.aggregation.anomaly_scope == AnomalyScope::Cumulative {
        share_anomalies(&mut statistics);
    }

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        slots_received: slots.len(),
        slots_reported: statistics.len(),
        trips_summarised: summaries.iter().map(|s| s.trips.len()).sum(),
        skipped_slots,
        transform_time_seconds: started.elapsed().as_secs_f64(),
    };

    debug!(
        "Analysed {} of {} slots",
        metadata.slots_reported, metadata.slots_received
    );

    Ok(AnalysisResult {
        summaries,
        statistics,
        metadata,
    })
}

/// Load routes from `path` (file or directory) and run [`analyze_routes`].
pub fn analyze_path(path: &Path, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let slots = load_routes(path)?;
    analyze_routes(&slots, config)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn analyze_slot(
    builder: &TripSummaryBuilder,
    aggregator: &StatisticsAggregator,
    slot: &MeetingSlotRoutes,
) -> std::result::Result<(MeetingSlotSummary, MeetingStatistics), PlannerError> {
    let summary = builder.build_slot(slot)?;
    let stats = aggregator.aggregate_slot(&summary)?;
    Ok((summary, stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
