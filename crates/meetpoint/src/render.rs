use std::fmt::Write as _;

use meetpoint_core::formatting::format_hours;
use meetpoint_core::models::{AnomalyRecord, MeetingSlotSummary, MeetingStatistics};
use meetpoint_data::analysis::{AnalysisMetadata, AnalysisResult};
use serde::Serialize;

/// Document written to stdout with `--format json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    statistics: &'a [MeetingStatistics],
    trip_summaries: &'a [MeetingSlotSummary],
    metadata: &'a AnalysisMetadata,
}

pub fn render_json(result: &AnalysisResult, pretty: bool) -> anyhow::Result<String> {
    let report = JsonReport {
        statistics: &result.statistics,
        trip_summaries: &result.summaries,
        metadata: &result.metadata,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

/// Plain-text report: one block per meeting slot, then any skipped slots.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = String::new();

    for stats in &result.statistics {
        let _ = writeln!(out, "Meeting {}", stats.meeting_time);
        let _ = writeln!(
            out,
            "  travel      max {}  min {}  avg {}",
            format_hours(stats.max_travel_time),
            format_hours(stats.min_travel_time),
            format_hours(stats.average_travel_time)
        );
        let _ = writeln!(
            out,
            "  arrivals    {} - {}  (median {})",
            stats.earliest_arrival, stats.latest_arrival, stats.median_arrival_time
        );
        let _ = writeln!(
            out,
            "  departures  {} - {}",
            stats.earliest_departure, stats.latest_departure
        );
        let _ = writeln!(out, "  difficult   {}", anomaly_list(&stats.difficult_travels));
        let _ = writeln!(out, "  too long    {}", anomaly_list(&stats.too_long_travel));
    }

    for skipped in &result.metadata.skipped_slots {
        let _ = writeln!(out, "Skipped {}: {}", skipped.meeting_time, skipped.reason);
    }

    out
}

fn anomaly_list(records: &[AnomalyRecord]) -> String {
    if records.is_empty() {
        return "none".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "{} {} ({})",
                r.trip.city,
                format_hours(r.trip.spent_time_in_hour),
                r.meeting_time
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
