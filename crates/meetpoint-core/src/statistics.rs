//! Per-slot travel statistics and anomaly classification.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::median::median;
use crate::models::{AnomalyRecord, DateSpan, MeetingSlotSummary, MeetingStatistics, TripSummary};
use crate::time_utils::{minutes_to_time, time_to_minutes};

/// Same-day trips longer than this many hours are reported as too long.
pub const DEFAULT_TOO_LONG_THRESHOLD_HOURS: f64 = 10.0;

/// Sentinels for earliest/latest tracking. Valid because every time of day
/// is a fixed-width, zero-padded `HH:MM:SS` string.
const LATEST_CLOCK: &str = "23:59:59";
const EARLIEST_CLOCK: &str = "00:00:00";

// ── Configuration ─────────────────────────────────────────────────────────────

/// How far the anomaly lists of a statistics record reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyScope {
    /// Each record lists only its own slot's anomalies.
    #[default]
    PerSlot,
    /// Every record carries the anomalies of the whole pass, matching the
    /// output of the legacy service.
    Cumulative,
}

/// Tunables for [`StatisticsAggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Threshold for the `tooLongTravel` list, in hours.
    pub too_long_threshold_hours: f64,
    pub anomaly_scope: AnomalyScope,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            too_long_threshold_hours: DEFAULT_TOO_LONG_THRESHOLD_HOURS,
            anomaly_scope: AnomalyScope::PerSlot,
        }
    }
}

impl AggregationConfig {
    /// Reject thresholds that would make the classification meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.too_long_threshold_hours.is_finite() || self.too_long_threshold_hours < 0.0 {
            return Err(PlannerError::Config(format!(
                "too-long threshold must be a non-negative number of hours, got {}",
                self.too_long_threshold_hours
            )));
        }
        Ok(())
    }
}

// ── Classification ────────────────────────────────────────────────────────────

/// Which anomaly list, if any, a trip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripClass {
    Normal,
    /// The traveler must leave on an earlier calendar date.
    Difficult,
    /// Same-day trip above the threshold.
    TooLong,
}

/// Classify one trip. Overnight trips are never also too long, and trips
/// with a reversed date span are in neither list.
pub fn classify(trip: &TripSummary, too_long_threshold_hours: f64) -> TripClass {
    match trip.date_span {
        DateSpan::Overnight => TripClass::Difficult,
        DateSpan::SameDay if trip.spent_time_in_hour > too_long_threshold_hours => {
            TripClass::TooLong
        }
        _ => TripClass::Normal,
    }
}

// ── SlotAccumulator ───────────────────────────────────────────────────────────

/// Running totals for a single scan over one slot's trips.
struct SlotAccumulator<'a> {
    total_minutes: i64,
    count: usize,
    max_minutes: i64,
    min_minutes: f64,
    earliest_arrival: &'a str,
    latest_arrival: &'a str,
    earliest_departure: &'a str,
    latest_departure: &'a str,
    arrival_minutes: Vec<f64>,
    difficult: Vec<AnomalyRecord>,
    too_long: Vec<AnomalyRecord>,
}

impl<'a> SlotAccumulator<'a> {
    fn new(capacity: usize) -> Self {
        Self {
            total_minutes: 0,
            count: 0,
            max_minutes: 0,
            min_minutes: f64::INFINITY,
            earliest_arrival: LATEST_CLOCK,
            latest_arrival: EARLIEST_CLOCK,
            earliest_departure: LATEST_CLOCK,
            latest_departure: EARLIEST_CLOCK,
            arrival_minutes: Vec::with_capacity(capacity),
            difficult: Vec::new(),
            too_long: Vec::new(),
        }
    }

    fn add_trip(&mut self, meeting_time: &str, trip: &'a TripSummary, threshold: f64) -> Result<()> {
        self.total_minutes = self
            .total_minutes
            .checked_add(trip.spent_time_in_minutes)
            .ok_or_else(|| PlannerError::TravelTimeOverflow {
                meeting_time: meeting_time.to_string(),
            })?;
        self.count += 1;

        match classify(trip, threshold) {
            TripClass::Difficult => self.difficult.push(anomaly(meeting_time, trip)),
            TripClass::TooLong => self.too_long.push(anomaly(meeting_time, trip)),
            TripClass::Normal => {}
        }

        self.max_minutes = self.max_minutes.max(trip.spent_time_in_minutes);
        self.min_minutes = self.min_minutes.min(trip.spent_time_in_minutes as f64);

        let arrival = trip.arrival_time.as_str();
        if arrival < self.earliest_arrival {
            self.earliest_arrival = arrival;
        }
        if arrival > self.latest_arrival {
            self.latest_arrival = arrival;
        }

        let departure = trip.departure_time.as_str();
        if departure < self.earliest_departure {
            self.earliest_departure = departure;
        }
        if departure > self.latest_departure {
            self.latest_departure = departure;
        }

        self.arrival_minutes.push(time_to_minutes(arrival)?);
        Ok(())
    }

    fn finish(self, meeting_time: &str) -> Result<MeetingStatistics> {
        if self.count == 0 {
            return Err(PlannerError::EmptySlot {
                meeting_time: meeting_time.to_string(),
            });
        }
        let average_minutes = self.total_minutes as f64 / self.count as f64;

        Ok(MeetingStatistics {
            meeting_time: meeting_time.to_string(),
            max_travel_time: self.max_minutes as f64 / 60.0,
            min_travel_time: self.min_minutes / 60.0,
            average_travel_time: average_minutes / 60.0,
            earliest_arrival: self.earliest_arrival.to_string(),
            latest_arrival: self.latest_arrival.to_string(),
            earliest_departure: self.earliest_departure.to_string(),
            latest_departure: self.latest_departure.to_string(),
            median_arrival_time: minutes_to_time(median(&self.arrival_minutes)),
            difficult_travels: self.difficult,
            too_long_travel: self.too_long,
        })
    }
}

fn anomaly(meeting_time: &str, trip: &TripSummary) -> AnomalyRecord {
    AnomalyRecord {
        meeting_time: meeting_time.to_string(),
        trip: trip.clone(),
    }
}

// ── StatisticsAggregator ──────────────────────────────────────────────────────

/// Reduces each slot's trip summaries to a [`MeetingStatistics`] record.
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    config: AggregationConfig,
}

impl StatisticsAggregator {
    /// Create an aggregator, validating `config`.
    pub fn new(config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Statistics for a single slot, with only that slot's anomalies.
    ///
    /// Fails with [`PlannerError::EmptySlot`] when the slot has no trips.
    pub fn aggregate_slot(&self, slot: &MeetingSlotSummary) -> Result<MeetingStatistics> {
        let mut acc = SlotAccumulator::new(slot.trips.len());
        for trip in &slot.trips {
            acc.add_trip(
                &slot.meeting_time,
                trip,
                self.config.too_long_threshold_hours,
            )?;
        }
        let stats = acc.finish(&slot.meeting_time)?;

        debug!(
            "Slot {}: {} travelers, {} difficult, {} too long",
            slot.meeting_time,
            slot.trips.len(),
            stats.difficult_travels.len(),
            stats.too_long_travel.len()
        );
        Ok(stats)
    }

    /// One record per slot, in input order.
    ///
    /// With [`AnomalyScope::Cumulative`] every record's anomaly lists are
    /// replaced by the concatenation of all slots' lists.
    pub fn aggregate(&self, slots: &[MeetingSlotSummary]) -> Result<Vec<MeetingStatistics>> {
        let mut stats = slots
            .iter()
            .map(|slot| self.aggregate_slot(slot))
            .collect::<Result<Vec<_>>>()?;

        if self.config.anomaly_scope == AnomalyScope::Cumulative {
            share_anomalies(&mut stats);
        }
        Ok(stats)
    }
}

/// Give every record the pass-wide anomaly lists.
pub fn share_anomalies(stats: &mut [MeetingStatistics]) {
    let difficult: Vec<AnomalyRecord> = stats
        .iter()
        .flat_map(|s| s.difficult_travels.iter().cloned())
        .collect();
    let too_long: Vec<AnomalyRecord> = stats
        .iter()
        .flat_map(|s| s.too_long_travel.iter().cloned())
        .collect();

    for record in stats.iter_mut() {
        record.difficult_travels = difficult.clone();
        record.too_long_travel = too_long.clone();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
