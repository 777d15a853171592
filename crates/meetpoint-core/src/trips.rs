//! Turns raw routing legs into per-traveler [`TripSummary`] records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::{DateSpan, MeetingSlotRoutes, MeetingSlotSummary, RawLegDetail, TripSummary};
use crate::time_utils::{parse_date, parse_duration_seconds, parse_instant, split_timestamp};

// ── Configuration ─────────────────────────────────────────────────────────────

/// The instant against which each traveler's waiting time is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceInstant {
    /// One nominal meeting instant shared by every slot.
    Fixed(DateTime<Utc>),
    /// Each slot is measured against its own `arrivalTime`.
    SlotArrival,
}

impl ReferenceInstant {
    /// Resolve the reference instant for one slot.
    pub fn resolve(&self, slot: &MeetingSlotRoutes) -> Result<DateTime<Utc>> {
        match self {
            ReferenceInstant::Fixed(instant) => Ok(*instant),
            ReferenceInstant::SlotArrival => parse_instant(&slot.arrival_time),
        }
    }
}

/// Which of the routing client's duration fields is costed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationSource {
    /// Traffic-aware `duration`.
    #[default]
    Live,
    /// Schedule-only `staticDuration`.
    Static,
}

// ── TripSummaryBuilder ────────────────────────────────────────────────────────

/// Stateless transform from [`MeetingSlotRoutes`] to [`MeetingSlotSummary`].
#[derive(Debug, Clone)]
pub struct TripSummaryBuilder {
    reference: ReferenceInstant,
    duration_source: DurationSource,
}

impl TripSummaryBuilder {
    /// Create a builder costing live durations against `reference`.
    pub fn new(reference: ReferenceInstant) -> Self {
        Self {
            reference,
            duration_source: DurationSource::Live,
        }
    }

    /// Choose which duration field to cost.
    pub fn with_duration_source(mut self, duration_source: DurationSource) -> Self {
        self.duration_source = duration_source;
        self
    }

    /// Summarise every slot, preserving slot and traveler order.
    ///
    /// Stops at the first malformed record.
    pub fn build(&self, slots: &[MeetingSlotRoutes]) -> Result<Vec<MeetingSlotSummary>> {
        slots.iter().map(|slot| self.build_slot(slot)).collect()
    }

    /// Summarise one slot.
    pub fn build_slot(&self, slot: &MeetingSlotRoutes) -> Result<MeetingSlotSummary> {
        let reference = self.reference.resolve(slot)?;
        let trips = slot
            .details
            .iter()
            .map(|leg| self.build_trip(reference, leg))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built {} trip summaries for slot {}",
            trips.len(),
            slot.arrival_time
        );

        Ok(MeetingSlotSummary {
            meeting_time: slot.arrival_time.clone(),
            trips,
        })
    }

    /// Summarise one traveler's leg.
    ///
    /// * `spent_time_in_minutes` = ⌊(trip seconds + wait seconds) / 60⌋, where
    ///   wait seconds = ⌊reference − last arrival⌋ and may be negative.
    /// * `spent_time_in_hour` = minutes / 60 rounded to three decimals.
    /// * `date_span` compares calendar dates only.
    pub fn build_trip(&self, reference: DateTime<Utc>, leg: &RawLegDetail) -> Result<TripSummary> {
        let trip_secs = parse_duration_seconds(self.duration_of(leg)?)?;

        let last_arrival = parse_instant(&leg.last_arrival_time)?;
        let wait_secs = (reference - last_arrival)
            .num_milliseconds()
            .div_euclid(1000);

        let minutes = ((trip_secs + wait_secs as f64) / 60.0).floor();
        if !(i64::MIN as f64..i64::MAX as f64).contains(&minutes) {
            return Err(PlannerError::InvalidDuration(format!(
                "{} for {} is out of range",
                self.duration_of(leg)?,
                leg.city
            )));
        }
        let spent_time_in_minutes = minutes as i64;
        let spent_time_in_hour = round_to(spent_time_in_minutes as f64 / 60.0, 3);

        let (departure_date, departure_time) = split_timestamp(&leg.first_departure_time)?;
        let (arrival_date, arrival_time) = split_timestamp(&leg.last_arrival_time)?;
        let days = (parse_date(arrival_date)? - parse_date(departure_date)?).num_days();

        Ok(TripSummary {
            city: leg.city.clone(),
            spent_time_in_minutes,
            spent_time_in_hour,
            departure_time: departure_time.to_string(),
            arrival_time: arrival_time.to_string(),
            departure_date: departure_date.to_string(),
            arrival_date: arrival_date.to_string(),
            date_span: DateSpan::from_day_difference(days),
        })
    }

    fn duration_of<'a>(&self, leg: &'a RawLegDetail) -> Result<&'a str> {
        match self.duration_source {
            DurationSource::Live => Ok(&leg.duration),
            DurationSource::Static => {
                leg.static_duration
                    .as_deref()
                    .ok_or_else(|| PlannerError::MissingStaticDuration {
                        city: leg.city.clone(),
                    })
            }
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

// ── Tests ─────────────────────────────────────────────────────────────────────
