use serde::{Deserialize, Serialize};

/// One traveler's itinerary to the destination for one candidate meeting
/// slot, as returned by the routing client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLegDetail {
    /// Identifier of the traveler's origin.
    pub city: String,
    /// UTC timestamp of the first departure, e.g. `"2024-10-13T06:20:00Z"`.
    pub first_departure_time: String,
    /// UTC timestamp of the last arrival.
    pub last_arrival_time: String,
    /// Traffic-aware elapsed seconds with a unit suffix, e.g. `"12640s"`.
    pub duration: String,
    /// Schedule-only elapsed seconds, same encoding as `duration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_duration: Option<String>,
}

/// All travelers' routes for one candidate meeting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSlotRoutes {
    /// The candidate meeting timestamp.
    pub arrival_time: String,
    /// One leg per traveler, in request order.
    #[serde(default)]
    pub details: Vec<RawLegDetail>,
}

/// Whether a trip crosses a calendar date boundary.
///
/// Serialized as the sign of `arrival date - departure date`: `1`, `0` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum DateSpan {
    /// Arrival date precedes departure date. Only seen in corrupt data.
    Reversed,
    /// Departure and arrival share a calendar date.
    SameDay,
    /// The traveler must leave on an earlier date than they arrive.
    Overnight,
}

impl DateSpan {
    /// Build from the signed day difference between arrival and departure.
    pub fn from_day_difference(days: i64) -> Self {
        match days.signum() {
            1 => DateSpan::Overnight,
            0 => DateSpan::SameDay,
            _ => DateSpan::Reversed,
        }
    }

    pub fn signum(self) -> i8 {
        match self {
            DateSpan::Reversed => -1,
            DateSpan::SameDay => 0,
            DateSpan::Overnight => 1,
        }
    }

    pub fn is_overnight(self) -> bool {
        self == DateSpan::Overnight
    }
}

impl From<DateSpan> for i8 {
    fn from(span: DateSpan) -> Self {
        span.signum()
    }
}

impl TryFrom<i8> for DateSpan {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(DateSpan::Reversed),
            0 => Ok(DateSpan::SameDay),
            1 => Ok(DateSpan::Overnight),
            other => Err(format!("overnight indicator must be -1, 0 or 1, got {other}")),
        }
    }
}

/// Normalized cost of one traveler's journey for one candidate slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub city: String,
    /// Travel plus waiting time, floored to whole minutes. May be negative
    /// when the traveler arrives after the reference instant.
    pub spent_time_in_minutes: i64,
    /// `spent_time_in_minutes / 60`, rounded to three decimals.
    pub spent_time_in_hour: f64,
    /// Time of day of the first departure, `HH:MM:SS`.
    pub departure_time: String,
    /// Time of day of the last arrival, `HH:MM:SS`.
    pub arrival_time: String,
    pub departure_date: String,
    pub arrival_date: String,
    #[serde(rename = "overnightIndicator")]
    pub date_span: DateSpan,
}

/// The trip summaries of every traveler for one meeting slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSlotSummary {
    pub meeting_time: String,
    pub trips: Vec<TripSummary>,
}

/// A trip flagged by the aggregator, tagged with the slot it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub meeting_time: String,
    pub trip: TripSummary,
}

/// Aggregate statistics for one meeting slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStatistics {
    pub meeting_time: String,
    /// Longest trip, in hours.
    pub max_travel_time: f64,
    /// Shortest trip, in hours.
    pub min_travel_time: f64,
    /// Mean trip, in hours.
    pub average_travel_time: f64,
    pub earliest_arrival: String,
    pub latest_arrival: String,
    pub earliest_departure: String,
    pub latest_departure: String,
    /// Median of all arrival times. `"00:00:00"` only comes from real data;
    /// empty slots are rejected before the median is taken.
    pub median_arrival_time: String,
    /// Trips that require leaving on an earlier calendar date.
    pub difficult_travels: Vec<AnomalyRecord>,
    /// Same-day trips longer than the configured threshold.
    pub too_long_travel: Vec<AnomalyRecord>,
}
