use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{PlannerError, Result};

// ── Timestamp splitting ───────────────────────────────────────────────────────

/// Split a UTC timestamp of the form `<date>T<time>Z` into its date and
/// time-of-day parts.
///
/// The time part runs from the `T` to the first `Z`, or to the end of the
/// string when there is no `Z`. Anything without exactly one `T`, or with an
/// empty side, is a format error.
///
/// # Examples
///
/// ```
/// use meetpoint_core::time_utils::split_timestamp;
///
/// let (date, time) = split_timestamp("2024-10-13T06:20:00Z").unwrap();
/// assert_eq!(date, "2024-10-13");
/// assert_eq!(time, "06:20:00");
/// assert!(split_timestamp("2024-10-13 06:20:00").is_err());
/// ```
pub fn split_timestamp(timestamp: &str) -> Result<(&str, &str)> {
    let mut parts = timestamp.split('T');
    let (Some(date), Some(rest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PlannerError::InvalidTimestamp(timestamp.to_string()));
    };
    let time = rest.split('Z').next().unwrap_or_default();
    if date.is_empty() || time.is_empty() {
        return Err(PlannerError::InvalidTimestamp(timestamp.to_string()));
    }
    Ok((date, time))
}

/// Parse an RFC 3339 timestamp (`Z` suffix or fixed offset) into UTC.
pub fn parse_instant(timestamp: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PlannerError::InvalidTimestamp(timestamp.to_string()))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| PlannerError::InvalidTimestamp(date.to_string()))
}

// ── Clock conversion ──────────────────────────────────────────────────────────

/// Convert an `HH:MM:SS` time of day into fractional minutes since midnight.
///
/// An empty string counts as midnight. This is only meant for placing times
/// on a numeric axis; it knows nothing about dates.
///
/// # Examples
///
/// ```
/// use meetpoint_core::time_utils::time_to_minutes;
///
/// assert_eq!(time_to_minutes("09:48:00").unwrap(), 588.0);
/// assert_eq!(time_to_minutes("00:00:30").unwrap(), 0.5);
/// assert_eq!(time_to_minutes("").unwrap(), 0.0);
/// ```
pub fn time_to_minutes(time: &str) -> Result<f64> {
    if time.is_empty() {
        return Ok(0.0);
    }
    let invalid = || PlannerError::InvalidClockTime(time.to_string());

    let mut parts = time.split(':');
    let (Some(h), Some(m), Some(s), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;
    let seconds: f64 = s.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }

    Ok(f64::from(hours) * 60.0 + f64::from(minutes) + seconds / 60.0)
}

/// Render fractional minutes since midnight as a zero-padded `HH:MM:SS`,
/// rounded to the nearest second. Negative input clamps to midnight.
///
/// # Examples
///
/// ```
/// use meetpoint_core::time_utils::minutes_to_time;
///
/// assert_eq!(minutes_to_time(588.0), "09:48:00");
/// assert_eq!(minutes_to_time(584.5), "09:44:30");
/// assert_eq!(minutes_to_time(0.0), "00:00:00");
/// ```
pub fn minutes_to_time(minutes: f64) -> String {
    let total_secs = (minutes * 60.0).round().max(0.0) as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

// ── Durations ─────────────────────────────────────────────────────────────────

/// Parse a routing duration such as `"12640s"` into elapsed seconds.
///
/// The `s` suffix is required; fractional seconds are accepted.
pub fn parse_duration_seconds(duration: &str) -> Result<f64> {
    let invalid = || PlannerError::InvalidDuration(duration.to_string());
    let numeral = duration.trim().strip_suffix('s').ok_or_else(invalid)?;
    let secs: f64 = numeral.parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(invalid());
    }
    Ok(secs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Timelike as _};

    // ── split_timestamp ──────────────────────────────────────────────────────

    #[test]
    fn test_split_timestamp_standard() {
        let (date, time) = split_timestamp("2024-10-13T09:48:00Z").unwrap();
        assert_eq!(date, "2024-10-13");
        assert_eq!(time, "09:48:00");
    }

    #[test]
    fn test_split_timestamp_without_z_keeps_remainder() {
        let (date, time) = split_timestamp("2024-10-13T09:48:00").unwrap();
        assert_eq!(date, "2024-10-13");
        assert_eq!(time, "09:48:00");
    }

    #[test]
    fn test_split_timestamp_no_separator() {
        let err = split_timestamp("2024-10-13 09:48:00Z").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_split_timestamp_two_separators() {
        assert!(split_timestamp("2024-10-13T09:48T00Z").is_err());
    }

    #[test]
    fn test_split_timestamp_empty_sides() {
        assert!(split_timestamp("T09:48:00Z").is_err());
        assert!(split_timestamp("2024-10-13TZ").is_err());
        assert!(split_timestamp("").is_err());
    }

    // ── parse_instant / parse_date ───────────────────────────────────────────

    #[test]
    fn test_parse_instant_z_suffix() {
        let dt = parse_instant("2024-10-13T10:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 10, 13, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_instant_with_offset() {
        let dt = parse_instant("2024-10-13T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_instant_garbage() {
        assert!(matches!(
            parse_instant("tomorrow morning"),
            Err(PlannerError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_date_valid_and_invalid() {
        let date = parse_date("2024-10-13").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 13).unwrap());
        assert!(parse_date("13/10/2024").is_err());
    }

    // ── time_to_minutes ──────────────────────────────────────────────────────

    #[test]
    fn test_time_to_minutes_whole() {
        assert_eq!(time_to_minutes("00:00:00").unwrap(), 0.0);
        assert_eq!(time_to_minutes("10:00:00").unwrap(), 600.0);
        assert_eq!(time_to_minutes("23:59:00").unwrap(), 1439.0);
    }

    #[test]
    fn test_time_to_minutes_fractional_seconds() {
        let m = time_to_minutes("09:40:15").unwrap();
        assert!((m - 580.25).abs() < 1e-9);
    }

    #[test]
    fn test_time_to_minutes_empty_is_zero() {
        assert_eq!(time_to_minutes("").unwrap(), 0.0);
    }

    #[test]
    fn test_time_to_minutes_malformed() {
        assert!(time_to_minutes("09:40").is_err());
        assert!(time_to_minutes("09:40:00:00").is_err());
        assert!(time_to_minutes("ab:40:00").is_err());
    }

    // ── minutes_to_time ──────────────────────────────────────────────────────

    #[test]
    fn test_minutes_to_time_pads() {
        assert_eq!(minutes_to_time(65.0), "01:05:00");
        assert_eq!(minutes_to_time(0.25), "00:00:15");
    }

    #[test]
    fn test_minutes_to_time_rounds_up_into_next_minute() {
        // 59.9999 minutes is 3599.994 s, which rounds to a full hour.
        assert_eq!(minutes_to_time(59.9999), "01:00:00");
    }

    #[test]
    fn test_minutes_to_time_inverts_time_to_minutes() {
        for t in ["06:20:00", "09:39:00", "10:48:30", "23:59:59"] {
            assert_eq!(minutes_to_time(time_to_minutes(t).unwrap()), t);
        }
    }

    #[test]
    fn test_minutes_to_time_negative_clamps() {
        assert_eq!(minutes_to_time(-5.0), "00:00:00");
    }

    // ── parse_duration_seconds ───────────────────────────────────────────────

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("12640s").unwrap(), 12640.0);
        assert_eq!(parse_duration_seconds("0s").unwrap(), 0.0);
        assert_eq!(parse_duration_seconds("12.5s").unwrap(), 12.5);
    }

    #[test]
    fn test_parse_duration_seconds_requires_suffix() {
        assert!(matches!(
            parse_duration_seconds("12640"),
            Err(PlannerError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_parse_duration_seconds_rejects_garbage() {
        assert!(parse_duration_seconds("s").is_err());
        assert!(parse_duration_seconds("-5s").is_err());
        assert!(parse_duration_seconds("twelves").is_err());
        assert!(parse_duration_seconds("").is_err());
    }
}
