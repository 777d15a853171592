/// Format a duration in minutes as a human-readable string.
///
/// * `< 60` minutes → `"45m"`
/// * `≥ 60` minutes, no remainder → `"3h"`
/// * `≥ 60` minutes, with remainder → `"3h 45m"`
///
/// Negative durations (travelers arriving after the reference instant) keep
/// their sign.
///
/// # Examples
///
/// ```
/// use meetpoint_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(45.0),  "45m");
/// assert_eq!(format_minutes(180.0), "3h");
/// assert_eq!(format_minutes(222.0), "3h 42m");
/// assert_eq!(format_minutes(-89.0), "-1h 29m");
/// ```
pub fn format_minutes(minutes: f64) -> String {
    let total_mins = minutes.round() as i64;
    let sign = if total_mins < 0 { "-" } else { "" };
    let abs_mins = total_mins.abs();
    if abs_mins < 60 {
        format!("{}{}m", sign, abs_mins)
    } else {
        let hours = abs_mins / 60;
        let mins = abs_mins % 60;
        if mins == 0 {
            format!("{}{}h", sign, hours)
        } else {
            format!("{}{}h {}m", sign, hours, mins)
        }
    }
}

/// Format a duration in fractional hours, e.g. `3.7` → `"3h 42m"`.
pub fn format_hours(hours: f64) -> String {
    format_minutes(hours * 60.0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
