// ── Median ────────────────────────────────────────────────────────────────────

/// Median of an unsorted sample.
///
/// The input is copied and sorted; the caller's slice is left untouched.
/// Odd lengths give the middle value, even lengths the mean of the two
/// central values.
///
/// An empty sample returns `0.0`. That is a no-data fallback, not a
/// measurement: callers that can see empty input must check for it
/// themselves, since a genuine median of `0.0` looks the same.
///
/// # Examples
///
/// ```
/// use meetpoint_core::median::median;
///
/// assert_eq!(median(&[30.0, 10.0, 20.0]), 20.0);
/// assert_eq!(median(&[10.0, 20.0, 30.0, 40.0]), 25.0);
/// assert_eq!(median(&[]), 0.0);
/// ```
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 != 0 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
