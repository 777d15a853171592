use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the meetpoint crates.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A timestamp did not have the `<date>T<time>Z` shape.
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    /// A time-of-day string was not `HH:MM:SS`.
    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),

    /// A duration string lacked its `s` suffix or was not a number.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Static durations were requested but the leg did not carry one.
    #[error("Leg for {city} has no static duration")]
    MissingStaticDuration { city: String },

    /// A meeting slot had no traveler records, so no average exists.
    #[error("Meeting slot {meeting_time} has no travelers")]
    EmptySlot { meeting_time: String },

    /// A slot's summed travel time does not fit in whole minutes.
    #[error("Total travel time for meeting slot {meeting_time} overflows")]
    TravelTimeOverflow { meeting_time: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A routes file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A routing-client envelope did not hold the data set its status selects.
    #[error("Routing envelope with status {status} carries no routes")]
    EmptyEnvelope { status: i64 },

    /// No `.json` route files were found under the given directory.
    #[error("No route files found in {0}")]
    NoRouteFiles(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlannerError {
    /// Whether this error comes from malformed routing data rather than from
    /// configuration or I/O.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlannerError::InvalidTimestamp(_)
                | PlannerError::InvalidClockTime(_)
                | PlannerError::InvalidDuration(_)
                | PlannerError::MissingStaticDuration { .. }
        )
    }
}

/// Convenience alias used throughout the meetpoint crates.
pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_timestamp() {
        let err = PlannerError::InvalidTimestamp("2024-10-13 06:20".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp format: 2024-10-13 06:20");
    }

    #[test]
    fn test_error_display_invalid_duration() {
        let err = PlannerError::InvalidDuration("12640".to_string());
        assert_eq!(err.to_string(), "Invalid duration: 12640");
    }

    #[test]
    fn test_error_display_missing_static_duration() {
        let err = PlannerError::MissingStaticDuration {
            city: "Oxford".to_string(),
        };
        assert_eq!(err.to_string(), "Leg for Oxford has no static duration");
    }

    #[test]
    fn test_error_display_empty_slot() {
        let err = PlannerError::EmptySlot {
            meeting_time: "2024-10-13T10:00:00Z".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Meeting slot 2024-10-13T10:00:00Z has no travelers"
        );
    }

    #[test]
    fn test_error_display_travel_time_overflow() {
        let err = PlannerError::TravelTimeOverflow {
            meeting_time: "2024-10-13T10:00:00Z".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Total travel time for meeting slot 2024-10-13T10:00:00Z overflows"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PlannerError::FileRead {
            path: PathBuf::from("/some/routes.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/routes.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_no_route_files() {
        let err = PlannerError::NoRouteFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No route files found in /empty/dir");
    }

    #[test]
    fn test_error_display_empty_envelope() {
        let err = PlannerError::EmptyEnvelope { status: 429 };
        assert_eq!(err.to_string(), "Routing envelope with status 429 carries no routes");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: PlannerError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_is_format_error() {
        assert!(PlannerError::InvalidTimestamp("x".into()).is_format_error());
        assert!(PlannerError::InvalidClockTime("x".into()).is_format_error());
        assert!(PlannerError::InvalidDuration("x".into()).is_format_error());
        assert!(!PlannerError::EmptySlot {
            meeting_time: "x".into()
        }
        .is_format_error());
        assert!(!PlannerError::Config("x".into()).is_format_error());
    }
}
