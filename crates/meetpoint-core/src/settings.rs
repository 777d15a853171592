use clap::{CommandFactory, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PlannerError, Result};
use crate::statistics::{AggregationConfig, AnomalyScope, DEFAULT_TOO_LONG_THRESHOLD_HOURS};
use crate::time_utils::parse_instant;
use crate::trips::{DurationSource, ReferenceInstant};

// ── Option enums ───────────────────────────────────────────────────────────────

/// What to do when one meeting slot cannot be summarised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole run on the first bad slot.
    #[default]
    Abort,
    /// Log the bad slot and report statistics for the others.
    Skip,
}

/// How the statistics are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Travel-time statistics for candidate meeting slots
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meetpoint",
    about = "Travel-time statistics for candidate meeting slots",
    version
)]
pub struct Settings {
    /// Routing results: a JSON file or a directory of JSON files
    #[arg(required_unless_present = "clear")]
    pub input: Option<PathBuf>,

    /// Nominal meeting instant (RFC 3339). Defaults to each slot's own time
    #[arg(long)]
    pub meeting_time: Option<String>,

    /// Same-day trips longer than this many hours are flagged
    #[arg(long, default_value_t = DEFAULT_TOO_LONG_THRESHOLD_HOURS)]
    pub too_long_hours: f64,

    /// Which routing duration field to cost
    #[arg(long, value_enum, default_value_t = DurationSource::Live)]
    pub duration_source: DurationSource,

    /// Whether anomaly lists are per slot or shared across the run
    #[arg(long, value_enum, default_value_t = AnomalyScope::PerSlot)]
    pub anomaly_scope: AnomalyScope,

    /// Behaviour when a slot has malformed or empty data
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_error: FailurePolicy,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── AnalysisConfig ─────────────────────────────────────────────────────────────

/// Everything the analysis pipeline needs, resolved from [`Settings`].
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub reference: ReferenceInstant,
    pub duration_source: DurationSource,
    pub aggregation: AggregationConfig,
    pub failure_policy: FailurePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceInstant::SlotArrival,
            duration_source: DurationSource::Live,
            aggregation: AggregationConfig::default(),
            failure_policy: FailurePolicy::Abort,
        }
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.meetpoint/last_used.json`.
///
/// The input path, meeting time and logging flags are per-run and never
/// persisted.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub too_long_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_source: Option<DurationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_scope: Option<AnomalyScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_error: Option<FailurePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".meetpoint").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "too_long_hours") {
            if let Some(v) = last.too_long_hours.filter(|v| v.is_finite() && *v >= 0.0) {
                settings.too_long_hours = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "duration_source") {
            if let Some(v) = last.duration_source {
                settings.duration_source = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "anomaly_scope") {
            if let Some(v) = last.anomaly_scope {
                settings.anomaly_scope = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "on_error") {
            if let Some(v) = last.on_error {
                settings.on_error = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::apply_debug(settings);

        // Options that fail validation are never persisted.
        match settings.analysis_config() {
            Ok(_) => {
                let _ = LastUsedParams::from(&settings).save_to(config_path);
            }
            Err(err) => tracing::debug!("Not saving last-used params: {}", err),
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Resolve the analysis options, validating the meeting time and
    /// threshold.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let reference = match &self.meeting_time {
            Some(raw) => ReferenceInstant::Fixed(parse_instant(raw).map_err(|_| {
                PlannerError::Config(format!("--meeting-time is not an RFC 3339 timestamp: {raw}"))
            })?),
            None => ReferenceInstant::SlotArrival,
        };

        let aggregation = AggregationConfig {
            too_long_threshold_hours: self.too_long_hours,
            anomaly_scope: self.anomaly_scope,
        };
        aggregation.validate()?;

        Ok(AnalysisConfig {
            reference,
            duration_source: self.duration_source,
            aggregation,
            failure_policy: self.on_error,
        })
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            too_long_hours: Some(s.too_long_hours),
            duration_source: Some(s.duration_source),
            anomaly_scope: Some(s.anomaly_scope),
            on_error: Some(s.on_error),
            format: Some(s.format),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(extra: &[&str]) -> Vec<std::ffi::OsString> {
        std::iter::once("meetpoint")
            .chain(std::iter::once("routes.json"))
            .chain(extra.iter().copied())
            .map(Into::into)
            .collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            too_long_hours: Some(8.0),
            duration_source: Some(DurationSource::Static),
            anomaly_scope: Some(AnomalyScope::Cumulative),
            on_error: Some(FailurePolicy::Skip),
            format: Some(OutputFormat::Text),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.too_long_hours, Some(8.0));
        assert_eq!(loaded.duration_source, Some(DurationSource::Static));
        assert_eq!(loaded.anomaly_scope, Some(AnomalyScope::Cumulative));
        assert_eq!(loaded.on_error, Some(FailurePolicy::Skip));
        assert_eq!(loaded.format, Some(OutputFormat::Text));
    }

    #[test]
    fn test_last_used_params_file_shape() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            anomaly_scope: Some(AnomalyScope::PerSlot),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["anomaly_scope"], "per-slot");
        assert!(raw.get("format").is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).too_long_hours.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).format.is_none());
    }

    // ── Settings parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["meetpoint", "routes.json"]);

        assert_eq!(settings.input, Some(PathBuf::from("routes.json")));
        assert!(settings.meeting_time.is_none());
        assert_eq!(settings.too_long_hours, 10.0);
        assert_eq!(settings.duration_source, DurationSource::Live);
        assert_eq!(settings.anomaly_scope, AnomalyScope::PerSlot);
        assert_eq!(settings.on_error, FailurePolicy::Abort);
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(!settings.pretty);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_value_enums() {
        let settings = Settings::parse_from(args(&[
            "--duration-source",
            "static",
            "--anomaly-scope",
            "cumulative",
            "--on-error",
            "skip",
            "--format",
            "text",
        ]));
        assert_eq!(settings.duration_source, DurationSource::Static);
        assert_eq!(settings.anomaly_scope, AnomalyScope::Cumulative);
        assert_eq!(settings.on_error, FailurePolicy::Skip);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_settings_rejects_unknown_scope() {
        let result = Settings::try_parse_from(args(&["--anomaly-scope", "global"]));
        assert!(result.is_err());
    }

    // ── analysis_config ───────────────────────────────────────────────────────

    #[test]
    fn test_analysis_config_fixed_meeting_time() {
        let settings = Settings::parse_from(args(&["--meeting-time", "2024-10-13T10:00:00Z"]));
        let config = settings.analysis_config().unwrap();
        assert_eq!(
            config.reference,
            ReferenceInstant::Fixed(Utc.with_ymd_and_hms(2024, 10, 13, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_analysis_config_defaults_to_slot_arrival() {
        let config = Settings::parse_from(args(&[])).analysis_config().unwrap();
        assert_eq!(config.reference, ReferenceInstant::SlotArrival);
        assert_eq!(config.aggregation, AggregationConfig::default());
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_analysis_config_bad_meeting_time() {
        let settings = Settings::parse_from(args(&["--meeting-time", "10am"]));
        assert!(matches!(
            settings.analysis_config(),
            Err(PlannerError::Config(_))
        ));
    }

    #[test]
    fn test_analysis_config_bad_threshold() {
        let settings = Settings::parse_from(args(&["--too-long-hours=-2"]));
        assert!(matches!(
            settings.analysis_config(),
            Err(PlannerError::Config(_))
        ));
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            too_long_hours: Some(7.5),
            format: Some(OutputFormat::Text),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(settings.too_long_hours, 7.5);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            too_long_hours: Some(7.5),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(args(&["--too-long-hours", "12"]), &config_path);
        assert_eq!(settings.too_long_hours, 12.0);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default()
            .save_to(&config_path)
            .expect("save");

        Settings::load_with_last_used_impl(args(&["--clear"]), &config_path);
        assert!(!config_path.exists());
    }

    #[test]
    fn test_settings_clear_without_input() {
        let settings = Settings::parse_from(["meetpoint", "--clear"]);
        assert!(settings.clear);
        assert!(settings.input.is_none());
    }

    #[test]
    fn test_settings_input_required_otherwise() {
        assert!(Settings::try_parse_from(["meetpoint", "--pretty"]).is_err());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings =
            Settings::load_with_last_used_impl(args(&["--debug"]), &tmp_config_path(&tmp));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(args(&["--on-error", "skip"]), &config_path);

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.on_error, Some(FailurePolicy::Skip));
        assert_eq!(loaded.too_long_hours, Some(10.0));
    }

    #[test]
    fn test_load_with_last_used_does_not_persist_invalid_threshold() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(args(&["--too-long-hours", "8"]), &config_path);
        let bad = Settings::load_with_last_used_impl(args(&["--too-long-hours=-2"]), &config_path);
        assert!(matches!(bad.analysis_config(), Err(PlannerError::Config(_))));

        assert_eq!(
            LastUsedParams::load_from(&config_path).too_long_hours,
            Some(8.0)
        );
        let next = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(next.too_long_hours, 8.0);
        assert!(next.analysis_config().is_ok());
    }

    #[test]
    fn test_load_with_last_used_ignores_invalid_saved_threshold() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            too_long_hours: Some(-2.0),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(settings.too_long_hours, DEFAULT_TOO_LONG_THRESHOLD_HOURS);
        assert!(settings.analysis_config().is_ok());
    }
}
