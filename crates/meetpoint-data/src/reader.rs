//! Route file discovery and loading.
//!
//! Reads routing-client output from disk and converts it into
//! [`MeetingSlotRoutes`] for the trip builder. A document may hold a single
//! slot, an array of slots, or the routing client's status envelope.

use std::path::{Path, PathBuf};

use meetpoint_core::error::{PlannerError, Result};
use meetpoint_core::models::MeetingSlotRoutes;
use serde::Deserialize;
use tracing::{debug, warn};

/// Envelope status meaning the live (traffic-aware) request succeeded.
pub const LIVE_DATA_STATUS: i64 = 1;

// ── Document shapes ───────────────────────────────────────────────────────────

/// Routing-client response: a status plus live and static-fallback data sets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingEnvelope {
    pub status: i64,
    #[serde(default)]
    pub live_data: Option<Vec<MeetingSlotRoutes>>,
    #[serde(default, rename = "staticOutPut")]
    pub static_output: Option<Vec<MeetingSlotRoutes>>,
}

impl RoutingEnvelope {
    /// Pick the data set the status selects: live data on success, the
    /// static fallback otherwise or when live data is missing.
    pub fn into_routes(self) -> Result<Vec<MeetingSlotRoutes>> {
        let status = self.status;
        let chosen = if status == LIVE_DATA_STATUS {
            self.live_data.or(self.static_output)
        } else {
            self.static_output
        };
        chosen.ok_or(PlannerError::EmptyEnvelope { status })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse one JSON document into meeting slots.
///
/// The top-level shape picks the target type, so a bad field deep in a leg
/// is reported with its name and position.
pub fn parse_routes(content: &str) -> Result<Vec<MeetingSlotRoutes>> {
    let shape: serde_json::Value = serde_json::from_str(content)?;
    match shape {
        serde_json::Value::Array(_) => Ok(serde_json::from_str(content)?),
        serde_json::Value::Object(ref map) if map.contains_key("status") => {
            let envelope: RoutingEnvelope = serde_json::from_str(content)?;
            debug!("Routing envelope with status {}", envelope.status);
            envelope.into_routes()
        }
        _ => Ok(vec![serde_json::from_str(content)?]),
    }
}

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_route_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Route path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load the slots held in a single file.
pub fn load_route_file(path: &Path) -> Result<Vec<MeetingSlotRoutes>> {
    let content = std::fs::read_to_string(path).map_err(|source| PlannerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let slots = parse_routes(&content)?;
    debug!("Loaded {} slots from {}", slots.len(), path.display());
    Ok(slots)
}

/// Load slots from a file, or from every `.json` file under a directory in
/// path order.
pub fn load_routes(path: &Path) -> Result<Vec<MeetingSlotRoutes>> {
    if !path.is_dir() {
        return load_route_file(path);
    }

    let files = find_route_files(path);
    if files.is_empty() {
        return Err(PlannerError::NoRouteFiles(path.to_path_buf()));
    }

    let mut all_slots = Vec::new();
    for file in &files {
        all_slots.extend(load_route_file(file)?);
    }

    debug!(
        "Loaded {} slots from {} files",
        all_slots.len(),
        files.len()
    );
    Ok(all_slots)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
