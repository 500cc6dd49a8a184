//! Offline replay of recorded host traffic
//!
//! A replay file is JSON lines. Each line is one of:
//! - `{"snapshot": {"software_version": "...", "status": {...}}}` for a full reinit
//! - `{"power_devices": {"devices": [...]}}` for the power topology
//! - a JSON-RPC notification as pushed by the host
//!
//! Blank lines are skipped. Lines that fail to decode are logged and
//! counted; a snapshot that fails to initialize the model aborts the run.

use anyhow::Context;
use printerscreen_communication::{HostNotification, NotificationRouter, RouteOutcome};
use printerscreen_core::{PowerTopology, PrinterModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A full status snapshot as recorded from the initial object query
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRecord {
    /// Firmware software version
    pub software_version: String,
    /// Query result, including `configfile.config`
    pub status: Value,
}

/// One decoded line of a replay file
#[derive(Debug, Clone)]
pub enum ReplayRecord {
    Snapshot(SnapshotRecord),
    PowerDevices(PowerTopology),
    Notification(HostNotification),
}

impl ReplayRecord {
    /// Decode one replay line
    pub fn from_value(value: &Value) -> anyhow::Result<Self> {
        if let Some(snapshot) = value.get("snapshot") {
            let record = serde_json::from_value(snapshot.clone()).context("invalid snapshot")?;
            return Ok(ReplayRecord::Snapshot(record));
        }
        if let Some(devices) = value.get("power_devices") {
            let topology = PowerTopology::from_value(devices).context("invalid power devices")?;
            return Ok(ReplayRecord::PowerDevices(topology));
        }
        Ok(ReplayRecord::Notification(HostNotification::from_jsonrpc(
            value,
        )?))
    }
}

/// Counters for a finished replay
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Non-blank lines read
    pub records: usize,
    /// Snapshots applied
    pub snapshots: usize,
    /// Notifications the model consumed
    pub applied: usize,
    /// Notifications deliberately dropped or without a route
    pub ignored: usize,
    /// Lines that failed to decode
    pub rejected: usize,
    /// Popup messages raised by firmware errors
    pub popups: Vec<String>,
}

/// Feed recorded traffic from `reader` through the model
pub fn run<R: BufRead>(model: &mut PrinterModel, reader: R) -> anyhow::Result<ReplaySummary> {
    let router = NotificationRouter::new();
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_number))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.records += 1;

        let record = serde_json::from_str::<Value>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|value| ReplayRecord::from_value(&value));
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping line {}: {:#}", line_number, e);
                summary.rejected += 1;
                continue;
            }
        };

        match record {
            ReplayRecord::Snapshot(snapshot) => {
                model
                    .reinit(&snapshot.software_version, &snapshot.status)
                    .with_context(|| format!("snapshot on line {} failed", line_number))?;
                summary.snapshots += 1;
            }
            ReplayRecord::PowerDevices(topology) => {
                model.configure_power_devices(&topology);
                summary.applied += 1;
            }
            ReplayRecord::Notification(notification) => {
                match router.route(model, notification) {
                    RouteOutcome::Applied => summary.applied += 1,
                    RouteOutcome::Popup(message) => {
                        tracing::info!("Popup: {}", message);
                        summary.popups.push(message);
                    }
                    // File-layer outcomes have no consumer offline.
                    RouteOutcome::Ignored
                    | RouteOutcome::Unhandled { .. }
                    | RouteOutcome::FilelistChanged(_)
                    | RouteOutcome::MetadataUpdate { .. } => summary.ignored += 1,
                }
            }
        }
    }

    Ok(summary)
}

/// Replay a JSON-lines file
pub fn run_file(model: &mut PrinterModel, path: &Path) -> anyhow::Result<ReplaySummary> {
    let file = File::open(path)
        .with_context(|| format!("failed to open replay file {}", path.display()))?;
    run(model, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use printerscreen_core::PrinterState;
    use std::io::Cursor;

    #[test]
    fn test_decode_records() {
        let snapshot = ReplayRecord::from_value(&serde_json::json!({
            "snapshot": {"software_version": "v1", "status": {}}
        }))
        .unwrap();
        assert!(matches!(snapshot, ReplayRecord::Snapshot(_)));

        let notification =
            ReplayRecord::from_value(&serde_json::json!({"method": "notify_klippy_ready"}))
                .unwrap();
        assert!(matches!(
            notification,
            ReplayRecord::Notification(HostNotification::KlippyReady)
        ));

        assert!(ReplayRecord::from_value(&serde_json::json!({"power_devices": {}})).is_err());
    }

    #[test]
    fn test_bad_lines_are_counted() {
        let mut model = PrinterModel::new();
        let input = "not json\n\n{\"method\": \"notify_klippy_ready\"}\n";

        let summary = run(&mut model, Cursor::new(input)).unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.applied, 1);
        assert_eq!(model.get_state(), PrinterState::Ready);
    }

    #[test]
    fn test_failed_snapshot_aborts() {
        let mut model = PrinterModel::new();
        let input = r#"{"snapshot": {"software_version": "v1", "status": {"webhooks": {}}}}"#;
        assert!(run(&mut model, Cursor::new(input)).is_err());
    }
}
