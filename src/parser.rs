//! Ingestion parsers for the two simulation artifacts.
//!
//! Both logs are headerless comma-separated files consumed wholesale at
//! startup. Nanosecond fields are reduced to millisecond granularity here,
//! at the boundary, so the core only ever sees milliseconds. A malformed
//! line aborts the run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::timeline::{ns_to_ms, NodeId, PathEvent};
use crate::util_index::UtilizationSample;

/// Raw utilization row as it appears on disk, with nanosecond timestamps.
#[derive(Debug, Deserialize)]
struct RawUtilizationRow {
    src: u32,
    dst: u32,
    start_ns: u64,
    end_ns: u64,
    utilization: f64,
}

/// Reads the utilization log: one `src,dst,start_ns,end_ns,utilization` row
/// per line.
pub fn read_utilization_log(path: &Path) -> Result<Vec<UtilizationSample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening utilization log {}", path.display()))?;

    let mut samples = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let raw: RawUtilizationRow = record
            .with_context(|| format!("malformed utilization row {} in {}", i + 1, path.display()))?;
        samples.push(UtilizationSample {
            src: raw.src,
            dst: raw.dst,
            start_ms: ns_to_ms(raw.start_ns),
            end_ms: ns_to_ms(raw.end_ns),
            utilization: raw.utilization,
        });
    }

    debug!(samples = samples.len(), path = %path.display(), "Utilization log read");
    Ok(samples)
}

/// Reads the path-change log: one `timestamp_ns,<id>-<id>-...-<id>` row per
/// line, in ascending time order.
pub fn read_path_events(path: &Path) -> Result<Vec<PathEvent>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening path event log {}", path.display()))?;

    let mut events = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("malformed path event row {} in {}", i + 1, path.display()))?;
        let row = i + 1;

        let change_time_ns: u64 = record
            .get(0)
            .with_context(|| format!("path event row {row}: missing timestamp"))?
            .trim()
            .parse()
            .with_context(|| format!("path event row {row}: bad timestamp"))?;

        let nodes = record
            .get(1)
            .with_context(|| format!("path event row {row}: missing node list"))?;
        let path: Vec<NodeId> = nodes
            .split('-')
            .map(|n| {
                n.trim()
                    .parse()
                    .with_context(|| format!("path event row {row}: bad node id {n:?}"))
            })
            .collect::<Result<_>>()?;

        events.push(PathEvent {
            change_time_ns,
            path,
        });
    }

    debug!(events = events.len(), path = %path.display(), "Path events read");
    Ok(events)
}
