//! Time-bucketed link utilization index.
//!
//! Raw samples cover arbitrary spans; rendering always asks for one exact
//! `UTIL_INTERVAL`-wide window, so ingestion expands every sample into
//! fixed-width buckets up front and lookups are a single map probe.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, VizError};

/// Width of one utilization bucket in milliseconds.
pub const UTIL_INTERVAL: u64 = 100;

/// One raw per-link utilization sample, already converted to milliseconds.
///
/// Directional: `(src, dst)` and `(dst, src)` are distinct links that may
/// carry different values.
#[derive(Debug, Clone, Copy)]
pub struct UtilizationSample {
    pub src: u32,
    pub dst: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub utilization: f64,
}

/// Point-lookup index over fixed-width utilization buckets.
#[derive(Debug, Default)]
pub struct UtilizationIndex {
    buckets: HashMap<(u32, u32, u64, u64), f64>,
}

impl UtilizationIndex {
    /// Expands samples into `UTIL_INTERVAL`-wide buckets keyed by
    /// `(src, dst, bucket_start_ms, bucket_end_ms)`.
    ///
    /// The expansion advances strictly by `UTIL_INTERVAL` and stops once the
    /// remaining span is shorter than one interval, so a trailing partial
    /// window is dropped rather than rounded. Later samples for an identical
    /// key overwrite earlier ones; keys are not expected to collide.
    ///
    /// # Errors
    ///
    /// Returns [`VizError::UtilizationOutOfRange`] on the first sample whose
    /// utilization lies outside [0.0, 1.0], aborting ingestion.
    pub fn build(samples: &[UtilizationSample]) -> Result<Self> {
        let mut buckets = HashMap::new();

        for s in samples {
            if !(0.0..=1.0).contains(&s.utilization) {
                return Err(VizError::UtilizationOutOfRange {
                    src: s.src,
                    dst: s.dst,
                    utilization: s.utilization,
                });
            }

            // Stop once a full interval no longer fits: bucket boundaries
            // never exceed end_ms.
            let span = s.end_ms.saturating_sub(s.start_ms);
            let mut interval = 0;
            while interval + UTIL_INTERVAL <= span {
                let start = s.start_ms + interval;
                buckets.insert((s.src, s.dst, start, start + UTIL_INTERVAL), s.utilization);
                interval += UTIL_INTERVAL;
            }
        }

        debug!(
            samples = samples.len(),
            buckets = buckets.len(),
            "Utilization index built"
        );

        Ok(Self { buckets })
    }

    /// Number of buckets held by the index.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Exact-window bucket lookup. The window must be aligned to the bucket
    /// boundaries produced by [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Returns [`VizError::BucketNotFound`] if no bucket matches the window;
    /// a miss is never defaulted.
    pub fn lookup(&self, src: u32, dst: u32, start_ms: u64, end_ms: u64) -> Result<f64> {
        self.buckets
            .get(&(src, dst, start_ms, end_ms))
            .copied()
            .ok_or(VizError::BucketNotFound {
                src,
                dst,
                start_ms,
                end_ms,
            })
    }

    /// Utilization of the hop `a`-`b` over the window, taking the maximum of
    /// the two travel directions.
    pub fn hop_utilization(&self, a: u32, b: u32, start_ms: u64, end_ms: u64) -> Result<f64> {
        let forward = self.lookup(a, b, start_ms, end_ms)?;
        let reverse = self.lookup(b, a, start_ms, end_ms)?;
        Ok(forward.max(reverse))
    }
}
