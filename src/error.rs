//! Error types for the path-utilization visualizer.

use thiserror::Error;

/// Result type for core visualizer operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Errors that can occur while building or querying the visualization data.
#[derive(Error, Debug)]
pub enum VizError {
    /// A utilization sample outside [0.0, 1.0]. Fatal: the log is corrupt
    /// and any scene rendered from it would be meaningless.
    #[error("utilization {utilization} out of range [0,1] for link {src}->{dst}")]
    UtilizationOutOfRange { src: u32, dst: u32, utilization: f64 },

    /// No utilization bucket exists for the exact window requested. A miss
    /// means the path and the utilization log do not cover the same time
    /// range, which the renderer must not paper over with a default.
    #[error("no utilization bucket for link {src}->{dst} window [{start_ms},{end_ms})")]
    BucketNotFound {
        src: u32,
        dst: u32,
        start_ms: u64,
        end_ms: u64,
    },

    /// A ground-station id with no entry in the city detail file.
    #[error("no city details for ground station {gs_id}")]
    UnknownGroundStation { gs_id: u32 },
}
