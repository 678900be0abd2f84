use thiserror::Error;

use crate::bundle::{BundleError, ParseTraceSourceError, TraceSource};
use crate::ids::UnitId;

/// Errors surfaced by [`super::ResultController`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The result bundle failed; its error is passed through unchanged.
    #[error(transparent)]
    Bundle(#[from] BundleError),
    /// The trace source exists but no backend serves it.
    #[error("Trace source '{0}' is not supported")]
    UnsupportedTraceSource(TraceSource),
    /// The trace source name is not one of the known sources.
    #[error(transparent)]
    UnknownTraceSource(#[from] ParseTraceSourceError),
    /// A unit id is not part of the sorting.
    #[error("Unknown unit {0}")]
    UnknownUnit(UnitId),
    /// A spike index is past the end of the spike vector.
    #[error("Spike index {index} out of range ({num_spikes} spikes)")]
    SpikeOutOfRange {
        /// Offending index.
        index: usize,
        /// Spikes available.
        num_spikes: usize,
    },
}
