//! Boundary traits for the spike-sorting result bundle.
//!
//! The controller never computes templates, spike trains or sparsity itself;
//! it reads them from a [`ResultBundle`], which pairs a [`Recording`] with a
//! [`Sorting`] and the template statistics extracted from both. Backends
//! implement these traits; [`memory::InMemoryBundle`] is the bundled one.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ChannelId, UnitId};

pub mod memory;
pub mod templates;

pub use memory::{InMemoryBundle, InMemoryBundleBuilder};

/// Errors raised by a result bundle backend.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A unit id is not part of the sorting.
    #[error("Unknown unit {unit_id}")]
    UnknownUnit {
        /// Requested unit.
        unit_id: UnitId,
    },
    /// A segment index is beyond the recorded segments.
    #[error("Segment {segment_index} out of range ({num_segments} segments)")]
    SegmentOutOfRange {
        /// Requested segment.
        segment_index: usize,
        /// Segments available.
        num_segments: usize,
    },
    /// A channel index is beyond the recording channels.
    #[error("Channel index {channel_index} out of range ({num_channels} channels)")]
    ChannelOutOfRange {
        /// Requested channel index.
        channel_index: usize,
        /// Channels available.
        num_channels: usize,
    },
    /// A unit index in a spike train is beyond the sorting units.
    #[error("Unit index {unit_index} out of range ({num_units} units)")]
    UnitIndexOutOfRange {
        /// Offending unit index.
        unit_index: usize,
        /// Units available.
        num_units: usize,
    },
    /// A requested frame range does not fit the segment.
    #[error("Frame range {start}..{end} invalid for segment of {num_samples} samples")]
    FrameRange {
        /// First frame requested.
        start: usize,
        /// End frame requested (exclusive).
        end: usize,
        /// Samples in the segment.
        num_samples: usize,
    },
    /// Two pieces of the bundle disagree on a dimension.
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Dimension being compared.
        what: &'static str,
        /// Expected size.
        expected: usize,
        /// Size found.
        found: usize,
    },
    /// A per-unit estimate has no entry for a unit.
    #[error("{estimate} has no entry for unit {unit_id}")]
    MissingUnit {
        /// Unit without an entry.
        unit_id: UnitId,
        /// Estimate that is incomplete.
        estimate: &'static str,
    },
    /// A sparsity estimate lists more channels than the budget allows.
    #[error("Sparsity for unit {unit_id} lists {found} channels, budget is {budget}")]
    SparsityBudgetExceeded {
        /// Unit whose estimate is too large.
        unit_id: UnitId,
        /// Channels listed.
        found: usize,
        /// Configured channel budget.
        budget: usize,
    },
    /// Error reported by an external backend.
    #[error(transparent)]
    External(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Which recording a trace read is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceSource {
    /// The preprocessed recording the waveforms were extracted from.
    #[default]
    Preprocessed,
    /// The recording before preprocessing. Not served by any backend yet.
    Raw,
}

impl TraceSource {
    /// Stable lowercase name used in settings and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            TraceSource::Preprocessed => "preprocessed",
            TraceSource::Raw => "raw",
        }
    }
}

impl fmt::Display for TraceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a trace source name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown trace source '{0}'")]
pub struct ParseTraceSourceError(pub String);

impl FromStr for TraceSource {
    type Err = ParseTraceSourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preprocessed" => Ok(TraceSource::Preprocessed),
            "raw" => Ok(TraceSource::Raw),
            _ => Err(ParseTraceSourceError(value.to_string())),
        }
    }
}

/// Template statistic computed over a unit's waveforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateMode {
    /// Mean waveform.
    Average,
    /// Sample-wise median waveform.
    Median,
    /// Sample-wise standard deviation.
    Std,
}

/// Polarity used to locate a unit's peak on each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakSign {
    /// Most negative deflection.
    #[default]
    Neg,
    /// Most positive deflection.
    Pos,
    /// Largest absolute deflection.
    Both,
}

/// Window of traces to read from one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceRequest {
    /// Segment to read from.
    pub segment_index: usize,
    /// First frame, defaults to the start of the segment.
    pub start_frame: Option<usize>,
    /// End frame (exclusive), defaults to the end of the segment.
    pub end_frame: Option<usize>,
    /// Channel indices to keep, defaults to all channels.
    pub channel_indices: Option<Vec<usize>>,
}

impl TraceRequest {
    /// Read a full segment on all channels.
    pub fn segment(segment_index: usize) -> Self {
        Self {
            segment_index,
            ..Self::default()
        }
    }

    /// Restrict the read to `start..end` frames.
    pub fn frames(mut self, start: usize, end: usize) -> Self {
        self.start_frame = Some(start);
        self.end_frame = Some(end);
        self
    }

    /// Restrict the read to the given channel indices.
    pub fn channels(mut self, channel_indices: Vec<usize>) -> Self {
        self.channel_indices = Some(channel_indices);
        self
    }
}

/// All spikes of one segment as parallel arrays, in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSpikeTrain {
    /// Sample index of each spike.
    pub sample_indices: Vec<i64>,
    /// Owning unit index of each spike.
    pub unit_indices: Vec<usize>,
}

impl SegmentSpikeTrain {
    /// Number of spikes in the segment.
    pub fn len(&self) -> usize {
        self.sample_indices.len()
    }

    /// True when the segment holds no spikes.
    pub fn is_empty(&self) -> bool {
        self.sample_indices.is_empty()
    }
}

/// Multi-channel recording split into segments.
pub trait Recording {
    /// Number of segments in the recording.
    fn num_segments(&self) -> usize;
    /// Sampling rate in Hz.
    fn sampling_frequency(&self) -> f64;
    /// Channel identifiers in column order.
    fn channel_ids(&self) -> &[ChannelId];
    /// Number of samples in a segment.
    fn num_samples(&self, segment_index: usize) -> Result<usize, BundleError>;
    /// Read a `(frames, channels)` block of traces.
    fn traces(&self, request: &TraceRequest) -> Result<Array2<f32>, BundleError>;
    /// Contact positions as a `(channels, ndim)` array.
    fn channel_locations(&self) -> Array2<f64>;
}

/// Output of a spike sorter: units and their spike trains.
pub trait Sorting {
    /// Unit identifiers in unit-index order.
    fn unit_ids(&self) -> &[UnitId];
    /// Number of segments covered by the sorting.
    fn num_segments(&self) -> usize;
    /// Sample indices of one unit's spikes in one segment.
    fn spike_train(&self, unit_id: &UnitId, segment_index: usize) -> Result<Vec<i64>, BundleError>;

    /// Every unit's spikes per segment, merged and ordered by sample index.
    ///
    /// Spikes sharing a sample index keep unit-index order.
    fn all_spike_trains(&self) -> Result<Vec<SegmentSpikeTrain>, BundleError> {
        let unit_ids = self.unit_ids();
        (0..self.num_segments())
            .map(|segment_index| {
                let mut pairs = Vec::new();
                for (unit_index, unit_id) in unit_ids.iter().enumerate() {
                    let train = self.spike_train(unit_id, segment_index)?;
                    pairs.extend(train.into_iter().map(|sample| (sample, unit_index)));
                }
                pairs.sort_by_key(|(sample, _)| *sample);
                let (sample_indices, unit_indices) = pairs.into_iter().unzip();
                Ok(SegmentSpikeTrain {
                    sample_indices,
                    unit_indices,
                })
            })
            .collect()
    }
}

/// Recording, sorting and extracted waveforms of one analysis.
pub trait ResultBundle {
    /// The recording the waveforms were extracted from.
    fn recording(&self) -> &dyn Recording;
    /// The sorting whose units the waveforms belong to.
    fn sorting(&self) -> &dyn Sorting;
    /// Samples kept before each spike peak.
    fn nbefore(&self) -> usize;
    /// Samples kept after each spike peak.
    fn nafter(&self) -> usize;
    /// Templates of every unit as `(units, samples, channels)`.
    fn templates(&self, mode: TemplateMode) -> Result<Array3<f32>, BundleError>;
    /// Extracted waveforms of one unit as `(spikes, samples, channels)`.
    fn waveforms(&self, unit_id: &UnitId) -> Result<Array3<f32>, BundleError>;

    /// Best channels per unit, ranked by peak amplitude of the average template.
    fn best_channels(
        &self,
        num_channels: usize,
        peak_sign: PeakSign,
    ) -> Result<HashMap<UnitId, Vec<usize>>, BundleError> {
        let average = self.templates(TemplateMode::Average)?;
        templates::best_channels_by_unit(
            self.sorting().unit_ids(),
            average.view(),
            num_channels,
            peak_sign,
        )
    }

    /// Channel holding the largest peak of each unit's average template.
    fn extremum_channels(&self, peak_sign: PeakSign) -> Result<HashMap<UnitId, usize>, BundleError> {
        let average = self.templates(TemplateMode::Average)?;
        templates::extremum_channels_by_unit(self.sorting().unit_ids(), average.view(), peak_sign)
    }
}
