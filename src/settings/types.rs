use serde::{Deserialize, Serialize};

use crate::bundle::{PeakSign, TraceSource};
use crate::colors::ColorMap;

/// Channel budget used when none is configured.
pub const DEFAULT_SPARSE_CHANNELS: usize = 10;

/// Settings applied when a controller is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ControllerSettings {
    /// Palette unit colors are drawn from.
    #[serde(default)]
    pub color_map: ColorMap,
    /// Source views read traces from unless they ask otherwise.
    #[serde(default)]
    pub trace_source: TraceSource,
    #[serde(default)]
    pub sparsity: SparsitySettings,
}

impl ControllerSettings {
    /// Replace out-of-range values with defaults.
    ///
    /// Raw traces cannot be served yet, so a configured `raw` source falls
    /// back to the preprocessed one.
    pub fn normalized(mut self) -> Self {
        self.sparsity = self.sparsity.normalized();
        if self.trace_source == TraceSource::Raw {
            self.trace_source = TraceSource::Preprocessed;
        }
        self
    }
}

/// How the best channels of each unit are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparsitySettings {
    /// Maximum channels kept per unit.
    #[serde(default = "default_sparse_channels")]
    pub num_channels: usize,
    /// Polarity used to rank channels and find the extremum.
    #[serde(default)]
    pub peak_sign: PeakSign,
}

impl SparsitySettings {
    fn normalized(mut self) -> Self {
        if self.num_channels == 0 {
            self.num_channels = DEFAULT_SPARSE_CHANNELS;
        }
        self
    }
}

impl Default for SparsitySettings {
    fn default() -> Self {
        Self {
            num_channels: default_sparse_channels(),
            peak_sign: PeakSign::default(),
        }
    }
}

fn default_sparse_channels() -> usize {
    DEFAULT_SPARSE_CHANNELS
}
