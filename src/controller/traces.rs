use ndarray::{Array2, Array3};

use super::{ControllerError, ResultController};
use crate::bundle::{ResultBundle, TraceRequest, TraceSource};
use crate::ids::UnitId;

impl<B: ResultBundle> ResultController<B> {
    /// Number of samples in a segment of the recording.
    pub fn get_num_samples(&self, segment_index: usize) -> Result<usize, ControllerError> {
        Ok(self.bundle.recording().num_samples(segment_index)?)
    }

    /// Read `(frames, channels)` traces from `source`.
    ///
    /// Only [`TraceSource::Preprocessed`] is served; [`TraceSource::Raw`]
    /// fails with [`ControllerError::UnsupportedTraceSource`].
    pub fn get_traces(
        &self,
        source: TraceSource,
        request: &TraceRequest,
    ) -> Result<Array2<f32>, ControllerError> {
        match source {
            TraceSource::Preprocessed => Ok(self.bundle.recording().traces(request)?),
            TraceSource::Raw => Err(ControllerError::UnsupportedTraceSource(source)),
        }
    }

    /// [`Self::get_traces`] with the source given by name.
    pub fn get_traces_by_name(
        &self,
        source: &str,
        request: &TraceRequest,
    ) -> Result<Array2<f32>, ControllerError> {
        self.get_traces(source.parse()?, request)
    }

    /// Contact positions as a `(channels, ndim)` array.
    pub fn get_contact_location(&self) -> Array2<f64> {
        self.bundle.recording().channel_locations()
    }

    /// Samples before and after the spike peak covered by waveforms.
    pub fn get_waveform_sweep(&self) -> (usize, usize) {
        (self.bundle.nbefore(), self.bundle.nafter())
    }

    /// Smallest and largest value across all average templates.
    ///
    /// `None` when the templates hold no values.
    pub fn get_waveforms_range(&self) -> Option<(f32, f32)> {
        self.templates_average
            .iter()
            .copied()
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    /// Extracted `(spikes, samples, channels)` waveforms of one unit.
    pub fn get_waveforms(&self, unit_id: &UnitId) -> Result<Array3<f32>, ControllerError> {
        Ok(self.bundle.waveforms(unit_id)?)
    }

    /// Channels that are sparse-relevant to at least one of `unit_ids`.
    pub fn get_common_sparse_channels(
        &self,
        unit_ids: &[UnitId],
    ) -> Result<Vec<usize>, ControllerError> {
        let unit_indices = unit_ids
            .iter()
            .map(|unit_id| self.unit_index(unit_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.sparsity.union_of(&unit_indices))
    }
}
