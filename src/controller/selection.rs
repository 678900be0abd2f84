use tracing::debug;

use super::{ControllerError, ControllerEvent, ResultController};
use crate::bundle::ResultBundle;

impl<B: ResultBundle> ResultController<B> {
    /// Replace the spike selection and notify subscribers.
    ///
    /// An out-of-range index leaves the selection unchanged.
    pub fn set_selected_spikes(&mut self, indices: &[usize]) -> Result<(), ControllerError> {
        let num_spikes = self.spikes.len();
        self.spikes
            .select(indices)
            .map_err(|index| ControllerError::SpikeOutOfRange { index, num_spikes })?;
        debug!(selected = indices.len(), "Spike selection changed");
        self.events.emit(ControllerEvent::SpikeSelectionChanged);
        Ok(())
    }

    /// Deselect every spike and notify subscribers.
    pub fn clear_spike_selection(&mut self) {
        self.spikes.clear_selection();
        self.events.emit(ControllerEvent::SpikeSelectionChanged);
    }

    /// Indices of selected spikes, ascending.
    pub fn selected_spike_indices(&self) -> Vec<usize> {
        self.spikes.selected_indices()
    }
}
