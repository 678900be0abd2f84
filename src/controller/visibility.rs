use tracing::debug;

use super::{ControllerError, ControllerEvent, ResultController};
use crate::bundle::ResultBundle;
use crate::ids::UnitId;

impl<B: ResultBundle> ResultController<B> {
    /// Current visibility flag of a unit.
    pub fn is_unit_visible(&self, unit_id: &UnitId) -> Result<bool, ControllerError> {
        Ok(self.unit_visible[self.unit_index(unit_id)?])
    }

    /// Visibility flags of every unit, in unit-index order.
    pub fn unit_visibility(&self) -> &[bool] {
        &self.unit_visible
    }

    /// Set one unit's visibility flag.
    ///
    /// Spikes keep their previous visibility until
    /// [`Self::on_unit_visibility_changed`] or [`Self::update_visible_spikes`].
    pub fn set_unit_visible(&mut self, unit_id: &UnitId, visible: bool) -> Result<(), ControllerError> {
        let unit_index = self.unit_index(unit_id)?;
        self.unit_visible[unit_index] = visible;
        Ok(())
    }

    /// Set every unit's visibility flag.
    pub fn set_all_units_visible(&mut self, visible: bool) {
        self.unit_visible.fill(visible);
    }

    /// Make the listed units visible and hide all others.
    ///
    /// Nothing changes if any id is unknown.
    pub fn show_only_units(&mut self, unit_ids: &[UnitId]) -> Result<(), ControllerError> {
        let indices = unit_ids
            .iter()
            .map(|unit_id| self.unit_index(unit_id))
            .collect::<Result<Vec<_>, _>>()?;
        self.unit_visible.fill(false);
        for index in indices {
            self.unit_visible[index] = true;
        }
        Ok(())
    }

    /// Ids of visible units, in unit-index order.
    pub fn visible_unit_ids(&self) -> Vec<UnitId> {
        self.unit_ids
            .iter()
            .zip(&self.unit_visible)
            .filter(|(_, visible)| **visible)
            .map(|(unit_id, _)| unit_id.clone())
            .collect()
    }

    /// Refresh the spike visibility projection and notify subscribers.
    pub fn on_unit_visibility_changed(&mut self) {
        self.update_visible_spikes();
        self.events.emit(ControllerEvent::UnitVisibilityChanged);
    }

    /// Copy each unit's visibility flag onto all of its spikes.
    pub fn update_visible_spikes(&mut self) {
        self.spikes.apply_unit_visibility(&self.unit_visible);
        debug!(
            visible_units = self.unit_visible.iter().filter(|visible| **visible).count(),
            "Spike visibility refreshed"
        );
    }
}
