//! Helpers to turn controller state into egui-facing view structs.
//!
//! The controller keeps colors as raw RGBA; conversion to [`Color32`] happens
//! here, at the edge where views consume it.

use egui::Color32;

use crate::bundle::ResultBundle;
use crate::colors::Rgba;
use crate::controller::ResultController;
use crate::ids::UnitId;

/// One row of a unit list view.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitRowView {
    pub unit_id: UnitId,
    pub color: Color32,
    pub visible: bool,
    pub spike_count: usize,
    /// Channel index the unit's template peaks on.
    pub extremum_channel: usize,
}

/// Opaque egui color for a unit color; alpha is dropped.
pub fn unit_color32(color: Rgba) -> Color32 {
    Color32::from_rgb(channel_u8(color.r), channel_u8(color.g), channel_u8(color.b))
}

fn channel_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rows for every unit, in unit-index order.
pub fn unit_rows<B: ResultBundle>(controller: &ResultController<B>) -> Vec<UnitRowView> {
    let counts = controller.spike_counts_per_unit();
    let colors = controller.unit_colors();
    controller
        .unit_ids()
        .iter()
        .enumerate()
        .filter_map(|(index, unit_id)| {
            Some(UnitRowView {
                unit_id: unit_id.clone(),
                color: unit_color32(colors.get(index)?),
                visible: controller.unit_visibility().get(index).copied()?,
                spike_count: counts.get(index).copied()?,
                extremum_channel: controller.get_extremum_channel(unit_id).ok()?,
            })
        })
        .collect()
}
