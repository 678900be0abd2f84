//! Channel ranking heuristics over unit templates.
//!
//! Templates are laid out `(samples, channels)` per unit and
//! `(units, samples, channels)` for a whole sorting.

use std::collections::HashMap;

use ndarray::{ArrayView2, ArrayView3, Axis};

use super::{BundleError, PeakSign};
use crate::ids::UnitId;

/// Peak value of each channel of a single template.
///
/// Channels without samples report `0.0`.
pub fn peak_values(template: ArrayView2<'_, f32>, peak_sign: PeakSign) -> Vec<f32> {
    template
        .axis_iter(Axis(1))
        .map(|column| {
            if column.is_empty() {
                return 0.0;
            }
            match peak_sign {
                PeakSign::Neg => column.iter().copied().fold(f32::INFINITY, f32::min),
                PeakSign::Pos => column.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                PeakSign::Both => column
                    .iter()
                    .copied()
                    .fold(0.0_f32, |acc, value| if value.abs() > acc.abs() { value } else { acc }),
            }
        })
        .collect()
}

/// Channel with the largest absolute peak, first one on ties.
pub fn extremum_channel(template: ArrayView2<'_, f32>, peak_sign: PeakSign) -> Option<usize> {
    let peaks = peak_values(template, peak_sign);
    let mut best: Option<(usize, f32)> = None;
    for (channel, peak) in peaks.iter().map(|peak| peak.abs()).enumerate() {
        match best {
            Some((_, current)) if peak <= current => {}
            _ => best = Some((channel, peak)),
        }
    }
    best.map(|(channel, _)| channel)
}

/// Up to `num_channels` channels ordered by decreasing absolute peak.
///
/// Equal peaks keep the lower channel index first.
pub fn best_channels(
    template: ArrayView2<'_, f32>,
    num_channels: usize,
    peak_sign: PeakSign,
) -> Vec<usize> {
    let magnitudes: Vec<f32> = peak_values(template, peak_sign)
        .into_iter()
        .map(f32::abs)
        .collect();
    let mut order: Vec<usize> = (0..magnitudes.len()).collect();
    order.sort_by(|&a, &b| magnitudes[b].total_cmp(&magnitudes[a]).then(a.cmp(&b)));
    order.truncate(num_channels);
    order
}

/// [`best_channels`] for every unit of a template stack.
pub fn best_channels_by_unit(
    unit_ids: &[UnitId],
    templates: ArrayView3<'_, f32>,
    num_channels: usize,
    peak_sign: PeakSign,
) -> Result<HashMap<UnitId, Vec<usize>>, BundleError> {
    check_unit_axis(unit_ids, templates)?;
    Ok(unit_ids
        .iter()
        .zip(templates.axis_iter(Axis(0)))
        .map(|(unit_id, template)| {
            (
                unit_id.clone(),
                best_channels(template, num_channels, peak_sign),
            )
        })
        .collect())
}

/// [`extremum_channel`] for every unit of a template stack.
pub fn extremum_channels_by_unit(
    unit_ids: &[UnitId],
    templates: ArrayView3<'_, f32>,
    peak_sign: PeakSign,
) -> Result<HashMap<UnitId, usize>, BundleError> {
    check_unit_axis(unit_ids, templates)?;
    unit_ids
        .iter()
        .zip(templates.axis_iter(Axis(0)))
        .map(|(unit_id, template)| {
            extremum_channel(template, peak_sign)
                .map(|channel| (unit_id.clone(), channel))
                .ok_or_else(|| BundleError::MissingUnit {
                    unit_id: unit_id.clone(),
                    estimate: "extremum channel",
                })
        })
        .collect()
}

fn check_unit_axis(unit_ids: &[UnitId], templates: ArrayView3<'_, f32>) -> Result<(), BundleError> {
    let found = templates.len_of(Axis(0));
    if found != unit_ids.len() {
        return Err(BundleError::ShapeMismatch {
            what: "template units",
            expected: unit_ids.len(),
            found,
        });
    }
    Ok(())
}
