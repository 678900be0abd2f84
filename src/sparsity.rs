//! Per-unit channel sparsity as a boolean `(units, channels)` matrix.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};

use crate::bundle::BundleError;
use crate::ids::UnitId;

/// Marks, for every unit, the channels that carry its signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsityMask {
    mask: Array2<bool>,
    budget: usize,
}

impl SparsityMask {
    /// Assemble the mask from per-unit channel index sets.
    ///
    /// Every unit must have an entry, every index must address a channel and
    /// no entry may list more than `budget` distinct channels.
    pub fn from_channel_sets(
        unit_ids: &[UnitId],
        num_channels: usize,
        budget: usize,
        channel_sets: &HashMap<UnitId, Vec<usize>>,
    ) -> Result<Self, BundleError> {
        let mut mask = Array2::from_elem((unit_ids.len(), num_channels), false);
        for (unit_index, unit_id) in unit_ids.iter().enumerate() {
            let channels = channel_sets
                .get(unit_id)
                .ok_or_else(|| BundleError::MissingUnit {
                    unit_id: unit_id.clone(),
                    estimate: "sparsity",
                })?;
            let mut row = mask.row_mut(unit_index);
            for &channel_index in channels {
                if channel_index >= num_channels {
                    return Err(BundleError::ChannelOutOfRange {
                        channel_index,
                        num_channels,
                    });
                }
                row[channel_index] = true;
            }
            let found = row.iter().filter(|&&flag| flag).count();
            if found > budget {
                return Err(BundleError::SparsityBudgetExceeded {
                    unit_id: unit_id.clone(),
                    found,
                    budget,
                });
            }
        }
        Ok(Self { mask, budget })
    }

    /// Maximum number of channels a unit may mark.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// The raw `(units, channels)` matrix.
    pub fn as_array(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Mask row of one unit.
    pub fn row(&self, unit_index: usize) -> Option<ArrayView1<'_, bool>> {
        (unit_index < self.mask.nrows()).then(|| self.mask.row(unit_index))
    }

    /// Sparse channel indices of one unit, ascending.
    pub fn channels_of(&self, unit_index: usize) -> Option<Vec<usize>> {
        self.row(unit_index).map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, flag)| **flag)
                .map(|(channel, _)| channel)
                .collect()
        })
    }

    /// Channels marked by at least one of the given units, ascending.
    ///
    /// Unit indices past the last row are ignored.
    pub fn union_of(&self, unit_indices: &[usize]) -> Vec<usize> {
        let rows: Vec<usize> = unit_indices
            .iter()
            .copied()
            .filter(|&index| index < self.mask.nrows())
            .collect();
        let selected = self.mask.select(Axis(0), &rows);
        selected
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, column)| column.iter().any(|&flag| flag))
            .map(|(channel, _)| channel)
            .collect()
    }
}
