//! Flat spike vector shared by every view.
//!
//! Spikes of all segments are concatenated in segment order; within a segment
//! they keep the order the sorting reported them in.

use crate::bundle::{BundleError, SegmentSpikeTrain};

/// One detected spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spike {
    /// Sample index within its segment.
    pub sample_index: i64,
    /// Index of the owning unit.
    pub unit_index: usize,
    /// Channel the spike was detected on, when known.
    pub channel_index: Option<usize>,
    /// Segment the spike belongs to.
    pub segment_index: usize,
    /// Cached copy of the owning unit's visibility.
    pub visible: bool,
    /// Whether the spike is part of the current selection.
    pub selected: bool,
}

/// All spikes of a sorting, concatenated across segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpikeVector {
    spikes: Vec<Spike>,
}

impl SpikeVector {
    /// Concatenate per-segment trains, checking unit indices against `num_units`.
    ///
    /// Every spike starts visible and unselected.
    pub fn from_segments(
        segments: &[SegmentSpikeTrain],
        num_units: usize,
    ) -> Result<Self, BundleError> {
        let total: usize = segments.iter().map(SegmentSpikeTrain::len).sum();
        let mut spikes = Vec::with_capacity(total);
        for (segment_index, segment) in segments.iter().enumerate() {
            if segment.unit_indices.len() != segment.sample_indices.len() {
                return Err(BundleError::ShapeMismatch {
                    what: "spike unit indices",
                    expected: segment.sample_indices.len(),
                    found: segment.unit_indices.len(),
                });
            }
            for (&sample_index, &unit_index) in
                segment.sample_indices.iter().zip(&segment.unit_indices)
            {
                if unit_index >= num_units {
                    return Err(BundleError::UnitIndexOutOfRange {
                        unit_index,
                        num_units,
                    });
                }
                spikes.push(Spike {
                    sample_index,
                    unit_index,
                    channel_index: None,
                    segment_index,
                    visible: true,
                    selected: false,
                });
            }
        }
        Ok(Self { spikes })
    }

    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    pub fn as_slice(&self) -> &[Spike] {
        &self.spikes
    }

    pub fn get(&self, index: usize) -> Option<&Spike> {
        self.spikes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spike> {
        self.spikes.iter()
    }

    /// Copy each unit's visibility onto its spikes in a single pass.
    ///
    /// `unit_visible` is indexed by unit index; spikes of units beyond its
    /// length are left untouched.
    pub fn apply_unit_visibility(&mut self, unit_visible: &[bool]) {
        for spike in &mut self.spikes {
            if let Some(&visible) = unit_visible.get(spike.unit_index) {
                spike.visible = visible;
            }
        }
    }

    /// Replace the selection with the spikes at `indices`.
    ///
    /// Returns the first index that is out of range without touching the
    /// current selection.
    pub fn select(&mut self, indices: &[usize]) -> Result<(), usize> {
        if let Some(&bad) = indices.iter().find(|&&index| index >= self.spikes.len()) {
            return Err(bad);
        }
        for spike in &mut self.spikes {
            spike.selected = false;
        }
        for &index in indices {
            self.spikes[index].selected = true;
        }
        Ok(())
    }

    /// Deselect every spike.
    pub fn clear_selection(&mut self) {
        for spike in &mut self.spikes {
            spike.selected = false;
        }
    }

    /// Indices of selected spikes, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.indices_where(|spike| spike.selected)
    }

    /// Indices of visible spikes, ascending.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.indices_where(|spike| spike.visible)
    }

    /// Number of spikes owned by each of `num_units` units.
    pub fn counts_per_unit(&self, num_units: usize) -> Vec<usize> {
        let mut counts = vec![0; num_units];
        for spike in &self.spikes {
            if let Some(count) = counts.get_mut(spike.unit_index) {
                *count += 1;
            }
        }
        counts
    }

    fn indices_where(&self, predicate: impl Fn(&Spike) -> bool) -> Vec<usize> {
        self.spikes
            .iter()
            .enumerate()
            .filter(|(_, spike)| predicate(spike))
            .map(|(index, _)| index)
            .collect()
    }
}

impl<'a> IntoIterator for &'a SpikeVector {
    type Item = &'a Spike;
    type IntoIter = std::slice::Iter<'a, Spike>;

    fn into_iter(self) -> Self::IntoIter {
        self.spikes.iter()
    }
}
