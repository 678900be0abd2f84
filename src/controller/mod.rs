//! Cached view of a spike-sorting result for GUI views.
//!
//! [`ResultController`] reads everything it needs from a [`ResultBundle`]
//! once, at construction: unit colors, the flat spike vector, templates, the
//! sparsity mask and extremum channels. Views then query these caches
//! directly. Afterwards only unit visibility, the spike visibility projection
//! and spike selection change.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use ndarray::{Array3, ArrayView3};
use tracing::info;

use crate::bundle::{BundleError, ResultBundle, TemplateMode, TraceSource};
use crate::colors::{Rgba, UnitColors};
use crate::ids::{ChannelId, UnitId};
use crate::settings::ControllerSettings;
use crate::sparsity::SparsityMask;
use crate::spikes::SpikeVector;

mod error;
mod events;
mod selection;
mod traces;
mod visibility;

pub use error::ControllerError;
pub use events::ControllerEvent;
use events::EventHub;

/// Derived caches over one result bundle plus the per-session view state.
pub struct ResultController<B: ResultBundle> {
    bundle: B,
    unit_ids: Vec<UnitId>,
    channel_ids: Vec<ChannelId>,
    unit_lookup: HashMap<UnitId, usize>,
    num_segments: usize,
    sampling_frequency: f64,
    colors: UnitColors,
    unit_visible: Vec<bool>,
    spikes: SpikeVector,
    templates_average: Array3<f32>,
    templates_median: Array3<f32>,
    templates_std: Array3<f32>,
    sparsity: SparsityMask,
    extremum_channels: Vec<usize>,
    trace_source: TraceSource,
    events: EventHub,
}

impl<B: ResultBundle> ResultController<B> {
    /// Build every cache from `bundle`.
    ///
    /// Errors raised by the bundle, or inconsistencies between its parts, are
    /// returned as [`ControllerError::Bundle`].
    pub fn new(bundle: B, settings: &ControllerSettings) -> Result<Self, ControllerError> {
        let settings = settings.clone().normalized();
        let recording = bundle.recording();
        let sorting = bundle.sorting();
        let unit_ids = sorting.unit_ids().to_vec();
        let channel_ids = recording.channel_ids().to_vec();
        let num_segments = recording.num_segments();
        let sampling_frequency = recording.sampling_frequency();

        let colors = UnitColors::assign(&unit_ids, settings.color_map);
        let unit_visible = vec![true; unit_ids.len()];

        let trains = sorting.all_spike_trains()?;
        if trains.len() != num_segments {
            return Err(BundleError::ShapeMismatch {
                what: "spike train segments",
                expected: num_segments,
                found: trains.len(),
            }
            .into());
        }
        let spikes = SpikeVector::from_segments(&trains, unit_ids.len())?;

        let templates_average = bundle.templates(TemplateMode::Average)?;
        let templates_median = bundle.templates(TemplateMode::Median)?;
        let templates_std = bundle.templates(TemplateMode::Std)?;

        let sparse = &settings.sparsity;
        let best_channels = bundle.best_channels(sparse.num_channels, sparse.peak_sign)?;
        let sparsity = SparsityMask::from_channel_sets(
            &unit_ids,
            channel_ids.len(),
            sparse.num_channels,
            &best_channels,
        )?;

        let extremum = bundle.extremum_channels(sparse.peak_sign)?;
        let extremum_channels = unit_ids
            .iter()
            .map(|unit_id| {
                let channel_index =
                    extremum
                        .get(unit_id)
                        .copied()
                        .ok_or_else(|| BundleError::MissingUnit {
                            unit_id: unit_id.clone(),
                            estimate: "extremum channel",
                        })?;
                if channel_index >= channel_ids.len() {
                    return Err(BundleError::ChannelOutOfRange {
                        channel_index,
                        num_channels: channel_ids.len(),
                    });
                }
                Ok(channel_index)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let unit_lookup = unit_ids
            .iter()
            .enumerate()
            .map(|(index, unit_id)| (unit_id.clone(), index))
            .collect();

        info!(
            units = unit_ids.len(),
            channels = channel_ids.len(),
            segments = num_segments,
            spikes = spikes.len(),
            "Result controller ready"
        );

        Ok(Self {
            bundle,
            unit_ids,
            channel_ids,
            unit_lookup,
            num_segments,
            sampling_frequency,
            colors,
            unit_visible,
            spikes,
            templates_average,
            templates_median,
            templates_std,
            sparsity,
            extremum_channels,
            trace_source: settings.trace_source,
            events: EventHub::default(),
        })
    }

    /// Build with [`ControllerSettings::default`].
    pub fn with_default_settings(bundle: B) -> Result<Self, ControllerError> {
        Self::new(bundle, &ControllerSettings::default())
    }

    /// The bundle the caches were built from.
    pub fn bundle(&self) -> &B {
        &self.bundle
    }

    pub fn unit_ids(&self) -> &[UnitId] {
        &self.unit_ids
    }

    pub fn channel_ids(&self) -> &[ChannelId] {
        &self.channel_ids
    }

    pub fn num_units(&self) -> usize {
        self.unit_ids.len()
    }

    pub fn num_channels(&self) -> usize {
        self.channel_ids.len()
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// Sampling rate of the recording in Hz.
    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Position of `unit_id` in [`Self::unit_ids`].
    pub fn unit_index(&self, unit_id: &UnitId) -> Result<usize, ControllerError> {
        self.unit_lookup
            .get(unit_id)
            .copied()
            .ok_or_else(|| ControllerError::UnknownUnit(unit_id.clone()))
    }

    /// Display color of a unit.
    pub fn unit_color(&self, unit_id: &UnitId) -> Result<Rgba, ControllerError> {
        let unit_index = self.unit_index(unit_id)?;
        self.colors
            .get(unit_index)
            .ok_or_else(|| ControllerError::UnknownUnit(unit_id.clone()))
    }

    /// Colors of every unit in unit-index order.
    pub fn unit_colors(&self) -> &UnitColors {
        &self.colors
    }

    /// All spikes, concatenated across segments.
    pub fn spikes(&self) -> &SpikeVector {
        &self.spikes
    }

    /// Number of spikes owned by each unit, in unit-index order.
    pub fn spike_counts_per_unit(&self) -> Vec<usize> {
        self.spikes.counts_per_unit(self.num_units())
    }

    pub fn sparsity_mask(&self) -> &SparsityMask {
        &self.sparsity
    }

    /// Cached `(units, samples, channels)` templates for `mode`.
    pub fn templates(&self, mode: TemplateMode) -> ArrayView3<'_, f32> {
        match mode {
            TemplateMode::Average => self.templates_average.view(),
            TemplateMode::Median => self.templates_median.view(),
            TemplateMode::Std => self.templates_std.view(),
        }
    }

    /// Channel index where the unit's template peaks.
    pub fn get_extremum_channel(&self, unit_id: &UnitId) -> Result<usize, ControllerError> {
        let unit_index = self.unit_index(unit_id)?;
        Ok(self.extremum_channels[unit_index])
    }

    /// Trace source configured for views that do not pick one.
    ///
    /// Always a source [`Self::get_traces`] can serve.
    pub fn default_trace_source(&self) -> TraceSource {
        self.trace_source
    }

    /// Receive every [`ControllerEvent`] emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<ControllerEvent> {
        self.events.subscribe()
    }
}
