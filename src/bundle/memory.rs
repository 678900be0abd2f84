//! Result bundle held entirely in memory.
//!
//! Useful for embedding small analyses and for tests: traces, spike trains
//! and waveforms are handed over up front and templates are computed once
//! when the bundle is built.

use ndarray::{Array2, Array3, ArrayView1, ArrayView3, Axis, s};

use super::{BundleError, Recording, ResultBundle, Sorting, TemplateMode, TraceRequest};
use crate::ids::{ChannelId, UnitId};

/// Recording backed by one `(samples, channels)` array per segment.
#[derive(Debug, Clone)]
pub struct InMemoryRecording {
    sampling_frequency: f64,
    channel_ids: Vec<ChannelId>,
    locations: Array2<f64>,
    segments: Vec<Array2<f32>>,
}

impl InMemoryRecording {
    fn segment(&self, segment_index: usize) -> Result<&Array2<f32>, BundleError> {
        self.segments
            .get(segment_index)
            .ok_or(BundleError::SegmentOutOfRange {
                segment_index,
                num_segments: self.segments.len(),
            })
    }
}

impl Recording for InMemoryRecording {
    fn num_segments(&self) -> usize {
        self.segments.len()
    }

    fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    fn channel_ids(&self) -> &[ChannelId] {
        &self.channel_ids
    }

    fn num_samples(&self, segment_index: usize) -> Result<usize, BundleError> {
        Ok(self.segment(segment_index)?.nrows())
    }

    fn traces(&self, request: &TraceRequest) -> Result<Array2<f32>, BundleError> {
        let traces = self.segment(request.segment_index)?;
        let num_samples = traces.nrows();
        let start = request.start_frame.unwrap_or(0);
        let end = request.end_frame.unwrap_or(num_samples);
        if start > end || end > num_samples {
            return Err(BundleError::FrameRange {
                start,
                end,
                num_samples,
            });
        }
        let window = traces.slice(s![start..end, ..]);
        match &request.channel_indices {
            None => Ok(window.to_owned()),
            Some(indices) => {
                let num_channels = self.channel_ids.len();
                if let Some(&channel_index) = indices.iter().find(|&&index| index >= num_channels) {
                    return Err(BundleError::ChannelOutOfRange {
                        channel_index,
                        num_channels,
                    });
                }
                Ok(window.select(Axis(1), indices))
            }
        }
    }

    fn channel_locations(&self) -> Array2<f64> {
        self.locations.clone()
    }
}

/// Sorting backed by per-segment, per-unit spike trains.
#[derive(Debug, Clone)]
pub struct InMemorySorting {
    unit_ids: Vec<UnitId>,
    /// Indexed `[unit][segment]`.
    trains: Vec<Vec<Vec<i64>>>,
    num_segments: usize,
}

impl Sorting for InMemorySorting {
    fn unit_ids(&self) -> &[UnitId] {
        &self.unit_ids
    }

    fn num_segments(&self) -> usize {
        self.num_segments
    }

    fn spike_train(&self, unit_id: &UnitId, segment_index: usize) -> Result<Vec<i64>, BundleError> {
        let unit_index = self
            .unit_ids
            .iter()
            .position(|id| id == unit_id)
            .ok_or_else(|| BundleError::UnknownUnit {
                unit_id: unit_id.clone(),
            })?;
        self.trains[unit_index]
            .get(segment_index)
            .cloned()
            .ok_or(BundleError::SegmentOutOfRange {
                segment_index,
                num_segments: self.num_segments,
            })
    }
}

/// Recording, sorting, waveforms and templates kept in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBundle {
    recording: InMemoryRecording,
    sorting: InMemorySorting,
    nbefore: usize,
    nafter: usize,
    waveforms: Vec<Array3<f32>>,
    average: Array3<f32>,
    median: Array3<f32>,
    std: Array3<f32>,
}

impl InMemoryBundle {
    /// Start building a bundle sampled at `sampling_frequency` Hz.
    pub fn builder(sampling_frequency: f64) -> InMemoryBundleBuilder {
        InMemoryBundleBuilder::new(sampling_frequency)
    }

    fn unit_index(&self, unit_id: &UnitId) -> Result<usize, BundleError> {
        self.sorting
            .unit_ids
            .iter()
            .position(|id| id == unit_id)
            .ok_or_else(|| BundleError::UnknownUnit {
                unit_id: unit_id.clone(),
            })
    }
}

impl ResultBundle for InMemoryBundle {
    fn recording(&self) -> &dyn Recording {
        &self.recording
    }

    fn sorting(&self) -> &dyn Sorting {
        &self.sorting
    }

    fn nbefore(&self) -> usize {
        self.nbefore
    }

    fn nafter(&self) -> usize {
        self.nafter
    }

    fn templates(&self, mode: TemplateMode) -> Result<Array3<f32>, BundleError> {
        Ok(match mode {
            TemplateMode::Average => self.average.clone(),
            TemplateMode::Median => self.median.clone(),
            TemplateMode::Std => self.std.clone(),
        })
    }

    fn waveforms(&self, unit_id: &UnitId) -> Result<Array3<f32>, BundleError> {
        let unit_index = self.unit_index(unit_id)?;
        Ok(self.waveforms[unit_index].clone())
    }
}

struct PendingUnit {
    unit_id: UnitId,
    trains: Vec<Vec<i64>>,
    waveforms: Array3<f32>,
}

/// Collects the parts of an [`InMemoryBundle`] and validates their shapes.
pub struct InMemoryBundleBuilder {
    sampling_frequency: f64,
    channel_ids: Vec<ChannelId>,
    locations: Array2<f64>,
    segments: Vec<Array2<f32>>,
    units: Vec<PendingUnit>,
    nbefore: usize,
    nafter: usize,
}

impl InMemoryBundleBuilder {
    fn new(sampling_frequency: f64) -> Self {
        Self {
            sampling_frequency,
            channel_ids: Vec::new(),
            locations: Array2::zeros((0, 2)),
            segments: Vec::new(),
            units: Vec::new(),
            nbefore: 0,
            nafter: 0,
        }
    }

    /// Channel ids and their `(channels, ndim)` contact locations.
    pub fn channels(mut self, channel_ids: Vec<ChannelId>, locations: Array2<f64>) -> Self {
        self.channel_ids = channel_ids;
        self.locations = locations;
        self
    }

    /// Append a segment of `(samples, channels)` traces.
    pub fn segment(mut self, traces: Array2<f32>) -> Self {
        self.segments.push(traces);
        self
    }

    /// Samples kept before and after each spike peak.
    pub fn sweep(mut self, nbefore: usize, nafter: usize) -> Self {
        self.nbefore = nbefore;
        self.nafter = nafter;
        self
    }

    /// Add a unit with one spike train per segment and its
    /// `(spikes, samples, channels)` waveforms.
    pub fn unit(
        mut self,
        unit_id: impl Into<UnitId>,
        trains: Vec<Vec<i64>>,
        waveforms: Array3<f32>,
    ) -> Self {
        self.units.push(PendingUnit {
            unit_id: unit_id.into(),
            trains,
            waveforms,
        });
        self
    }

    /// Validate shapes and compute templates.
    pub fn build(self) -> Result<InMemoryBundle, BundleError> {
        let num_channels = self.channel_ids.len();
        let num_segments = self.segments.len();
        let num_template_samples = self.nbefore + self.nafter;
        expect_len("channel locations", num_channels, self.locations.nrows())?;
        for traces in &self.segments {
            expect_len("trace channels", num_channels, traces.ncols())?;
        }
        for unit in &self.units {
            expect_len("unit segments", num_segments, unit.trains.len())?;
            let (_, samples, channels) = unit.waveforms.dim();
            expect_len("waveform samples", num_template_samples, samples)?;
            expect_len("waveform channels", num_channels, channels)?;
        }

        let shape = (self.units.len(), num_template_samples, num_channels);
        let mut average = Array3::zeros(shape);
        let mut median = Array3::zeros(shape);
        let mut std = Array3::zeros(shape);
        for (unit_index, unit) in self.units.iter().enumerate() {
            if unit.waveforms.len_of(Axis(0)) == 0 {
                continue;
            }
            let waveforms = unit.waveforms.view();
            if let Some(mean) = waveforms.mean_axis(Axis(0)) {
                average.index_axis_mut(Axis(0), unit_index).assign(&mean);
            }
            median
                .index_axis_mut(Axis(0), unit_index)
                .assign(&median_over_spikes(waveforms));
            std.index_axis_mut(Axis(0), unit_index)
                .assign(&waveforms.std_axis(Axis(0), 0.0));
        }

        let mut unit_ids = Vec::with_capacity(self.units.len());
        let mut trains = Vec::with_capacity(self.units.len());
        let mut waveforms = Vec::with_capacity(self.units.len());
        for unit in self.units {
            unit_ids.push(unit.unit_id);
            trains.push(unit.trains);
            waveforms.push(unit.waveforms);
        }

        Ok(InMemoryBundle {
            recording: InMemoryRecording {
                sampling_frequency: self.sampling_frequency,
                channel_ids: self.channel_ids,
                locations: self.locations,
                segments: self.segments,
            },
            sorting: InMemorySorting {
                unit_ids,
                trains,
                num_segments,
            },
            nbefore: self.nbefore,
            nafter: self.nafter,
            waveforms,
            average,
            median,
            std,
        })
    }
}

fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<(), BundleError> {
    if expected != found {
        return Err(BundleError::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

fn median_over_spikes(waveforms: ArrayView3<'_, f32>) -> Array2<f32> {
    waveforms.map_axis(Axis(0), median_of_lane)
}

fn median_of_lane(lane: ArrayView1<'_, f32>) -> f32 {
    let mut values = lane.to_vec();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::PeakSign;
    use ndarray::array;

    fn two_channel_bundle() -> InMemoryBundle {
        let mut waveforms = Array3::<f32>::zeros((3, 2, 2));
        waveforms[[0, 0, 1]] = -1.0;
        waveforms[[1, 0, 1]] = -2.0;
        waveforms[[2, 0, 1]] = -6.0;
        InMemoryBundle::builder(30_000.0)
            .channels(
                vec![ChannelId::from("ch0"), ChannelId::from("ch1")],
                array![[0.0, 0.0], [0.0, 20.0]],
            )
            .segment(Array2::from_shape_fn((8, 2), |(row, col)| (row * 10 + col) as f32))
            .sweep(1, 1)
            .unit("u0", vec![vec![2, 4, 6]], waveforms)
            .build()
            .unwrap()
    }

    #[test]
    fn templates_hold_mean_median_and_std() {
        let bundle = two_channel_bundle();
        let average = bundle.templates(TemplateMode::Average).unwrap();
        let median = bundle.templates(TemplateMode::Median).unwrap();
        let std = bundle.templates(TemplateMode::Std).unwrap();
        assert_eq!(average.dim(), (1, 2, 2));
        assert!((average[[0, 0, 1]] + 3.0).abs() < 1e-6);
        assert!((median[[0, 0, 1]] + 2.0).abs() < 1e-6);
        let expected_std = ((4.0_f32 + 1.0 + 9.0) / 3.0).sqrt();
        assert!((std[[0, 0, 1]] - expected_std).abs() < 1e-5);
        assert_eq!(average[[0, 1, 0]], 0.0);
    }

    #[test]
    fn default_estimates_use_average_template() {
        let bundle = two_channel_bundle();
        let extremum = bundle.extremum_channels(PeakSign::Neg).unwrap();
        assert_eq!(extremum[&UnitId::from("u0")], 1);
        let best = bundle.best_channels(1, PeakSign::Neg).unwrap();
        assert_eq!(best[&UnitId::from("u0")], vec![1]);
    }

    #[test]
    fn traces_honour_frame_and_channel_window() {
        let bundle = two_channel_bundle();
        let request = TraceRequest::segment(0).frames(2, 5).channels(vec![1]);
        let traces = bundle.recording().traces(&request).unwrap();
        assert_eq!(traces, array![[21.0_f32], [31.0], [41.0]]);
        assert_eq!(bundle.recording().num_samples(0).unwrap(), 8);
    }

    #[test]
    fn traces_reject_bad_windows() {
        let bundle = two_channel_bundle();
        let recording = bundle.recording();
        assert!(matches!(
            recording.traces(&TraceRequest::segment(0).frames(4, 9)),
            Err(BundleError::FrameRange { .. })
        ));
        assert!(matches!(
            recording.traces(&TraceRequest::segment(0).channels(vec![2])),
            Err(BundleError::ChannelOutOfRange {
                channel_index: 2,
                ..
            })
        ));
        assert!(matches!(
            recording.traces(&TraceRequest::segment(3)),
            Err(BundleError::SegmentOutOfRange { .. })
        ));
    }

    #[test]
    fn build_rejects_mismatched_shapes() {
        let result = InMemoryBundle::builder(1_000.0)
            .channels(vec![ChannelId::from("a")], array![[0.0, 0.0]])
            .segment(Array2::zeros((4, 2)))
            .build();
        assert!(matches!(
            result,
            Err(BundleError::ShapeMismatch {
                what: "trace channels",
                ..
            })
        ));

        let result = InMemoryBundle::builder(1_000.0)
            .channels(vec![ChannelId::from("a")], array![[0.0, 0.0]])
            .segment(Array2::zeros((4, 1)))
            .sweep(2, 2)
            .unit("x", vec![vec![1]], Array3::zeros((1, 3, 1)))
            .build();
        assert!(matches!(
            result,
            Err(BundleError::ShapeMismatch {
                what: "waveform samples",
                ..
            })
        ));
    }

    #[test]
    fn unknown_unit_lookups_fail() {
        let bundle = two_channel_bundle();
        assert!(matches!(
            bundle.waveforms(&UnitId::from("nope")),
            Err(BundleError::UnknownUnit { .. })
        ));
        assert!(matches!(
            bundle.sorting().spike_train(&UnitId::from("u0"), 1),
            Err(BundleError::SegmentOutOfRange { .. })
        ));
    }
}
