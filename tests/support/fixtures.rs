use ndarray::{Array2, Array3};
use sortview::{ChannelId, InMemoryBundle};

/// Shape of a synthetic sorting.
pub struct SyntheticLayout {
    pub units: usize,
    pub channels: usize,
    pub segments: usize,
    pub samples_per_segment: usize,
    pub nbefore: usize,
    pub nafter: usize,
}

impl Default for SyntheticLayout {
    fn default() -> Self {
        Self {
            units: 6,
            channels: 16,
            segments: 3,
            samples_per_segment: 2_000,
            nbefore: 5,
            nafter: 10,
        }
    }
}

/// Spike count of `unit` in `segment`; varies so per-segment totals differ.
pub fn spikes_in(unit: usize, segment: usize) -> usize {
    (unit * 3 + segment * 2) % 7 + 1
}

/// Deterministic bundle where unit `u` peaks on channel `(u * 5) % channels`
/// and its amplitude decays with distance from that channel.
pub fn synthetic_bundle(layout: &SyntheticLayout) -> InMemoryBundle {
    let channel_ids = (0..layout.channels as u32).map(ChannelId::from).collect();
    let locations = Array2::from_shape_fn((layout.channels, 2), |(channel, axis)| {
        if axis == 0 { 0.0 } else { channel as f64 * 25.0 }
    });
    let mut builder = InMemoryBundle::builder(25_000.0)
        .channels(channel_ids, locations)
        .sweep(layout.nbefore, layout.nafter);
    for segment in 0..layout.segments {
        builder = builder.segment(Array2::from_shape_fn(
            (layout.samples_per_segment, layout.channels),
            |(sample, channel)| ((sample + segment * 7 + channel) % 13) as f32 - 6.0,
        ));
    }
    let samples = layout.nbefore + layout.nafter;
    for unit in 0..layout.units {
        let peak_channel = (unit * 5) % layout.channels;
        let trains: Vec<Vec<i64>> = (0..layout.segments)
            .map(|segment| {
                (0..spikes_in(unit, segment))
                    .map(|k| (k * 97 + unit * 11 + 20) as i64)
                    .collect()
            })
            .collect();
        let num_spikes: usize = trains.iter().map(Vec::len).sum();
        let waveforms = Array3::from_shape_fn((num_spikes, samples, layout.channels), |(spike, sample, channel)| {
            if sample != layout.nbefore {
                return 0.1 * spike as f32;
            }
            let distance = channel.abs_diff(peak_channel) as f32;
            -(40.0 + unit as f32) / (1.0 + distance)
        });
        builder = builder.unit(format!("unit-{unit}"), trains, waveforms);
    }
    builder.build().expect("synthetic bundle")
}
