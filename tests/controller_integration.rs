mod support;

use std::collections::BTreeSet;

use support::fixtures::{SyntheticLayout, spikes_in, synthetic_bundle};

use sortview::view_model::{unit_color32, unit_rows};
use sortview::{
    ControllerError, ControllerEvent, ControllerSettings, ResultController, TemplateMode,
    TraceRequest, TraceSource, UnitId,
};

fn controller_with(
    layout: &SyntheticLayout,
    num_channels: usize,
) -> ResultController<sortview::InMemoryBundle> {
    let mut settings = ControllerSettings::default();
    settings.sparsity.num_channels = num_channels;
    ResultController::new(synthetic_bundle(layout), &settings).expect("controller")
}

#[test]
fn spike_total_matches_per_segment_unit_counts() {
    let layout = SyntheticLayout::default();
    let controller = controller_with(&layout, 10);
    let expected: usize = (0..layout.units)
        .flat_map(|unit| (0..layout.segments).map(move |segment| spikes_in(unit, segment)))
        .sum();
    assert_eq!(controller.spikes().len(), expected);

    let segments: Vec<usize> = controller.spikes().iter().map(|s| s.segment_index).collect();
    assert!(segments.windows(2).all(|pair| pair[0] <= pair[1]));
    for segment in 0..layout.segments {
        let in_segment = segments.iter().filter(|&&s| s == segment).count();
        let expected: usize = (0..layout.units).map(|unit| spikes_in(unit, segment)).sum();
        assert_eq!(in_segment, expected);
    }
}

#[test]
fn spikes_within_a_segment_are_in_sample_order() {
    let controller = controller_with(&SyntheticLayout::default(), 10);
    let spikes = controller.spikes().as_slice();
    for pair in spikes.windows(2) {
        if pair[0].segment_index == pair[1].segment_index {
            assert!(pair[0].sample_index <= pair[1].sample_index);
        }
    }
}

#[test]
fn hiding_each_unit_hides_exactly_its_spikes() {
    let mut controller = controller_with(&SyntheticLayout::default(), 10);
    let unit_ids: Vec<UnitId> = controller.unit_ids().to_vec();
    for (hidden_index, hidden) in unit_ids.iter().enumerate() {
        controller.set_all_units_visible(true);
        controller.set_unit_visible(hidden, false).unwrap();
        controller.update_visible_spikes();
        for spike in controller.spikes() {
            assert_eq!(spike.visible, spike.unit_index != hidden_index);
        }
    }
}

#[test]
fn visibility_toggle_is_idempotent_and_notifies_each_time() {
    let mut controller = controller_with(&SyntheticLayout::default(), 10);
    let events = controller.subscribe();
    let target = controller.unit_ids()[2].clone();

    for _ in 0..2 {
        controller.set_unit_visible(&target, false).unwrap();
        controller.on_unit_visibility_changed();
    }
    let received: Vec<ControllerEvent> = events.try_iter().collect();
    assert_eq!(received, vec![ControllerEvent::UnitVisibilityChanged; 2]);
    assert!(!controller.is_unit_visible(&target).unwrap());
    assert!(
        controller
            .spikes()
            .iter()
            .filter(|spike| spike.unit_index == 2)
            .all(|spike| !spike.visible)
    );
}

#[test]
fn sparsity_rows_stay_within_budget() {
    let layout = SyntheticLayout::default();
    for budget in [1, 4, 10, 32] {
        let controller = controller_with(&layout, budget);
        let mask = controller.sparsity_mask().as_array();
        for row in mask.rows() {
            let marked = row.iter().filter(|flag| **flag).count();
            assert!(marked <= budget);
            assert_eq!(marked, budget.min(layout.channels));
        }
    }
}

#[test]
fn common_sparse_channels_equal_union_of_each_unit() {
    let controller = controller_with(&SyntheticLayout::default(), 3);
    let unit_ids = controller.unit_ids().to_vec();
    let mask = controller.sparsity_mask();
    for (a_index, a) in unit_ids.iter().enumerate() {
        for (b_index, b) in unit_ids.iter().enumerate() {
            let mut expected: BTreeSet<usize> =
                mask.channels_of(a_index).unwrap().into_iter().collect();
            expected.extend(mask.channels_of(b_index).unwrap());
            let common = controller
                .get_common_sparse_channels(&[a.clone(), b.clone()])
                .unwrap();
            assert_eq!(common, expected.into_iter().collect::<Vec<_>>());
        }
    }
}

#[test]
fn extremum_channels_match_synthetic_peaks() {
    let layout = SyntheticLayout::default();
    let controller = controller_with(&layout, 10);
    for (unit, unit_id) in controller.unit_ids().iter().enumerate() {
        assert_eq!(
            controller.get_extremum_channel(unit_id).unwrap(),
            (unit * 5) % layout.channels
        );
        let sparse = controller.sparsity_mask().channels_of(unit).unwrap();
        assert!(sparse.contains(&((unit * 5) % layout.channels)));
    }
}

#[test]
fn waveform_range_bounds_every_average_value() {
    let controller = controller_with(&SyntheticLayout::default(), 10);
    let (min, max) = controller.get_waveforms_range().unwrap();
    let average = controller.templates(TemplateMode::Average);
    assert!(average.iter().all(|value| min <= *value && *value <= max));
    assert!(average.iter().any(|value| *value == min));
    assert!(average.iter().any(|value| *value == max));
}

#[test]
fn trace_reads_cover_every_segment() {
    let layout = SyntheticLayout::default();
    let controller = controller_with(&layout, 10);
    for segment in 0..layout.segments {
        let num_samples = controller.get_num_samples(segment).unwrap();
        assert_eq!(num_samples, layout.samples_per_segment);
        let traces = controller
            .get_traces(TraceSource::Preprocessed, &TraceRequest::segment(segment))
            .unwrap();
        assert_eq!(traces.dim(), (num_samples, layout.channels));
    }
    let raw = controller.get_traces(TraceSource::Raw, &TraceRequest::segment(0));
    assert!(matches!(raw, Err(ControllerError::UnsupportedTraceSource(_))));
}

#[test]
fn unit_rows_reflect_controller_state() {
    let mut controller = controller_with(&SyntheticLayout::default(), 10);
    let hidden = controller.unit_ids()[1].clone();
    controller.set_unit_visible(&hidden, false).unwrap();

    let rows = unit_rows(&controller);
    assert_eq!(rows.len(), controller.num_units());
    let counts = controller.spike_counts_per_unit();
    for (index, row) in rows.iter().enumerate() {
        assert_eq!(row.unit_id, controller.unit_ids()[index]);
        assert_eq!(row.visible, row.unit_id != hidden);
        assert_eq!(row.spike_count, counts[index]);
        assert_eq!(
            row.color,
            unit_color32(controller.unit_color(&row.unit_id).unwrap())
        );
    }
}
