//! Property-based tests for the flow model.
//!
//! Run with: cargo test -p medial-slicer --test flow_properties

use medial_slicer::flow::solid_spacing;
use medial_slicer::{ExtrusionWidth, Flow, FlowRole, BRIDGE_EXTRA_SPACING};
use proptest::prelude::*;

const ROLES: [FlowRole; 8] = [
    FlowRole::ExternalPerimeter,
    FlowRole::Perimeter,
    FlowRole::Infill,
    FlowRole::SolidInfill,
    FlowRole::TopSolidInfill,
    FlowRole::SupportMaterial,
    FlowRole::SupportMaterialInterface,
    FlowRole::GapFill,
];

fn arb_role() -> impl Strategy<Value = FlowRole> {
    prop::sample::select(ROLES.to_vec())
}

/// Width, height and nozzle with the height never above the width, so the
/// flow is not clamped.
fn arb_bead() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.1..2.0f64, 0.05..1.0f64, 0.1..1.5f64).prop_map(|(width, height_ratio, nozzle)| (width, width * height_ratio, nozzle))
}

proptest! {
    /// Converting a width to its spacing and back gives the width again.
    #[test]
    fn spacing_round_trips_to_width(
        role in arb_role(),
        (width, height, nozzle) in arb_bead(),
        overlap in 0.0..=1.0f64,
    ) {
        let flow = Flow::new_from_config_width(role, ExtrusionWidth::absolute(width), nozzle, height, overlap, 0.0).unwrap();
        prop_assert!(!flow.is_bridge());
        let back = Flow::new_from_spacing(flow.spacing(), nozzle, height, overlap, false).unwrap();
        prop_assert!((back.width() - width).abs() < 1e-9, "{} became {}", width, back.width());
        prop_assert!((back.spacing() - flow.spacing()).abs() < 1e-9);
    }

    /// A bridge flow ratio of 1 gives a round thread of nozzle diameter.
    #[test]
    fn bridge_flow_is_nozzle_thread(
        role in arb_role(),
        configured in prop_oneof![
            Just(ExtrusionWidth::auto()),
            (0.1..2.0f64).prop_map(ExtrusionWidth::absolute),
            (50.0..200.0f64).prop_map(ExtrusionWidth::percent),
        ],
        nozzle in 0.1..1.5f64,
        height in 0.05..0.6f64,
        overlap in 0.0..=1.0f64,
    ) {
        let flow = Flow::new_from_config_width(role, configured, nozzle, height, overlap, 1.0).unwrap();
        prop_assert!(flow.is_bridge());
        prop_assert_eq!(flow.width(), nozzle);
        prop_assert_eq!(flow.height(), nozzle);
        prop_assert_eq!(flow.spacing(), nozzle + BRIDGE_EXTRA_SPACING);
    }

    /// Adjusted solid spacing stays within [spacing, 1.2 × spacing] and never
    /// overshoots the interval.
    #[test]
    fn solid_spacing_is_bounded(total in 0.0..200.0f64, spacing in 0.05..5.0f64) {
        let adjusted = solid_spacing(total, spacing).unwrap();
        prop_assert!(adjusted >= spacing);
        prop_assert!(adjusted <= 1.2 * spacing + 1e-12);
        let beads = (total / adjusted).floor();
        prop_assert!(beads * adjusted <= total + 1e-9);
    }
}

#[test]
fn solid_spacing_rejects_bad_input() {
    assert!(solid_spacing(10.0, 0.0).is_err());
    assert!(solid_spacing(-1.0, 0.4).is_err());
}
