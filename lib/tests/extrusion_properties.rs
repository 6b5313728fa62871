//! Property-based tests for the extrusion entity hierarchy.
//!
//! Run with: cargo test -p medial-slicer --test extrusion_properties

use medial_slicer::{
    ExtrusionEntity, ExtrusionEntityCollection, ExtrusionLoop, ExtrusionLoopRole, ExtrusionPath, ExtrusionRole,
    Point, Polyline,
};
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = Point> {
    (-1_000_000i64..1_000_000, -1_000_000i64..1_000_000).prop_map(|(x, y)| Point::new(x, y))
}

/// Distinct consecutive points, so every path has a non-degenerate start.
fn arb_points(min: usize, max: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(arb_point(), min..=max).prop_map(|mut points| {
        points.dedup();
        points
    })
}

fn path(points: Vec<Point>) -> ExtrusionPath {
    ExtrusionPath::new(ExtrusionRole::ThinWall).with_polyline(Polyline::from_points(points))
}

/// Cut the closed sequence `points + [points[0]]` into consecutive paths
/// sharing their boundary points. `cuts` picks the split positions.
fn split_closed(points: &[Point], cuts: &[usize]) -> Vec<ExtrusionPath> {
    let mut closed = points.to_vec();
    closed.push(points[0]);
    let last = closed.len() - 1;
    let mut bounds: Vec<usize> = cuts.iter().map(|c| 1 + c % (last - 1).max(1)).filter(|&c| c < last).collect();
    bounds.push(0);
    bounds.push(last);
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .windows(2)
        .map(|w| path(closed[w[0]..=w[1]].to_vec()))
        .collect()
}

fn endpoints(entities: &[ExtrusionEntity]) -> Vec<(Option<Point>, Option<Point>)> {
    entities.iter().map(|e| (e.first_point(), e.last_point())).collect()
}

proptest! {
    /// Loops assembled from a closed point sequence start where they end
    /// and chain their paths end to start.
    #[test]
    fn loops_are_closed_and_contiguous(
        points in arb_points(3, 20),
        cuts in prop::collection::vec(0usize..100, 0..5),
    ) {
        prop_assume!(points.len() >= 3 && points.first() != points.last());
        let paths = split_closed(&points, &cuts);
        let extrusion_loop = ExtrusionLoop::new(paths, ExtrusionLoopRole::ThinWall);
        prop_assert_eq!(extrusion_loop.first_point(), extrusion_loop.last_point());
        prop_assert!(extrusion_loop.validate().is_ok());
        for pair in extrusion_loop.paths.windows(2) {
            prop_assert_eq!(pair[0].last_point(), pair[1].first_point());
        }

        let single = ExtrusionLoop::from_path(path(points.clone()), ExtrusionLoopRole::Default);
        prop_assert_eq!(single.first_point(), single.last_point());
        prop_assert!(single.validate().is_ok());
    }

    /// Ordered groups survive an order-preserving flatten as one flat group;
    /// a plain flatten leaves no nesting.
    #[test]
    fn flatten_keeps_ordered_groups(
        ordered in prop::collection::vec((arb_point(), arb_point()), 1..6),
        loose in prop::collection::vec((arb_point(), arb_point()), 0..6),
        nested_deeper in any::<bool>(),
    ) {
        let mut group = ExtrusionEntityCollection::new_no_sort(Vec::new());
        for &(a, b) in &ordered {
            group.append(path(vec![a, b]));
        }
        let expected = endpoints(&group.entities);

        let mut top = ExtrusionEntityCollection::new();
        for &(a, b) in &loose {
            top.append(path(vec![a, b]));
        }
        if nested_deeper {
            let mut wrapper = ExtrusionEntityCollection::new();
            wrapper.append(group);
            top.append(wrapper);
        } else {
            top.append(group);
        }

        let kept = top.flatten(true);
        let groups: Vec<&ExtrusionEntityCollection> = kept
            .entities
            .iter()
            .filter_map(|e| match e {
                ExtrusionEntity::Collection(c) => Some(c),
                _ => None,
            })
            .collect();
        prop_assert_eq!(groups.len(), 1);
        prop_assert!(groups[0].no_sort);
        prop_assert_eq!(endpoints(&groups[0].entities), expected);
        prop_assert_eq!(kept.items_count(), ordered.len() + loose.len());

        let flat = top.flatten(false);
        prop_assert!(!flat.entities.iter().any(ExtrusionEntity::is_collection));
        prop_assert_eq!(flat.len(), ordered.len() + loose.len());
    }
}
