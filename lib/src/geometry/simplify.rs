//! Path simplification algorithms.
//!
//! All tolerances are in scaled units. The medial-axis engine simplifies
//! at [`crate::SCALED_RESOLUTION`]; cleanup passes on input polygons use
//! [`crate::SCALED_EPSILON`].

use super::{Point, Polygon};
use crate::{Coord, CoordF};

/// Douglas-Peucker simplification of an open point sequence.
///
/// The first and last points are always preserved.
pub fn douglas_peucker(points: &[Point], tolerance: Coord) -> Vec<Point> {
    let deviation =
        |a: usize, b: usize, i: usize| points[i].distance_to_segment(&points[a], &points[b]);
    douglas_peucker_keep(points.len(), deviation, tolerance as CoordF)
        .into_iter()
        .zip(points)
        .filter_map(|(keep, p)| keep.then_some(*p))
        .collect()
}

/// Generic Douglas-Peucker over `n` indexed points, reporting which survive.
///
/// `deviation(anchor, floater, i)` measures how far point `i` strays from
/// the chord `anchor -> floater`. Used directly by callers that carry extra
/// per-point data (such as widths) which must be filtered in lockstep.
pub fn douglas_peucker_keep<F>(n: usize, deviation: F, tolerance: CoordF) -> Vec<bool>
where
    F: Fn(usize, usize, usize) -> CoordF,
{
    if n <= 2 {
        return vec![true; n];
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Stack-based to avoid recursion depth issues on long paths
    let mut stack = vec![(0, n - 1)];
    while let Some((anchor_idx, floater_idx)) = stack.pop() {
        if anchor_idx + 1 >= floater_idx {
            continue;
        }

        let mut max_dist = 0.0;
        let mut furthest_idx = anchor_idx;
        for i in (anchor_idx + 1)..floater_idx {
            let dist = deviation(anchor_idx, floater_idx, i);
            if dist > max_dist {
                max_dist = dist;
                furthest_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[furthest_idx] = true;
            stack.push((anchor_idx, furthest_idx));
            stack.push((furthest_idx, floater_idx));
        }
    }

    keep
}

/// Douglas-Peucker simplification for a closed polygon.
///
/// Returns the input unchanged if simplification would leave fewer than
/// three vertices.
pub fn douglas_peucker_polygon(polygon: &Polygon, tolerance: Coord) -> Polygon {
    let points = polygon.points();
    if points.len() <= 3 {
        return polygon.clone();
    }

    // Close the ring so the seam vertex participates like any other
    let mut ring = points.to_vec();
    ring.push(points[0]);
    let mut simplified = douglas_peucker(&ring, tolerance);
    simplified.pop();

    if simplified.len() < 3 {
        return polygon.clone();
    }
    Polygon::from_points(simplified)
}

/// Remove consecutive points closer than `tolerance` to the last kept point.
pub fn remove_duplicate_points(points: &[Point], tolerance: Coord) -> Vec<Point> {
    let mut result: Vec<Point> = Vec::with_capacity(points.len());
    let tolerance_sq = tolerance as i128 * tolerance as i128;

    for point in points {
        match result.last() {
            Some(last) if last.distance_squared(point) <= tolerance_sq => {}
            _ => result.push(*point),
        }
    }

    result
}

/// Remove interior points lying within `tolerance` of the line through
/// their kept predecessor and their successor.
pub fn remove_collinear_points(points: &[Point], tolerance: Coord) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut result = Vec::with_capacity(points.len());
    result.push(points[0]);

    for i in 1..(points.len() - 1) {
        let prev = result[result.len() - 1];
        let curr = points[i];
        let next = points[i + 1];
        if infinite_line_distance(&curr, &prev, &next) > tolerance as CoordF {
            result.push(curr);
        }
    }

    result.push(points[points.len() - 1]);
    result
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn infinite_line_distance(p: &Point, a: &Point, b: &Point) -> CoordF {
    let ab = *b - *a;
    let len = ab.length();
    if len == 0.0 {
        return p.distance(a);
    }
    (ab.cross(&(*p - *a)) as CoordF).abs() / len
}
