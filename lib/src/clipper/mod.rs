//! Polygon booleans and offsets, backed by `geo-clipper`.
//!
//! Regions cross into `geo` in millimetres and come back scaled. Offset
//! distances are given in millimetres.
//!
//! Used by the medial-axis engine (anchor regions, frontier clipping) and
//! by the thin feature driver (thin zone and gap detection).

use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon};
use crate::{scale, unscale, CoordF, SCALING_FACTOR};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Offset used to keep touching regions from merging after a grow.
const SAFETY_OFFSET: CoordF = 0.00001;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    Square,
    #[default]
    Round,
    /// Sharp corners, limited to twice the offset distance.
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            // arc tolerance in mm
            OffsetJoinType::Round => JoinType::Round(0.005),
            OffsetJoinType::Miter => JoinType::Miter(2.0),
        }
    }
}

fn ring_to_geo(polygon: &Polygon) -> LineString<f64> {
    let mut ring: Vec<GeoCoord<f64>> = polygon
        .points()
        .iter()
        .map(|p| GeoCoord {
            x: unscale(p.x),
            y: unscale(p.y),
        })
        .collect();
    if let Some(&first) = ring.first() {
        if ring.last() != Some(&first) {
            ring.push(first);
        }
    }
    LineString::new(ring)
}

fn ring_from_geo(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring.coords().map(|c| Point::new(scale(c.x), scale(c.y))).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

fn to_geo(expolygons: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        expolygons
            .iter()
            .map(|ex| GeoPolygon::new(ring_to_geo(&ex.contour), ex.holes.iter().map(ring_to_geo).collect()))
            .collect(),
    )
}

fn from_geo(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .map(|p| ExPolygon::with_holes(ring_from_geo(p.exterior()), p.interiors().iter().map(ring_from_geo).collect()))
        .filter(|ex| ex.contour.len() >= 3)
        .collect()
}

/// Merge possibly overlapping regions.
pub fn union_ex(expolygons: &[ExPolygon]) -> ExPolygons {
    match expolygons {
        [] => Vec::new(),
        [single] => vec![single.clone()],
        [first, rest @ ..] => from_geo(&to_geo(std::slice::from_ref(first)).union(&to_geo(rest), SCALING_FACTOR)),
    }
}

pub fn intersection(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() || clip.is_empty() {
        return Vec::new();
    }
    from_geo(&to_geo(subject).intersection(&to_geo(clip), SCALING_FACTOR))
}

/// `subject` minus `clip`.
pub fn difference(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() {
        return Vec::new();
    }
    if clip.is_empty() {
        return subject.to_vec();
    }
    from_geo(&to_geo(subject).difference(&to_geo(clip), SCALING_FACTOR))
}

/// Offset one region by `delta` mm (positive grows).
pub fn offset_expolygon(expolygon: &ExPolygon, delta: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(std::slice::from_ref(expolygon), delta, join_type)
}

/// Offset regions by `delta` mm (positive grows). Overlapping results are
/// merged.
pub fn offset_expolygons(expolygons: &[ExPolygon], delta: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    if expolygons.is_empty() {
        return Vec::new();
    }
    from_geo(&to_geo(expolygons).offset(delta, join_type.into(), EndType::ClosedPolygon, SCALING_FACTOR))
}

pub fn shrink(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, -distance.abs(), join_type)
}

pub fn grow(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, distance.abs(), join_type)
}

/// Morphological opening: shrink then grow by `distance` mm. Parts
/// narrower than twice the distance disappear.
pub fn opening(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    if expolygons.is_empty() || distance <= 0.0 {
        return expolygons.to_vec();
    }
    let shrunk = shrink(expolygons, distance, join_type);
    if shrunk.is_empty() {
        return shrunk;
    }
    grow(&shrunk, distance, join_type)
}

/// Area between two consecutive perimeter levels left uncovered by their
/// beads.
///
/// `outer` and `inner` are the centerline regions of the two levels and
/// `spacing` the bead spacing (mm). Gaps narrower than `min_width` are
/// discarded.
pub fn detect_gaps(
    outer: &[ExPolygon],
    inner: &[ExPolygon],
    spacing: CoordF,
    min_width: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    if outer.is_empty() {
        return Vec::new();
    }
    let half = spacing / 2.0;
    let uncovered = shrink(outer, half, join_type);
    let covered = grow(inner, half + SAFETY_OFFSET, join_type);
    let raw = difference(&uncovered, &covered);
    if raw.is_empty() {
        return raw;
    }
    opening(&raw, min_width / 2.0, join_type)
}

/// Sum of the areas (scaled units squared).
pub fn total_area(expolygons: &[ExPolygon]) -> CoordF {
    expolygons.iter().map(ExPolygon::area).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mm(x0: f64, y0: f64, x1: f64, y1: f64) -> ExPolygon {
        Polygon::rectangle(Point::new(scale(x0), scale(y0)), Point::new(scale(x1), scale(y1))).into()
    }

    fn area_mm2(expolygons: &[ExPolygon]) -> f64 {
        total_area(expolygons) / (SCALING_FACTOR * SCALING_FACTOR)
    }

    #[test]
    fn test_conversion_keeps_coordinates() {
        let square = rect_mm(0.0, 0.0, 10.0, 10.0);
        let back = from_geo(&to_geo(std::slice::from_ref(&square)));
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].contour.len(), 4);
        assert!((back[0].area() - square.area()).abs() < 1.0);
    }

    #[test]
    fn test_union_merges_overlap() {
        let a = rect_mm(0.0, 0.0, 10.0, 10.0);
        let b = rect_mm(5.0, 0.0, 15.0, 10.0);
        let merged = union_ex(&[a, b]);
        assert_eq!(merged.len(), 1);
        assert!((area_mm2(&merged) - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_difference_and_intersection() {
        let a = rect_mm(0.0, 0.0, 10.0, 10.0);
        let b = rect_mm(5.0, 0.0, 15.0, 10.0);
        let diff = difference(&[a.clone()], &[b.clone()]);
        assert!((area_mm2(&diff) - 50.0).abs() < 1e-3);
        let inter = intersection(&[a.clone()], &[b]);
        assert!((area_mm2(&inter) - 50.0).abs() < 1e-3);
        assert_eq!(difference(&[a.clone()], &[]), vec![a.clone()]);
        assert!(intersection(&[a], &[]).is_empty());
    }

    #[test]
    fn test_difference_makes_hole() {
        let outer = rect_mm(0.0, 0.0, 10.0, 10.0);
        let inner = rect_mm(3.0, 3.0, 7.0, 7.0);
        let ring = difference(&[outer], &[inner]);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring[0].holes.len(), 1);
        assert!((area_mm2(&ring) - 84.0).abs() < 1e-3);
    }

    #[test]
    fn test_offsets() {
        let square = rect_mm(0.0, 0.0, 10.0, 10.0);
        let shrunk = shrink(std::slice::from_ref(&square), 1.0, OffsetJoinType::Miter);
        assert!((area_mm2(&shrunk) - 64.0).abs() < 1e-3);
        let grown = grow(std::slice::from_ref(&square), 1.0, OffsetJoinType::Miter);
        assert!((area_mm2(&grown) - 144.0).abs() < 1e-3);
        assert!(shrink(&[square], 6.0, OffsetJoinType::Miter).is_empty());
    }

    #[test]
    fn test_opening_removes_thin_parts() {
        // 10x10 block with a 0.3 mm fin
        let block = rect_mm(0.0, 0.0, 10.0, 10.0);
        let fin = rect_mm(10.0, 4.0, 15.0, 4.3);
        let part = union_ex(&[block, fin]);
        let opened = opening(&part, 0.2, OffsetJoinType::Miter);
        assert!((area_mm2(&opened) - 100.0).abs() < 1e-2);
        let thin = difference(&part, &opened);
        assert!((area_mm2(&thin) - 1.5).abs() < 1e-2);
    }

    #[test]
    fn test_detect_gaps_between_levels() {
        let outer = rect_mm(0.0, 0.0, 10.0, 1.0);
        let gaps = detect_gaps(&[outer.clone()], &[], 0.4, 0.1, OffsetJoinType::Miter);
        assert_eq!(gaps.len(), 1);
        // 9.6 x 0.6 left once the outer bead is accounted for
        assert!((area_mm2(&gaps) - 5.76).abs() < 1e-2);

        let covered = detect_gaps(&[outer.clone()], &[outer], 0.4, 0.1, OffsetJoinType::Miter);
        assert!(covered.is_empty());
    }
}
