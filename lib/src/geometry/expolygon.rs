//! Polygon with holes.

use super::simplify::douglas_peucker_polygon;
use super::triangulate::{triangulate_expolygon, TriangulationResult};
use super::{BoundingBox, Line, Point, Polygon, Polyline};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};

/// A region bounded by one outer contour and zero or more holes.
///
/// A valid ExPolygon has a counter-clockwise contour and clockwise holes.
/// Holes are assumed not to cross the contour or each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    pub contour: Polygon,
    pub holes: Vec<Polygon>,
}

pub type ExPolygons = Vec<ExPolygon>;

impl ExPolygon {
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    /// Contour area minus the hole areas, in scaled units squared.
    pub fn area(&self) -> CoordF {
        self.contour.area().abs() - self.holes.iter().map(|h| h.area().abs()).sum::<CoordF>()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.contour.is_valid()
            && self.contour.is_counter_clockwise()
            && self.holes.iter().all(|h| h.is_valid() && h.is_clockwise())
    }

    /// Bring the contour to counter-clockwise and the holes to clockwise.
    pub fn orient(&mut self) {
        self.contour.make_counter_clockwise();
        for hole in &mut self.holes {
            hole.make_clockwise();
        }
    }

    /// Strict interior test. Boundary points may go either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// Interior-or-boundary test with [`crate::SCALED_EPSILON`] slack.
    pub fn contains_b(&self, p: &Point) -> bool {
        self.contains_point(p) || self.has_boundary_point(p)
    }

    /// True when the whole segment stays inside (boundary inclusive).
    pub fn contains_line(&self, line: &Line) -> bool {
        if !self.contains_b(&line.a) || !self.contains_b(&line.b) || !self.contains_b(&line.midpoint()) {
            return false;
        }
        // Any crossing away from the endpoints means the segment leaves the region
        self.lines().iter().all(|edge| match edge.intersection(line) {
            Some(ip) => {
                ip.coincides_with_epsilon(&line.a)
                    || ip.coincides_with_epsilon(&line.b)
                    || edge.a.coincides_with_epsilon(&ip)
                    || edge.b.coincides_with_epsilon(&ip)
            }
            None => true,
        })
    }

    pub fn has_boundary_point(&self, p: &Point) -> bool {
        self.contour.has_boundary_point(p) || self.holes.iter().any(|h| h.has_boundary_point(p))
    }

    /// Distance from `p` to the nearest contour or hole edge.
    pub fn distance_to_boundary(&self, p: &Point) -> CoordF {
        self.holes
            .iter()
            .map(|h| h.distance_to_boundary(p))
            .fold(self.contour.distance_to_boundary(p), CoordF::min)
    }

    /// Nearest vertex of the contour or any hole.
    pub fn closest_point(&self, p: &Point) -> Option<Point> {
        std::iter::once(&self.contour)
            .chain(&self.holes)
            .flat_map(|ring| ring.points().iter().copied())
            .min_by_key(|q| p.distance_squared(q))
    }

    /// True when the two regions share any area or boundary crossing.
    pub fn overlaps(&self, other: &ExPolygon) -> bool {
        if !self.bounding_box().overlaps(&other.bounding_box()) {
            return false;
        }
        if other.contour.points().iter().any(|p| self.contains_point(p))
            || self.contour.points().iter().any(|p| other.contains_point(p))
        {
            return true;
        }
        let other_lines = other.lines();
        self.lines()
            .iter()
            .any(|a| other_lines.iter().any(|b| a.intersection(b).is_some()))
    }

    /// Edges of the contour followed by the edges of every hole.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines = self.contour.lines();
        for hole in &self.holes {
            lines.extend(hole.lines());
        }
        lines
    }

    pub fn to_polygons(&self) -> Vec<Polygon> {
        let mut polygons = Vec::with_capacity(self.holes.len() + 1);
        polygons.push(self.contour.clone());
        polygons.extend(self.holes.iter().cloned());
        polygons
    }

    /// Every ring as a closed polyline (first point repeated).
    pub fn to_polylines(&self) -> Vec<Polyline> {
        self.to_polygons().iter().map(Polygon::to_polyline).collect()
    }

    /// Douglas-Peucker on every ring; holes that degenerate are dropped.
    pub fn simplify(&self, tolerance: Coord) -> ExPolygon {
        ExPolygon {
            contour: douglas_peucker_polygon(&self.contour, tolerance),
            holes: self
                .holes
                .iter()
                .map(|h| douglas_peucker_polygon(h, tolerance))
                .filter(|h| h.is_valid())
                .collect(),
        }
    }

    /// Drop ring vertices closer than `tolerance` to the previously kept
    /// vertex. Rings are never reduced below three vertices.
    pub fn remove_point_too_near(&mut self, tolerance: Coord) {
        remove_point_too_near(&mut self.contour, tolerance);
        for hole in &mut self.holes {
            remove_point_too_near(hole, tolerance);
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Split into triangles with the ear-clipping backend.
    pub fn triangulate(&self) -> TriangulationResult<Vec<[Point; 3]>> {
        triangulate_expolygon(self)
    }
}

impl From<Polygon> for ExPolygon {
    fn from(contour: Polygon) -> Self {
        Self::new(contour)
    }
}

fn remove_point_too_near(polygon: &mut Polygon, tolerance: Coord) {
    let tolerance_sq = tolerance as i128 * tolerance as i128;
    let points = polygon.points_mut();
    let mut i = 1;
    while points.len() > 3 && i <= points.len() {
        let prev = points[i - 1];
        let idx = i % points.len();
        if points[idx].distance_squared(&prev) < tolerance_sq {
            points.remove(idx);
            if idx == 0 {
                break;
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;

    fn frame() -> ExPolygon {
        let outer = Polygon::rectangle(Point::new(0, 0), Point::new(scale(10.0), scale(10.0)));
        let mut hole = Polygon::rectangle(
            Point::new(scale(3.0), scale(3.0)),
            Point::new(scale(7.0), scale(7.0)),
        );
        hole.make_clockwise();
        ExPolygon::with_holes(outer, vec![hole])
    }

    #[test]
    fn test_area_with_hole() {
        let ex = frame();
        let expected = (scale(10.0) as f64).powi(2) - (scale(4.0) as f64).powi(2);
        assert!((ex.area() - expected).abs() < 1.0);
        assert!(ex.is_valid());
    }

    #[test]
    fn test_contains() {
        let ex = frame();
        assert!(ex.contains_point(&Point::new(scale(1.0), scale(1.0))));
        assert!(!ex.contains_point(&Point::new(scale(5.0), scale(5.0))));
        assert!(ex.contains_b(&Point::new(scale(3.0), scale(5.0))));
        assert!(!ex.contains_b(&Point::new(scale(11.0), scale(5.0))));
    }

    #[test]
    fn test_contains_line() {
        let ex = frame();
        let inside = Line::new(Point::new_scale(1.0, 1.0), Point::new_scale(1.0, 9.0));
        let through_hole = Line::new(Point::new_scale(1.0, 5.0), Point::new_scale(9.0, 5.0));
        assert!(ex.contains_line(&inside));
        assert!(!ex.contains_line(&through_hole));
    }

    #[test]
    fn test_distance_to_boundary_uses_holes() {
        let ex = frame();
        let d = ex.distance_to_boundary(&Point::new_scale(2.5, 5.0));
        assert!((d - scale(0.5) as f64).abs() < 1.0);
    }

    #[test]
    fn test_closest_point_searches_holes() {
        let ex = frame();
        assert_eq!(ex.closest_point(&Point::new_scale(3.2, 2.9)), Some(Point::new_scale(3.0, 3.0)));
        assert_eq!(ex.closest_point(&Point::new_scale(0.4, 9.8)), Some(Point::new_scale(0.0, 10.0)));
        assert_eq!(ExPolygon::default().closest_point(&Point::new(0, 0)), None);
    }

    #[test]
    fn test_overlaps() {
        let ex = frame();
        let small = ExPolygon::new(Polygon::rectangle(
            Point::new_scale(9.0, 9.0),
            Point::new_scale(12.0, 12.0),
        ));
        let far = ExPolygon::new(Polygon::rectangle(
            Point::new_scale(20.0, 20.0),
            Point::new_scale(22.0, 22.0),
        ));
        assert!(ex.overlaps(&small));
        assert!(!ex.overlaps(&far));
    }

    #[test]
    fn test_remove_point_too_near() {
        let mut ex = ExPolygon::new(Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(1000, 0),
            Point::new(1005, 3),
            Point::new(1000, 1000),
            Point::new(0, 1000),
        ]));
        ex.remove_point_too_near(50);
        assert_eq!(ex.contour.len(), 4);
    }

    #[test]
    fn test_to_polylines_closed() {
        let pls = frame().to_polylines();
        assert_eq!(pls.len(), 2);
        assert!(pls.iter().all(|p| p.is_closed()));
    }
}
