//! Closed polygon type.

use super::simplify::{remove_collinear_points, remove_duplicate_points};
use super::{BoundingBox, Line, Point, Polyline};
use crate::{Coord, CoordF, SCALED_EPSILON};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// A closed polygon. The last point implicitly connects back to the first
/// and is not repeated.
///
/// Orientation is meaningful: a counter-clockwise polygon has a positive
/// signed [`area`](Polygon::area).
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

pub type Polygons = Vec<Polygon>;

impl Polygon {
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Axis-aligned counter-clockwise rectangle.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area in scaled units squared (positive when counter-clockwise).
    pub fn area(&self) -> CoordF {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut twice: i128 = 0;
        let n = self.points.len();
        for i in 0..n {
            twice += self.points[i].cross(&self.points[(i + 1) % n]);
        }
        twice as CoordF / 2.0
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.area() > 0.0
    }

    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.area() < 0.0
    }

    /// Reverse if needed; returns true when the orientation changed.
    pub fn make_counter_clockwise(&mut self) -> bool {
        if self.is_clockwise() {
            self.reverse();
            true
        } else {
            false
        }
    }

    /// Reverse if needed; returns true when the orientation changed.
    pub fn make_clockwise(&mut self) -> bool {
        if self.is_counter_clockwise() {
            self.reverse();
            true
        } else {
            false
        }
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Total boundary length, including the closing edge.
    pub fn perimeter(&self) -> CoordF {
        self.lines().iter().map(Line::length).sum()
    }

    /// Alias of [`perimeter`](Self::perimeter).
    #[inline]
    pub fn length(&self) -> CoordF {
        self.perimeter()
    }

    /// All edges, including the closing edge.
    pub fn lines(&self) -> Vec<Line> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| Line::new(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    /// Even-odd containment test. Points on the boundary may go either way;
    /// use [`has_boundary_point`](Self::has_boundary_point) when that matters.
    pub fn contains_point(&self, p: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                // x coordinate of the edge at height p.y, compared without division
                let lhs = (p.x - pi.x) as i128 * (pj.y - pi.y) as i128;
                let rhs = (pj.x - pi.x) as i128 * (p.y - pi.y) as i128;
                if (pj.y > pi.y && lhs < rhs) || (pj.y < pi.y && lhs > rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True when `p` lies within [`SCALED_EPSILON`] of an edge.
    pub fn has_boundary_point(&self, p: &Point) -> bool {
        self.distance_to_boundary(p) <= SCALED_EPSILON as CoordF
    }

    pub fn distance_to_boundary(&self, p: &Point) -> CoordF {
        self.lines()
            .iter()
            .map(|l| l.distance_to_point(p))
            .fold(CoordF::INFINITY, CoordF::min)
    }

    pub fn closest_point_index(&self, p: &Point) -> Option<usize> {
        p.nearest_point_index(&self.points)
    }

    /// Closest intersection of `line` with any edge, measured from `line.a`.
    pub fn first_intersection(&self, line: &Line) -> Option<Point> {
        self.lines()
            .iter()
            .filter_map(|edge| edge.intersection(line))
            .min_by_key(|ip| ip.distance_squared(&line.a))
    }

    /// Drop vertices within `tolerance` of the line through their neighbours.
    pub fn remove_collinear(&mut self, tolerance: Coord) {
        if self.points.len() < 3 {
            return;
        }
        // Rotate the seam through once so the first vertex is tested too
        let mut pts = remove_collinear_points(&self.closed_ring(), tolerance);
        pts.pop();
        if pts.len() >= 3 {
            let mut rotated = pts[1..].to_vec();
            rotated.push(pts[0]);
            let mut ring = rotated.clone();
            ring.push(rotated[0]);
            let mut cleaned = remove_collinear_points(&ring, tolerance);
            cleaned.pop();
            pts = cleaned;
        }
        self.points = pts;
    }

    /// Drop consecutive vertices closer than [`SCALED_EPSILON`], including
    /// a last vertex that repeats the first.
    pub fn remove_duplicate_points(&mut self) {
        let mut pts = remove_duplicate_points(&self.points, SCALED_EPSILON);
        while pts.len() > 1 && pts[0].coincides_with_epsilon(&pts[pts.len() - 1]) {
            pts.pop();
        }
        self.points = pts;
    }

    /// Area centroid; falls back to the vertex average for degenerate input.
    pub fn centroid(&self) -> Point {
        let n = self.points.len();
        if n == 0 {
            return Point::zero();
        }
        let area = self.area();
        if area.abs() < 1.0 {
            let sx: i128 = self.points.iter().map(|p| p.x as i128).sum();
            let sy: i128 = self.points.iter().map(|p| p.y as i128).sum();
            return Point::new((sx / n as i128) as Coord, (sy / n as i128) as Coord);
        }
        let origin = self.points[0];
        let (mut cx, mut cy) = (0.0, 0.0);
        for i in 0..n {
            let a = self.points[i] - origin;
            let b = self.points[(i + 1) % n] - origin;
            let cross = a.cross(&b) as CoordF;
            cx += (a.x + b.x) as CoordF * cross;
            cy += (a.y + b.y) as CoordF * cross;
        }
        let factor = 1.0 / (6.0 * area);
        Point::new(
            origin.x + (cx * factor).round() as Coord,
            origin.y + (cy * factor).round() as Coord,
        )
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Open polyline starting and ending at the first vertex.
    pub fn to_polyline(&self) -> Polyline {
        self.split_at_index(0)
    }

    /// Alias of [`to_polyline`](Self::to_polyline).
    #[inline]
    pub fn split_at_first_point(&self) -> Polyline {
        self.to_polyline()
    }

    /// Open polyline starting and ending at vertex `index`.
    pub fn split_at_index(&self, index: usize) -> Polyline {
        if self.points.is_empty() {
            return Polyline::new();
        }
        let n = self.points.len();
        let mut pts: Vec<Point> = (0..=n).map(|k| self.points[(index + k) % n]).collect();
        if n == 1 {
            pts.truncate(1);
        }
        Polyline::from_points(pts)
    }

    /// At least three vertices and a non-zero area.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.area() != 0.0
    }

    fn closed_ring(&self) -> Vec<Point> {
        let mut ring = self.points.clone();
        if let Some(first) = self.points.first() {
            ring.push(*first);
        }
        ring
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({:?})", self.points)
    }
}

impl Deref for Polygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polygon {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}
