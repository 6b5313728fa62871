//! Polylines carrying a width at every vertex.
//!
//! [`ThickPolyline`] is the working structure of the medial-axis engine:
//! `points` and `width` are parallel vectors, and `endpoints` records for
//! each end whether it is a free terminus (`true`) or a junction with
//! other polylines (`false`).

use super::simplify::douglas_peucker_keep;
use super::{Line, Point, Polyline};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};

/// A polyline with one width value per point. Widths are in scaled units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThickPolyline {
    pub points: Vec<Point>,
    pub width: Vec<CoordF>,
    pub endpoints: (bool, bool),
}

pub type ThickPolylines = Vec<ThickPolyline>;

/// A segment with a width at each end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThickLine {
    pub a: Point,
    pub b: Point,
    pub a_width: CoordF,
    pub b_width: CoordF,
}

impl ThickLine {
    pub fn new(a: Point, b: Point, a_width: CoordF, b_width: CoordF) -> Self {
        Self {
            a,
            b,
            a_width,
            b_width,
        }
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    #[inline]
    pub fn line(&self) -> Line {
        Line::new(self.a, self.b)
    }
}

impl ThickPolyline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel point/width vectors.
    pub fn from_parts(points: Vec<Point>, width: Vec<CoordF>, endpoints: (bool, bool)) -> Self {
        debug_assert_eq!(points.len(), width.len());
        Self {
            points,
            width,
            endpoints,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// At least two points and one width per point.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2 && self.points.len() == self.width.len()
    }

    /// Panics if empty.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Panics if empty.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Closed when the first and last points coincide.
    pub fn is_loop(&self) -> bool {
        self.points.len() >= 3 && self.points.first() == self.points.last()
    }

    pub fn length(&self) -> CoordF {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    pub fn push(&mut self, point: Point, width: CoordF) {
        self.points.push(point);
        self.width.push(width);
    }

    /// Reverse in place; endpoint flags follow their ends.
    pub fn reverse(&mut self) {
        self.points.reverse();
        self.width.reverse();
        self.endpoints = (self.endpoints.1, self.endpoints.0);
    }

    pub fn thicklines(&self) -> Vec<ThickLine> {
        (1..self.points.len())
            .map(|i| {
                ThickLine::new(
                    self.points[i - 1],
                    self.points[i],
                    self.width[i - 1],
                    self.width[i],
                )
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.points.windows(2).map(|w| Line::new(w[0], w[1])).collect()
    }

    pub fn to_polyline(&self) -> Polyline {
        Polyline::from_points(self.points.clone())
    }

    pub fn max_width(&self) -> CoordF {
        self.width.iter().copied().fold(0.0, CoordF::max)
    }

    /// Remove `distance` of length from the end, interpolating the width at
    /// the new last point. Clipping more than the length empties the polyline.
    pub fn clip_end(&mut self, mut distance: CoordF) {
        while distance > 0.0 && self.points.len() >= 2 {
            let n = self.points.len();
            let last = self.points[n - 1];
            let prev = self.points[n - 2];
            let seg = last.distance(&prev);
            if seg > distance {
                let t = distance / seg;
                self.points[n - 1] = last.interpolate(t, &prev);
                self.width[n - 1] += (self.width[n - 2] - self.width[n - 1]) * t;
                return;
            }
            distance -= seg;
            self.points.pop();
            self.width.pop();
        }
        if distance > 0.0 {
            self.points.clear();
            self.width.clear();
        }
    }

    /// Same as [`clip_end`](Self::clip_end) from the first point.
    pub fn clip_start(&mut self, distance: CoordF) {
        self.reverse();
        self.clip_end(distance);
        self.reverse();
    }

    /// Douglas-Peucker on position and width jointly: a vertex survives if
    /// either its position or its width strays from the chord by more than
    /// `tolerance`.
    pub fn simplify(&mut self, tolerance: Coord) {
        if self.points.len() <= 2 || self.width.len() != self.points.len() {
            return;
        }
        let points = &self.points;
        let width = &self.width;
        let deviation = |a: usize, b: usize, i: usize| {
            let (pa, pb, p) = (points[a], points[b], points[i]);
            let pos = p.distance_to_segment(&pa, &pb);
            let chord = pa.distance(&pb);
            let t = if chord > 0.0 {
                ((p - pa).dot(&(pb - pa)) as CoordF / (chord * chord)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let expected = width[a] + (width[b] - width[a]) * t;
            pos.max((width[i] - expected).abs())
        };
        let keep = douglas_peucker_keep(points.len(), deviation, tolerance as CoordF);

        let mut k = keep.iter();
        self.points.retain(|_| k.next().copied().unwrap_or(true));
        let mut k = keep.iter();
        self.width.retain(|_| k.next().copied().unwrap_or(true));
    }

    /// Split at point `index`. Both halves share that point, which becomes
    /// a junction end on each side.
    pub fn split_at(&self, index: usize) -> (ThickPolyline, ThickPolyline) {
        let index = index.min(self.points.len().saturating_sub(1));
        let head = ThickPolyline::from_parts(
            self.points[..=index].to_vec(),
            self.width[..=index].to_vec(),
            (self.endpoints.0, false),
        );
        let tail = ThickPolyline::from_parts(
            self.points[index..].to_vec(),
            self.width[index..].to_vec(),
            (false, self.endpoints.1),
        );
        (head, tail)
    }

    /// Width interpolated at `distance` along the polyline.
    pub fn width_at(&self, mut distance: CoordF) -> CoordF {
        for i in 1..self.points.len() {
            let seg = self.points[i - 1].distance(&self.points[i]);
            if distance <= seg && seg > 0.0 {
                let t = distance / seg;
                return self.width[i - 1] + (self.width[i] - self.width[i - 1]) * t;
            }
            distance -= seg;
        }
        self.width.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ThickPolyline {
        ThickPolyline::from_parts(
            vec![Point::new(0, 0), Point::new(100, 0), Point::new(200, 0)],
            vec![10.0, 20.0, 30.0],
            (true, false),
        )
    }

    #[test]
    fn test_reverse_swaps_endpoints() {
        let mut tp = ramp();
        tp.reverse();
        assert_eq!(tp.first_point(), Point::new(200, 0));
        assert_eq!(tp.width, vec![30.0, 20.0, 10.0]);
        assert_eq!(tp.endpoints, (false, true));
    }

    #[test]
    fn test_thicklines() {
        let lines = ramp().thicklines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].a_width, 20.0);
        assert_eq!(lines[1].b_width, 30.0);
        assert!((lines[0].length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_end_interpolates_width() {
        let mut tp = ramp();
        tp.clip_end(50.0);
        assert_eq!(tp.last_point(), Point::new(150, 0));
        assert!((tp.width[2] - 25.0).abs() < 1e-9);

        let mut tp = ramp();
        tp.clip_end(250.0);
        assert!(tp.is_empty());
        assert!(tp.width.is_empty());
    }

    #[test]
    fn test_simplify_keeps_width_changes() {
        let mut straight = ramp();
        straight.simplify(1);
        assert_eq!(straight.len(), 2);

        let mut bump = ramp();
        bump.width[1] = 80.0;
        bump.simplify(1);
        assert_eq!(bump.len(), 3);
        assert_eq!(bump.width.len(), 3);
    }

    #[test]
    fn test_split_at_marks_junctions() {
        let (a, b) = ramp().split_at(1);
        assert_eq!(a.last_point(), b.first_point());
        assert_eq!(a.endpoints, (true, false));
        assert_eq!(b.endpoints, (false, false));
    }

    #[test]
    fn test_width_at_and_loop() {
        let tp = ramp();
        assert!((tp.width_at(150.0) - 25.0).abs() < 1e-9);
        assert!(!tp.is_loop());
        let mut closed = tp.clone();
        closed.push(Point::new(0, 0), 10.0);
        assert!(closed.is_loop());
    }
}
