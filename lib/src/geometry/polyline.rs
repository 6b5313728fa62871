//! Polyline type for open paths.

use super::simplify::douglas_peucker;
use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// An open polyline defined by a sequence of points.
///
/// Unlike a Polygon, a Polyline is not implicitly closed - it's a path from
/// the first point to the last point. A closed path repeats its first point.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

pub type Polylines = Vec<Polyline>;

impl Polyline {
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
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

    /// Add a point, skipping exact repeats of the current last point.
    #[inline]
    pub fn push(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Get the first point, panicking if empty.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Get the last point, panicking if empty.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Get all edges of the polyline.
    pub fn lines(&self) -> Vec<Line> {
        self.points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]))
            .collect()
    }

    /// Calculate the total length of the polyline.
    pub fn length(&self) -> CoordF {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Check if this polyline is closed (first point equals last point).
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Simplify with Douglas-Peucker at the given tolerance (scaled units).
    pub fn simplify(&mut self, tolerance: Coord) {
        if self.points.len() > 2 {
            self.points = douglas_peucker(&self.points, tolerance);
        }
    }

    /// Append another polyline, dropping its first point when it repeats our last.
    pub fn append(&mut self, other: &Polyline) {
        let skip = usize::from(!self.points.is_empty() && other.points.first() == self.points.last());
        self.points.extend_from_slice(&other.points[skip..]);
    }

    /// Clip the polyline to a given length from the start.
    pub fn clip_start(&mut self, distance: CoordF) {
        if distance <= 0.0 || self.points.len() < 2 {
            return;
        }

        let mut remaining = distance;
        for i in 0..(self.points.len() - 1) {
            let edge_len = self.points[i].distance(&self.points[i + 1]);
            if remaining < edge_len {
                let new_point = self.points[i].interpolate(remaining / edge_len, &self.points[i + 1]);
                self.points.drain(..=i);
                self.points.insert(0, new_point);
                return;
            }
            remaining -= edge_len;
        }

        // Entire polyline is shorter than distance
        self.points.clear();
    }

    /// Clip the polyline to a given length from the end.
    pub fn clip_end(&mut self, distance: CoordF) {
        self.reverse();
        self.clip_start(distance);
        self.reverse();
    }

    /// Split at point index `index`; both halves share that point.
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        if index == 0 {
            return (Self::new(), self.clone());
        }
        if index >= self.points.len() {
            return (self.clone(), Self::new());
        }
        (
            Self::from_points(self.points[..=index].to_vec()),
            Self::from_points(self.points[index..].to_vec()),
        )
    }

    /// Check if the polyline is valid (has at least 2 points).
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({:?})", self.points)
    }
}

impl Deref for Polyline {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl IntoIterator for Polyline {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polyline {
        Polyline::from_points(vec![Point::new(0, 0), Point::new(100, 0), Point::new(100, 100)])
    }

    #[test]
    fn test_polyline_length() {
        assert!((l_shape().length() - 200.0).abs() < 1e-9);
        assert_eq!(l_shape().lines().len(), 2);
    }

    #[test]
    fn test_push_skips_repeats() {
        let mut pl = Polyline::new();
        pl.push(Point::new(1, 1));
        pl.push(Point::new(1, 1));
        pl.push(Point::new(2, 1));
        assert_eq!(pl.len(), 2);
    }

    #[test]
    fn test_clip_start_and_end() {
        let mut pl = l_shape();
        pl.clip_start(50.0);
        assert_eq!(pl.first_point(), Point::new(50, 0));
        assert!((pl.length() - 150.0).abs() < 1e-9);

        let mut pl = l_shape();
        pl.clip_end(150.0);
        assert_eq!(pl.points(), &[Point::new(0, 0), Point::new(50, 0)]);

        let mut pl = l_shape();
        pl.clip_end(500.0);
        assert!(pl.is_empty());
    }

    #[test]
    fn test_append_shared_point() {
        let mut a = Polyline::from_points(vec![Point::new(0, 0), Point::new(10, 0)]);
        let b = Polyline::from_points(vec![Point::new(10, 0), Point::new(10, 10)]);
        a.append(&b);
        assert_eq!(a.len(), 3);
        assert!(!a.is_closed());
    }

    #[test]
    fn test_split_at() {
        let (a, b) = l_shape().split_at(1);
        assert_eq!(a.last_point(), b.first_point());
        assert_eq!(a.len() + b.len(), 4);
    }

    #[test]
    fn test_simplify_collinear() {
        let mut pl = Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(50, 1),
            Point::new(100, 0),
        ]);
        pl.simplify(5);
        assert_eq!(pl.len(), 2);
    }
}
