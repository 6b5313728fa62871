//! Axis-aligned bounding box in scaled coordinates.

use super::Point;
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// An empty box (`defined == false`) absorbs the first point merged into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    pub defined: bool,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::default();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    /// Half the diagonal length, in scaled units.
    pub fn radius(&self) -> CoordF {
        self.size().length() / 2.0
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.defined
            && other.defined
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the box by `delta` on every side.
    pub fn inflated(&self, delta: Coord) -> Self {
        Self {
            min: Point::new(self.min.x - delta, self.min.y - delta),
            max: Point::new(self.max.x + delta, self.max.y + delta),
            defined: self.defined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bb = BoundingBox::from_points(&[Point::new(5, -2), Point::new(-1, 7), Point::new(3, 3)]);
        assert!(bb.defined);
        assert_eq!(bb.min, Point::new(-1, -2));
        assert_eq!(bb.max, Point::new(5, 7));
        assert_eq!(bb.center(), Point::new(2, 2));
    }

    #[test]
    fn test_empty_box_contains_nothing() {
        let bb = BoundingBox::default();
        assert!(!bb.contains(&Point::zero()));
        assert!(!BoundingBox::from_points(&[]).defined);
    }

    #[test]
    fn test_overlap_and_inflate() {
        let a = BoundingBox::new(Point::new(0, 0), Point::new(10, 10));
        let b = BoundingBox::new(Point::new(12, 0), Point::new(20, 10));
        assert!(!a.overlaps(&b));
        assert!(a.inflated(2).overlaps(&b));
    }
}
