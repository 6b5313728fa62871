//! Line segment type.

use super::{Point, PointF};
use crate::{unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

/// Type alias for a collection of lines.
pub type Lines = Vec<Line>;

impl Line {
    /// Create a new line segment from two points.
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Create a line from scaled coordinates.
    #[inline]
    pub const fn from_coords(ax: Coord, ay: Coord, bx: Coord, by: Coord) -> Self {
        Self {
            a: Point::new(ax, ay),
            b: Point::new(bx, by),
        }
    }

    /// Get the direction vector (b - a).
    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    /// Get the direction vector as floating-point.
    #[inline]
    pub fn direction_f(&self) -> PointF {
        self.b.to_f64() - self.a.to_f64()
    }

    /// Unit direction vector; zero for a degenerate segment.
    #[inline]
    pub fn unit_direction(&self) -> PointF {
        self.direction_f().normalize()
    }

    /// Get the midpoint of the line segment.
    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new((self.a.x + self.b.x) / 2, (self.a.y + self.b.y) / 2)
    }

    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.a.distance_squared(&self.b)
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    #[inline]
    pub fn reverse(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Calculate the distance from a point to this line segment.
    pub fn distance_to_point(&self, p: &Point) -> CoordF {
        p.distance_to_segment(&self.a, &self.b)
    }

    /// Check if a point lies on this line segment (within tolerance).
    pub fn contains_point(&self, p: &Point, tolerance: Coord) -> bool {
        self.distance_to_point(p) <= tolerance as CoordF
    }

    /// Calculate the intersection point of two line segments.
    /// Returns None if the segments don't intersect or are parallel.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let d1 = self.direction();
        let d2 = other.direction();

        let cross = d1.cross(&d2);
        if cross == 0 {
            return None;
        }

        let diff = other.a - self.a;
        let t = diff.cross(&d2) as CoordF / cross as CoordF;
        let u = diff.cross(&d1) as CoordF / cross as CoordF;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(Point::new(
                (self.a.x as CoordF + t * d1.x as CoordF).round() as Coord,
                (self.a.y as CoordF + t * d1.y as CoordF).round() as Coord,
            ))
        } else {
            None
        }
    }

    /// Angle of the segment direction in radians, in `(-π, π]`.
    #[inline]
    pub fn angle(&self) -> CoordF {
        let dir = self.direction();
        (dir.y as CoordF).atan2(dir.x as CoordF)
    }

    /// Angle of the segment direction in radians, in `[0, 2π)`.
    pub fn orientation(&self) -> CoordF {
        let angle = self.angle();
        if angle < 0.0 {
            angle + 2.0 * std::f64::consts::PI
        } else {
            angle
        }
    }

    /// Move `b` further along the segment direction by `distance`.
    pub fn extend_end(&mut self, distance: CoordF) {
        let dir = self.unit_direction();
        self.b = Point::new(
            (self.b.x as CoordF + dir.x * distance).round() as Coord,
            (self.b.y as CoordF + dir.y * distance).round() as Coord,
        );
    }

    /// Move `a` backwards along the segment direction by `distance`.
    pub fn extend_start(&mut self, distance: CoordF) {
        let dir = self.unit_direction();
        self.a = Point::new(
            (self.a.x as CoordF - dir.x * distance).round() as Coord,
            (self.a.y as CoordF - dir.y * distance).round() as Coord,
        );
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({:.6}, {:.6}) -> ({:.6}, {:.6})]",
            unscale(self.a.x),
            unscale(self.a.y),
            unscale(self.b.x),
            unscale(self.b.y)
        )
    }
}

impl From<(Point, Point)> for Line {
    #[inline]
    fn from((a, b): (Point, Point)) -> Self {
        Self { a, b }
    }
}
