//! 2D point types.
//!
//! [`Point`] carries scaled integer coordinates (see [`crate::SCALING_FACTOR`]),
//! [`PointF`] carries floating-point coordinates and is used for direction
//! vectors and intermediate results that must not be rounded.

use crate::{scale, unscale, Coord, CoordF, SCALED_EPSILON};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D point with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

pub type Points = Vec<Point>;

impl Point {
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a point from millimetre coordinates.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self::new(scale(x), scale(y))
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Round a floating-point position (already in scaled units) to a point.
    #[inline]
    pub fn from_f64(p: PointF) -> Self {
        Self::new(p.x.round() as Coord, p.y.round() as Coord)
    }

    #[inline]
    pub fn to_f64(&self) -> PointF {
        PointF::new(self.x as CoordF, self.y as CoordF)
    }

    /// Unscaled (millimetre) coordinates.
    #[inline]
    pub fn to_mm(&self) -> (CoordF, CoordF) {
        (unscale(self.x), unscale(self.y))
    }

    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.x as i128 * self.x as i128 + self.y as i128 * self.y as i128
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        (self.length_squared() as CoordF).sqrt()
    }

    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        (*other - *self).length_squared()
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    #[inline]
    pub fn rotate_90_ccw(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Rotate around the origin by `angle` radians.
    pub fn rotate(&self, angle: CoordF) -> Point {
        let (s, c) = angle.sin_cos();
        let x = self.x as CoordF;
        let y = self.y as CoordF;
        Point::new((c * x - s * y).round() as Coord, (s * x + c * y).round() as Coord)
    }

    /// Rotate around `center` by `angle` radians.
    pub fn rotate_around(&self, angle: CoordF, center: &Point) -> Point {
        (*self - *center).rotate(angle) + *center
    }

    /// Closest point to `self` on the segment `[a, b]`.
    pub fn project_onto_segment(&self, a: Point, b: Point) -> Point {
        let ab = b - a;
        let len_sq = ab.length_squared();
        if len_sq == 0 {
            return a;
        }
        let t = (*self - a).dot(&ab) as CoordF / len_sq as CoordF;
        if t <= 0.0 {
            a
        } else if t >= 1.0 {
            b
        } else {
            Point::new(
                (a.x as CoordF + t * ab.x as CoordF).round() as Coord,
                (a.y as CoordF + t * ab.y as CoordF).round() as Coord,
            )
        }
    }

    /// Distance to the segment `[a, b]` without rounding the projection.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> CoordF {
        self.to_f64().distance_to_segment(&a.to_f64(), &b.to_f64())
    }

    /// True when both coordinates differ by at most `tolerance`.
    #[inline]
    pub fn coincides_with(&self, other: &Point, tolerance: Coord) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    #[inline]
    pub fn coincides_with_epsilon(&self, other: &Point) -> bool {
        self.coincides_with(other, SCALED_EPSILON)
    }

    /// Point at parameter `t` along `self -> other`.
    #[inline]
    pub fn interpolate(&self, t: CoordF, other: &Point) -> Point {
        Point::new(
            (self.x as CoordF + (other.x - self.x) as CoordF * t).round() as Coord,
            (self.y as CoordF + (other.y - self.y) as CoordF * t).round() as Coord,
        )
    }

    /// Counter-clockwise angle in `(0, 2π]` swept from `p1` to `p2` around `self`.
    pub fn ccw_angle(&self, p1: &Point, p2: &Point) -> CoordF {
        let a1 = ((p1.y - self.y) as CoordF).atan2((p1.x - self.x) as CoordF);
        let a2 = ((p2.y - self.y) as CoordF).atan2((p2.x - self.x) as CoordF);
        let angle = a2 - a1;
        if angle <= 0.0 {
            angle + 2.0 * std::f64::consts::PI
        } else {
            angle
        }
    }

    /// Index of the nearest point in `points`.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        points
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| self.distance_squared(p))
            .map(|(i, _)| i)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<CoordF> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: CoordF) -> Point {
        Point::new(
            (self.x as CoordF * rhs).round() as Coord,
            (self.y as CoordF * rhs).round() as Coord,
        )
    }
}

impl From<(Coord, Coord)> for Point {
    fn from((x, y): (Coord, Coord)) -> Self {
        Point::new(x, y)
    }
}

/// A 2D point or vector with floating-point coordinates.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: CoordF,
    pub y: CoordF,
}

impl PointF {
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(&self, other: &PointF) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn cross(&self, other: &PointF) -> CoordF {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn perp(&self) -> PointF {
        PointF::new(-self.y, self.x)
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(&self) -> PointF {
        let len = self.length();
        if len <= CoordF::EPSILON {
            PointF::default()
        } else {
            PointF::new(self.x / len, self.y / len)
        }
    }

    #[inline]
    pub fn distance(&self, other: &PointF) -> CoordF {
        (*other - *self).length()
    }

    pub fn distance_to_segment(&self, a: &PointF, b: &PointF) -> CoordF {
        let ab = *b - *a;
        let len_sq = ab.length_squared();
        if len_sq <= 0.0 {
            return self.distance(a);
        }
        let t = ((*self - *a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        self.distance(&PointF::new(a.x + ab.x * t, a.y + ab.y * t))
    }

    #[inline]
    pub fn scale_by(&self, factor: CoordF) -> PointF {
        PointF::new(self.x * factor, self.y * factor)
    }
}

impl fmt::Debug for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl Add for PointF {
    type Output = PointF;
    #[inline]
    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;
    #[inline]
    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<CoordF> for PointF {
    type Output = PointF;
    #[inline]
    fn mul(self, rhs: CoordF) -> PointF {
        self.scale_by(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(10, 20);
        let b = Point::new(3, 4);
        assert_eq!(a + b, Point::new(13, 24));
        assert_eq!(a - b, Point::new(7, 16));
        assert_eq!(b * 2.0, Point::new(6, 8));
        assert_eq!(-b, Point::new(-3, -4));
    }

    #[test]
    fn test_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance_squared(&b), 25);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_onto_segment_clamps() {
        let p = Point::new(-5, 5);
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        assert_eq!(p.project_onto_segment(a, b), a);
        assert_eq!(Point::new(5, 7).project_onto_segment(a, b), Point::new(5, 0));
        assert!((Point::new(5, 7).distance_to_segment(&a, &b) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_ccw_angle() {
        let o = Point::new(0, 0);
        let east = Point::new(10, 0);
        let north = Point::new(0, 10);
        assert!((o.ccw_angle(&east, &north) - PI / 2.0).abs() < 1e-9);
        assert!((o.ccw_angle(&north, &east) - 3.0 * PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_and_coincide() {
        let a = Point::new(0, 0);
        let b = Point::new(1000, 2000);
        assert_eq!(a.interpolate(0.5, &b), Point::new(500, 1000));
        assert!(a.coincides_with_epsilon(&Point::new(SCALED_EPSILON, -SCALED_EPSILON)));
        assert!(!a.coincides_with_epsilon(&Point::new(SCALED_EPSILON + 1, 0)));
    }

    #[test]
    fn test_pointf_normalize_zero() {
        assert_eq!(PointF::default().normalize(), PointF::default());
        let n = PointF::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
