//! Geometry primitives for the medial-axis engine.
//!
//! This module provides the 2D types everything else is built on:
//! - [`Point`] - 2D point with integer coordinates (scaled), [`PointF`] for floating-point vectors
//! - [`Line`] - Line segment between two points
//! - [`Polygon`] - Closed polygon (boundary)
//! - [`Polyline`] - Open polyline (path)
//! - [`ThickPolyline`] - Polyline with a width per point
//! - [`ExPolygon`] - Polygon with holes (exterior + interior contours)
//! - [`BoundingBox`] - Axis-aligned bounding box
//!
//! ## Coordinate System
//!
//! Coordinates are scaled integers to avoid floating-point drift in boolean operations.
//! They are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` / `scaled()` to convert from mm to internal units
//! - Use `unscale()` / `unscaled()` to convert from internal units to mm

mod bounding_box;
mod expolygon;
mod line;
mod point;
mod polygon;
mod polyline;
pub mod simplify;
mod thick_polyline;
pub mod triangulate;

pub use bounding_box::BoundingBox;
pub use expolygon::{ExPolygon, ExPolygons};
pub use line::{Line, Lines};
pub use point::{Point, PointF, Points};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};
pub use simplify::{
    douglas_peucker, douglas_peucker_keep, douglas_peucker_polygon, remove_collinear_points,
    remove_duplicate_points,
};
pub use thick_polyline::{ThickLine, ThickPolyline, ThickPolylines};
pub use triangulate::{
    triangle_area, triangulate_expolygon, triangulate_expolygons, TriangulationError,
    TriangulationResult,
};

/// Orientation of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise (left turn)
    CounterClockwise,
    /// Clockwise (right turn)
    Clockwise,
    /// Collinear (no turn)
    Collinear,
}

/// Determine the orientation of three points with an exact predicate.
pub fn orientation(p1: Point, p2: Point, p3: Point) -> Orientation {
    let det = robust::orient2d(
        robust::Coord {
            x: p1.x as f64,
            y: p1.y as f64,
        },
        robust::Coord {
            x: p2.x as f64,
            y: p2.y as f64,
        },
        robust::Coord {
            x: p3.x as f64,
            y: p3.y as f64,
        },
    );
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        let p1 = Point::new(0, 0);
        let p2 = Point::new(1, 0);
        let p3 = Point::new(1, 1);
        assert_eq!(orientation(p1, p2, p3), Orientation::CounterClockwise);

        let p4 = Point::new(1, -1);
        assert_eq!(orientation(p1, p2, p4), Orientation::Clockwise);

        let p5 = Point::new(2, 0);
        assert_eq!(orientation(p1, p2, p5), Orientation::Collinear);
    }
}
