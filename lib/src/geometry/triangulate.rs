//! Ear-clipping triangulation of polygons with holes.
//!
//! Malformed regions surface as [`TriangulationError`]. Callers that can
//! tolerate a missing region use [`triangulate_expolygons`], which drops
//! failed regions with a warning instead of aborting the whole layer.

use super::{ExPolygon, Point};
use thiserror::Error;

/// Errors raised while triangulating a region.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TriangulationError {
    #[error("degenerate region: {0}")]
    Degenerate(String),

    #[error("triangulation backend failed: {0}")]
    Backend(String),

    #[error("triangle index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: usize, vertices: usize },
}

pub type TriangulationResult<T> = std::result::Result<T, TriangulationError>;

/// Triangulate one region. Triangles are returned in the orientation the
/// backend produces; vertex positions are the input points.
pub fn triangulate_expolygon(expolygon: &ExPolygon) -> TriangulationResult<Vec<[Point; 3]>> {
    if expolygon.contour.len() < 3 {
        return Err(TriangulationError::Degenerate(format!(
            "contour has {} vertices",
            expolygon.contour.len()
        )));
    }
    if expolygon.area() <= 0.0 {
        return Err(TriangulationError::Degenerate("non-positive area".into()));
    }

    let mut vertices: Vec<Point> = Vec::with_capacity(
        expolygon.contour.len() + expolygon.holes.iter().map(|h| h.len()).sum::<usize>(),
    );
    let mut hole_indices = Vec::with_capacity(expolygon.holes.len());

    vertices.extend_from_slice(expolygon.contour.points());
    for hole in &expolygon.holes {
        if hole.len() < 3 {
            continue;
        }
        hole_indices.push(vertices.len());
        vertices.extend_from_slice(hole.points());
    }

    // Coordinates go in relative to the first vertex to keep f64 precision
    let origin = vertices[0];
    let data: Vec<f64> = vertices
        .iter()
        .flat_map(|p| [(p.x - origin.x) as f64, (p.y - origin.y) as f64])
        .collect();

    let indices = earcutr::earcut(&data, &hole_indices, 2)
        .map_err(|e| TriangulationError::Backend(format!("{e:?}")))?;

    if indices.is_empty() {
        return Err(TriangulationError::Degenerate("no triangles produced".into()));
    }

    let lookup = |index: usize| {
        vertices
            .get(index)
            .copied()
            .ok_or(TriangulationError::IndexOutOfRange {
                index,
                vertices: vertices.len(),
            })
    };

    indices
        .chunks_exact(3)
        .map(|tri| Ok([lookup(tri[0])?, lookup(tri[1])?, lookup(tri[2])?]))
        .collect()
}

/// Triangulate many regions, dropping any that fail.
pub fn triangulate_expolygons(expolygons: &[ExPolygon]) -> Vec<[Point; 3]> {
    let mut triangles = Vec::new();
    for (i, expolygon) in expolygons.iter().enumerate() {
        match triangulate_expolygon(expolygon) {
            Ok(tris) => triangles.extend(tris),
            Err(e) => log::warn!("Dropping region {} from triangulation: {}", i, e),
        }
    }
    triangles
}

/// Unsigned area of a triangle in scaled units squared.
pub fn triangle_area(tri: &[Point; 3]) -> f64 {
    ((tri[1] - tri[0]).cross(&(tri[2] - tri[0])) as f64).abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::scale;

    #[test]
    fn test_square_two_triangles() {
        let square = ExPolygon::new(Polygon::rectangle(
            Point::new(0, 0),
            Point::new(scale(1.0), scale(1.0)),
        ));
        let tris = square.triangulate().unwrap();
        assert_eq!(tris.len(), 2);
        let total: f64 = tris.iter().map(triangle_area).sum();
        assert!((total - square.area()).abs() < 1.0);
    }

    #[test]
    fn test_frame_area_preserved() {
        let outer = Polygon::rectangle(Point::new(0, 0), Point::new_scale(10.0, 10.0));
        let mut hole = Polygon::rectangle(Point::new_scale(3.0, 3.0), Point::new_scale(7.0, 7.0));
        hole.make_clockwise();
        let frame = ExPolygon::with_holes(outer, vec![hole]);
        let tris = frame.triangulate().unwrap();
        let total: f64 = tris.iter().map(triangle_area).sum();
        assert!((total - frame.area()).abs() / frame.area() < 1e-9);
    }

    #[test]
    fn test_degenerate_is_error() {
        let line = ExPolygon::new(Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(200, 0),
        ]));
        assert!(matches!(line.triangulate(), Err(TriangulationError::Degenerate(_))));
    }

    #[test]
    fn test_failed_regions_are_dropped() {
        let good = ExPolygon::new(Polygon::rectangle(Point::new(0, 0), Point::new(1000, 1000)));
        let bad = ExPolygon::new(Polygon::from_points(vec![Point::new(0, 0), Point::new(1, 1)]));
        let tris = triangulate_expolygons(&[bad, good]);
        assert_eq!(tris.len(), 2);
    }
}
