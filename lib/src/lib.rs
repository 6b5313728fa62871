//! # Medial Slicer
//!
//! Thin-wall and gap-fill toolpath extraction for 3D printing.
//!
//! This library turns 2D cross-sections into variable-width extrusion paths:
//! - Polygon / ExPolygon data model with scaled integer coordinates
//! - Extrusion flow model (width, height, spacing, volumetric rate)
//! - Voronoi-based medial-axis extraction with fusion, pruning, extension and tapering
//! - Variable-width discretization into fixed-width extrusion paths
//! - Extrusion entity hierarchy (paths, loops, collections) with visitors
//!
//! ## Example
//!
//! ```rust,ignore
//! use medial_slicer::{ExPolygon, MedialAxis, MedialAxisParams, Flow, ExtrusionRole};
//! use medial_slicer::extrusion::variable_width;
//!
//! let flow = Flow::new(0.45, 0.2, 0.4)?;
//! let params = MedialAxisParams::from_flow(&flow, 0.2, 1.2);
//! let polylines = MedialAxis::new(&slice, &slice, params).build();
//! let entities = variable_width(&polylines, ExtrusionRole::ThinWall, &flow);
//! ```

// Core modules
pub mod clipper;
pub mod config;
pub mod extrusion;
pub mod flow;
pub mod geometry;
pub mod medial_axis;
pub mod perimeter;

// Re-export commonly used types
pub use config::{ExtrusionWidth, FlowConfig, ThinWallConfig};
pub use flow::{Flow, FlowError, FlowResult, FlowRole, BRIDGE_EXTRA_SPACING};
pub use geometry::{
    BoundingBox, ExPolygon, ExPolygons, Line, Point, PointF, Polygon, Polygons, Polyline,
    Polylines, ThickLine, ThickPolyline, ThickPolylines, TriangulationError,
};

// Re-export extrusion entities
pub use extrusion::{
    variable_width, ExtrusionEntity, ExtrusionEntityCollection, ExtrusionError, ExtrusionLoop,
    ExtrusionLoopRole, ExtrusionMultiPath, ExtrusionMultiPath3D, ExtrusionPath, ExtrusionPath3D,
    ExtrusionRole, ExtrusionVisitor, ExtrusionVisitorConst,
};

// Re-export the medial-axis engine
pub use medial_axis::{MedialAxis, MedialAxisParams};

// Re-export clipper operations
pub use clipper::{
    difference, intersection, offset_expolygon, offset_expolygons, opening, union_ex,
    OffsetJoinType,
};

// Re-export thin feature generation
pub use perimeter::{ThinFeatureGenerator, ThinFeatureResult};

/// Coordinate type used throughout the slicer.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Millimetre-space comparison tolerance.
pub const EPSILON: f64 = 1e-4;

/// Scaled-space tolerance (100 units = 0.1 µm).
pub const SCALED_EPSILON: Coord = 100;

/// Geometric resolution used when simplifying medial-axis output (0.0125 mm).
pub const SCALED_RESOLUTION: Coord = 12_500;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Scale a floating-point coordinate to integer (same as scale, for compatibility).
#[inline]
pub fn scaled(v: CoordF) -> Coord {
    scale(v)
}

/// Unscale an integer coordinate to floating-point (same as unscale, for compatibility).
#[inline]
pub fn unscaled(v: Coord) -> CoordF {
    unscale(v)
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for crate operations.
///
/// Degenerate geometry is not an error: the engine returns empty or partial
/// results for it. These variants cover caller mistakes and backend failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Triangulation error: {0}")]
    Triangulation(#[from] TriangulationError),

    #[error("Extrusion error: {0}")]
    Extrusion(#[from] ExtrusionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        // 1mm should scale to 1_000_000
        assert_eq!(scale(1.0), 1_000_000);

        // And back
        assert!((unscale(1_000_000) - 1.0).abs() < 1e-10);

        // Test sub-millimeter precision
        assert_eq!(scale(0.001), 1_000); // 1 micron
        assert_eq!(scale(0.0001), SCALED_EPSILON);
        assert_eq!(scale(0.0125), SCALED_RESOLUTION);
    }

    #[test]
    fn test_error_conversions() {
        let err: Error = FlowError::InvalidHeight(0.0).into();
        assert!(err.to_string().contains("Flow error"));
        let err: Error = TriangulationError::Degenerate("x".into()).into();
        assert!(matches!(err, Error::Triangulation(_)));
    }
}
