//! Extrusion entities.
//!
//! The output side of the crate: what gets printed and in which role.
//! [`ExtrusionEntity`] is a closed set of variants (paths, non-planar paths,
//! multi-paths, loops and collections). New consumers are added as
//! [`ExtrusionVisitorConst`] / [`ExtrusionVisitor`] implementations rather
//! than new variants.
//!
//! [`variable_width`] converts medial-axis centerlines into these entities.

mod collection;
mod entity;
mod extrusion_loop;
mod multi_path;
mod path;
mod role;
mod variable_width;

pub use collection::ExtrusionEntityCollection;
pub use entity::{
    ExtrusionEntity, ExtrusionVisitor, ExtrusionVisitorConst, PolylineCollector, RoleLengthAnalyzer, WidthScaler,
};
pub use extrusion_loop::ExtrusionLoop;
pub use multi_path::{ExtrusionMultiPath, ExtrusionMultiPath3D};
pub use path::{ExtrusionPath, ExtrusionPath3D};
pub use role::{ExtrusionLoopRole, ExtrusionRole};
pub use variable_width::{discretize, variable_width};

use crate::geometry::Point;

pub type ExtrusionEntities = Vec<ExtrusionEntity>;

/// Errors from operating on extrusion entities.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtrusionError {
    #[error("a {0} cannot be reversed")]
    Irreversible(&'static str),

    #[error("path {index} starts at {found}, previous one ends at {expected}")]
    Discontinuous {
        index: usize,
        expected: Point,
        found: Point,
    },

    #[error("loop starts at {first} but ends at {last}")]
    NotClosed { first: Point, last: Point },

    #[error("{points} points but {offsets} z offsets")]
    ZOffsetMismatch { points: usize, offsets: usize },
}
