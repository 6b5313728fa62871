//! Chains of paths printed in one continuous move.

use super::{ExtrusionError, ExtrusionPath, ExtrusionPath3D, ExtrusionRole};
use crate::geometry::{Point, Polygons, Polyline, Polylines};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Check that each path starts where the previous one ended.
fn check_contiguous<I>(ends: I) -> Result<(), ExtrusionError>
where
    I: IntoIterator<Item = (Option<Point>, Option<Point>)>,
{
    let mut previous_last: Option<Point> = None;
    for (index, (first, last)) in ends.into_iter().enumerate() {
        if let (Some(expected), Some(found)) = (previous_last, first) {
            if expected != found {
                return Err(ExtrusionError::Discontinuous {
                    index,
                    expected,
                    found,
                });
            }
        }
        previous_last = last;
    }
    Ok(())
}

/// Paths of possibly different widths, each starting where the previous
/// one ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionMultiPath {
    pub paths: Vec<ExtrusionPath>,
}

impl ExtrusionMultiPath {
    pub fn new(paths: Vec<ExtrusionPath>) -> Self {
        Self { paths }
    }

    pub fn push(&mut self, path: ExtrusionPath) {
        self.paths.push(path);
    }

    pub fn validate(&self) -> Result<(), ExtrusionError> {
        check_contiguous(self.paths.iter().map(|p| (p.first_point(), p.last_point())))
    }

    pub fn role(&self) -> ExtrusionRole {
        self.paths
            .iter()
            .fold(ExtrusionRole::None, |acc, p| ExtrusionRole::mixed_of(acc, p.role))
    }

    pub fn first_point(&self) -> Option<Point> {
        self.paths.first().and_then(ExtrusionPath::first_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.paths.last().and_then(ExtrusionPath::last_point)
    }

    pub fn length(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath::length).sum()
    }

    pub fn total_volume(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath::total_volume).sum()
    }

    pub fn reverse(&mut self) {
        for path in &mut self.paths {
            path.reverse();
        }
        self.paths.reverse();
    }

    /// All paths joined into one polyline.
    pub fn as_polyline(&self) -> Polyline {
        let mut out = Polyline::new();
        for path in &self.paths {
            out.append(&path.polyline);
        }
        out
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.polygons_covered_by_width(out, scaled_epsilon);
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.polygons_covered_by_spacing(out, scaled_epsilon);
        }
    }

    pub fn collect_polylines(&self, out: &mut Polylines) {
        let polyline = self.as_polyline();
        if !polyline.is_empty() {
            out.push(polyline);
        }
    }
}

/// Non-planar counterpart of [`ExtrusionMultiPath`]. Direction is fixed by
/// the z profile, so it cannot be reversed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionMultiPath3D {
    pub paths: Vec<ExtrusionPath3D>,
}

impl ExtrusionMultiPath3D {
    pub fn new(paths: Vec<ExtrusionPath3D>) -> Self {
        Self { paths }
    }

    pub fn push(&mut self, path: ExtrusionPath3D) {
        self.paths.push(path);
    }

    pub fn validate(&self) -> Result<(), ExtrusionError> {
        check_contiguous(self.paths.iter().map(|p| (p.first_point(), p.last_point())))
    }

    pub fn role(&self) -> ExtrusionRole {
        self.paths
            .iter()
            .fold(ExtrusionRole::None, |acc, p| ExtrusionRole::mixed_of(acc, p.role()))
    }

    pub fn first_point(&self) -> Option<Point> {
        self.paths.first().and_then(ExtrusionPath3D::first_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.paths.last().and_then(ExtrusionPath3D::last_point)
    }

    pub fn length(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath3D::length).sum()
    }

    pub fn total_volume(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath3D::total_volume).sum()
    }

    pub fn as_polyline(&self) -> Polyline {
        let mut out = Polyline::new();
        for path in &self.paths {
            out.append(&path.path.polyline);
        }
        out
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.path.polygons_covered_by_width(out, scaled_epsilon);
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.path.polygons_covered_by_spacing(out, scaled_epsilon);
        }
    }
}
