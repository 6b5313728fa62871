//! The closed set of extrusion entity variants and their visitors.

use super::{
    ExtrusionEntityCollection, ExtrusionError, ExtrusionLoop, ExtrusionMultiPath, ExtrusionMultiPath3D,
    ExtrusionPath, ExtrusionPath3D, ExtrusionRole,
};
use crate::geometry::{Point, Polygons, Polyline, Polylines};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Anything that can be extruded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtrusionEntity {
    Path(ExtrusionPath),
    Path3D(ExtrusionPath3D),
    MultiPath(ExtrusionMultiPath),
    MultiPath3D(ExtrusionMultiPath3D),
    Loop(ExtrusionLoop),
    Collection(ExtrusionEntityCollection),
}

impl ExtrusionEntity {
    pub fn role(&self) -> ExtrusionRole {
        match self {
            ExtrusionEntity::Path(p) => p.role,
            ExtrusionEntity::Path3D(p) => p.role(),
            ExtrusionEntity::MultiPath(p) => p.role(),
            ExtrusionEntity::MultiPath3D(p) => p.role(),
            ExtrusionEntity::Loop(l) => l.role(),
            ExtrusionEntity::Collection(c) => c.role(),
        }
    }

    pub fn first_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(p) => p.first_point(),
            ExtrusionEntity::Path3D(p) => p.first_point(),
            ExtrusionEntity::MultiPath(p) => p.first_point(),
            ExtrusionEntity::MultiPath3D(p) => p.first_point(),
            ExtrusionEntity::Loop(l) => l.first_point(),
            ExtrusionEntity::Collection(c) => c.first_point(),
        }
    }

    pub fn last_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(p) => p.last_point(),
            ExtrusionEntity::Path3D(p) => p.last_point(),
            ExtrusionEntity::MultiPath(p) => p.last_point(),
            ExtrusionEntity::MultiPath3D(p) => p.last_point(),
            ExtrusionEntity::Loop(l) => l.last_point(),
            ExtrusionEntity::Collection(c) => c.last_point(),
        }
    }

    /// Length in scaled units.
    pub fn length(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(p) => p.length(),
            ExtrusionEntity::Path3D(p) => p.length(),
            ExtrusionEntity::MultiPath(p) => p.length(),
            ExtrusionEntity::MultiPath3D(p) => p.length(),
            ExtrusionEntity::Loop(l) => l.length(),
            ExtrusionEntity::Collection(c) => c.length(),
        }
    }

    /// Extruded volume in mm³.
    pub fn total_volume(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(p) => p.total_volume(),
            ExtrusionEntity::Path3D(p) => p.total_volume(),
            ExtrusionEntity::MultiPath(p) => p.total_volume(),
            ExtrusionEntity::MultiPath3D(p) => p.total_volume(),
            ExtrusionEntity::Loop(l) => l.total_volume(),
            ExtrusionEntity::Collection(c) => c.total_volume(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, ExtrusionEntity::Loop(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ExtrusionEntity::Collection(_))
    }

    /// Whether printing in the opposite direction is allowed.
    pub fn can_reverse(&self) -> bool {
        match self {
            ExtrusionEntity::Path(_) | ExtrusionEntity::MultiPath(_) => true,
            ExtrusionEntity::Path3D(_) | ExtrusionEntity::MultiPath3D(_) | ExtrusionEntity::Loop(_) => false,
            ExtrusionEntity::Collection(c) => c.can_reverse(),
        }
    }

    /// Reverse the print direction. Non-planar paths and loops have a
    /// meaningful direction and refuse.
    pub fn reverse(&mut self) -> Result<(), ExtrusionError> {
        match self {
            ExtrusionEntity::Path(p) => {
                p.reverse();
                Ok(())
            }
            ExtrusionEntity::MultiPath(p) => {
                p.reverse();
                Ok(())
            }
            ExtrusionEntity::Path3D(_) => Err(ExtrusionError::Irreversible("3D path")),
            ExtrusionEntity::MultiPath3D(_) => Err(ExtrusionError::Irreversible("3D multi-path")),
            ExtrusionEntity::Loop(_) => Err(ExtrusionError::Irreversible("loop")),
            ExtrusionEntity::Collection(c) => c.reverse(),
        }
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        match self {
            ExtrusionEntity::Path(p) => p.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::Path3D(p) => p.path.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::MultiPath(p) => p.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::MultiPath3D(p) => p.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::Loop(l) => l.polygons_covered_by_width(out, scaled_epsilon),
            ExtrusionEntity::Collection(c) => c.polygons_covered_by_width(out, scaled_epsilon),
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        match self {
            ExtrusionEntity::Path(p) => p.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::Path3D(p) => p.path.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::MultiPath(p) => p.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::MultiPath3D(p) => p.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::Loop(l) => l.polygons_covered_by_spacing(out, scaled_epsilon),
            ExtrusionEntity::Collection(c) => c.polygons_covered_by_spacing(out, scaled_epsilon),
        }
    }

    /// The centerline as one polyline. Collections concatenate their
    /// children in order.
    pub fn as_polyline(&self) -> Polyline {
        match self {
            ExtrusionEntity::Path(p) => p.polyline.clone(),
            ExtrusionEntity::Path3D(p) => p.path.polyline.clone(),
            ExtrusionEntity::MultiPath(p) => p.as_polyline(),
            ExtrusionEntity::MultiPath3D(p) => p.as_polyline(),
            ExtrusionEntity::Loop(l) => l.as_polyline(),
            ExtrusionEntity::Collection(c) => {
                let mut out = Polyline::new();
                for polyline in c.collect_polylines_vec() {
                    out.append(&polyline);
                }
                out
            }
        }
    }

    pub fn collect_polylines(&self, out: &mut Polylines) {
        let mut collector = PolylineCollector::default();
        self.visit(&mut collector);
        out.extend(collector.polylines);
    }

    /// Dispatch to the read-only visitor method for this variant.
    pub fn visit<V: ExtrusionVisitorConst + ?Sized>(&self, visitor: &mut V) {
        match self {
            ExtrusionEntity::Path(p) => visitor.visit_path(p),
            ExtrusionEntity::Path3D(p) => visitor.visit_path_3d(p),
            ExtrusionEntity::MultiPath(p) => visitor.visit_multi_path(p),
            ExtrusionEntity::MultiPath3D(p) => visitor.visit_multi_path_3d(p),
            ExtrusionEntity::Loop(l) => visitor.visit_loop(l),
            ExtrusionEntity::Collection(c) => visitor.visit_collection(c),
        }
    }

    /// Dispatch to the mutating visitor method for this variant.
    pub fn visit_mut<V: ExtrusionVisitor + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            ExtrusionEntity::Path(p) => visitor.visit_path(p),
            ExtrusionEntity::Path3D(p) => visitor.visit_path_3d(p),
            ExtrusionEntity::MultiPath(p) => visitor.visit_multi_path(p),
            ExtrusionEntity::MultiPath3D(p) => visitor.visit_multi_path_3d(p),
            ExtrusionEntity::Loop(l) => visitor.visit_loop(l),
            ExtrusionEntity::Collection(c) => visitor.visit_collection(c),
        }
    }
}

impl From<ExtrusionPath> for ExtrusionEntity {
    fn from(path: ExtrusionPath) -> Self {
        ExtrusionEntity::Path(path)
    }
}

impl From<ExtrusionPath3D> for ExtrusionEntity {
    fn from(path: ExtrusionPath3D) -> Self {
        ExtrusionEntity::Path3D(path)
    }
}

impl From<ExtrusionMultiPath> for ExtrusionEntity {
    fn from(path: ExtrusionMultiPath) -> Self {
        ExtrusionEntity::MultiPath(path)
    }
}

impl From<ExtrusionMultiPath3D> for ExtrusionEntity {
    fn from(path: ExtrusionMultiPath3D) -> Self {
        ExtrusionEntity::MultiPath3D(path)
    }
}

impl From<ExtrusionLoop> for ExtrusionEntity {
    fn from(l: ExtrusionLoop) -> Self {
        ExtrusionEntity::Loop(l)
    }
}

impl From<ExtrusionEntityCollection> for ExtrusionEntity {
    fn from(c: ExtrusionEntityCollection) -> Self {
        ExtrusionEntity::Collection(c)
    }
}

/// Read-only visitor. Containers forward to their children by default, so
/// an implementation only overrides the variants it cares about.
pub trait ExtrusionVisitorConst {
    fn visit_path(&mut self, _path: &ExtrusionPath) {}

    fn visit_path_3d(&mut self, path: &ExtrusionPath3D) {
        self.visit_path(&path.path);
    }

    fn visit_multi_path(&mut self, multi_path: &ExtrusionMultiPath) {
        for path in &multi_path.paths {
            self.visit_path(path);
        }
    }

    fn visit_multi_path_3d(&mut self, multi_path: &ExtrusionMultiPath3D) {
        for path in &multi_path.paths {
            self.visit_path_3d(path);
        }
    }

    fn visit_loop(&mut self, extrusion_loop: &ExtrusionLoop) {
        for path in &extrusion_loop.paths {
            self.visit_path(path);
        }
    }

    fn visit_collection(&mut self, collection: &ExtrusionEntityCollection) {
        for entity in &collection.entities {
            entity.visit(self);
        }
    }
}

/// Mutating visitor, same forwarding defaults as [`ExtrusionVisitorConst`].
pub trait ExtrusionVisitor {
    fn visit_path(&mut self, _path: &mut ExtrusionPath) {}

    fn visit_path_3d(&mut self, path: &mut ExtrusionPath3D) {
        self.visit_path(&mut path.path);
    }

    fn visit_multi_path(&mut self, multi_path: &mut ExtrusionMultiPath) {
        for path in &mut multi_path.paths {
            self.visit_path(path);
        }
    }

    fn visit_multi_path_3d(&mut self, multi_path: &mut ExtrusionMultiPath3D) {
        for path in &mut multi_path.paths {
            self.visit_path_3d(path);
        }
    }

    fn visit_loop(&mut self, extrusion_loop: &mut ExtrusionLoop) {
        for path in &mut extrusion_loop.paths {
            self.visit_path(path);
        }
    }

    fn visit_collection(&mut self, collection: &mut ExtrusionEntityCollection) {
        for entity in &mut collection.entities {
            entity.visit_mut(self);
        }
    }
}

/// Collects centerlines: one polyline per path, multi-path and loop.
#[derive(Debug, Default)]
pub struct PolylineCollector {
    pub polylines: Polylines,
}

impl ExtrusionVisitorConst for PolylineCollector {
    fn visit_path(&mut self, path: &ExtrusionPath) {
        path.collect_polylines(&mut self.polylines);
    }

    fn visit_path_3d(&mut self, path: &ExtrusionPath3D) {
        path.path.collect_polylines(&mut self.polylines);
    }

    fn visit_multi_path(&mut self, multi_path: &ExtrusionMultiPath) {
        multi_path.collect_polylines(&mut self.polylines);
    }

    fn visit_multi_path_3d(&mut self, multi_path: &ExtrusionMultiPath3D) {
        let polyline = multi_path.as_polyline();
        if !polyline.is_empty() {
            self.polylines.push(polyline);
        }
    }

    fn visit_loop(&mut self, extrusion_loop: &ExtrusionLoop) {
        extrusion_loop.collect_polylines(&mut self.polylines);
    }
}

/// Printed length (mm) and volume (mm³) per role.
#[derive(Debug, Default)]
pub struct RoleLengthAnalyzer {
    pub per_role: std::collections::BTreeMap<ExtrusionRole, (CoordF, CoordF)>,
}

impl RoleLengthAnalyzer {
    pub fn length_mm(&self, role: ExtrusionRole) -> CoordF {
        self.per_role.get(&role).map_or(0.0, |(l, _)| *l)
    }

    pub fn volume(&self, role: ExtrusionRole) -> CoordF {
        self.per_role.get(&role).map_or(0.0, |(_, v)| *v)
    }

    fn add(&mut self, role: ExtrusionRole, length: CoordF, volume: CoordF) {
        let entry = self.per_role.entry(role).or_insert((0.0, 0.0));
        entry.0 += length / crate::SCALING_FACTOR;
        entry.1 += volume;
    }
}

impl ExtrusionVisitorConst for RoleLengthAnalyzer {
    fn visit_path(&mut self, path: &ExtrusionPath) {
        self.add(path.role, path.length(), path.total_volume());
    }

    fn visit_path_3d(&mut self, path: &ExtrusionPath3D) {
        self.add(path.role(), path.length(), path.total_volume());
    }
}

/// Scales the width and volumetric rate of every path it visits.
#[derive(Debug, Clone, Copy)]
pub struct WidthScaler {
    pub factor: CoordF,
}

impl ExtrusionVisitor for WidthScaler {
    fn visit_path(&mut self, path: &mut ExtrusionPath) {
        path.scale_width(self.factor);
    }
}
