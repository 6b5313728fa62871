//! Single extrusion paths, planar and non-planar.

use super::{ExtrusionError, ExtrusionRole};
use crate::flow::Flow;
use crate::geometry::{Point, PointF, Polygon, Polygons, Polyline, Polylines};
use crate::{Coord, CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};

/// Rectangles with square caps around every segment of `points`, grown by
/// `half_width`. Neighbouring rectangles overlap at the joints, so their
/// union covers the swept bead.
pub(crate) fn cover_polyline(points: &[Point], half_width: CoordF, out: &mut Polygons) {
    if half_width <= 0.0 {
        return;
    }
    if let [single] = points {
        let h = half_width.round() as Coord;
        out.push(Polygon::rectangle(
            Point::new(single.x - h, single.y - h),
            Point::new(single.x + h, single.y + h),
        ));
        return;
    }
    for w in points.windows(2) {
        let (a, b) = (w[0].to_f64(), w[1].to_f64());
        let d = (b - a).normalize();
        if d.length() == 0.0 {
            continue;
        }
        let along = d * half_width;
        let side = d.perp() * half_width;
        out.push(Polygon::from_points(vec![
            Point::from_f64(a - along - side),
            Point::from_f64(b + along - side),
            Point::from_f64(b + along + side),
            Point::from_f64(a - along + side),
        ]));
    }
}

/// An open extrusion of constant width along a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionPath {
    pub polyline: Polyline,
    pub role: ExtrusionRole,
    /// Volumetric rate in mm³ per mm of travel.
    pub mm3_per_mm: CoordF,
    /// Bead width in mm.
    pub width: CoordF,
    /// Bead height in mm.
    pub height: CoordF,
}

impl ExtrusionPath {
    pub fn new(role: ExtrusionRole) -> Self {
        Self {
            polyline: Polyline::new(),
            role,
            mm3_per_mm: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// A path sized after `flow`.
    pub fn from_flow(polyline: Polyline, role: ExtrusionRole, flow: &Flow) -> Self {
        Self {
            polyline,
            role,
            mm3_per_mm: flow.mm3_per_mm_unchecked(),
            width: flow.width(),
            height: flow.height(),
        }
    }

    pub fn with_polyline(mut self, polyline: Polyline) -> Self {
        self.polyline = polyline;
        self
    }

    pub fn with_mm3_per_mm(mut self, mm3_per_mm: CoordF) -> Self {
        self.mm3_per_mm = mm3_per_mm;
        self
    }

    pub fn with_width(mut self, width: CoordF) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: CoordF) -> Self {
        self.height = height;
        self
    }

    pub fn first_point(&self) -> Option<Point> {
        self.polyline.points().first().copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.polyline.points().last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polyline.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polyline.is_empty()
    }

    /// Length in scaled units.
    pub fn length(&self) -> CoordF {
        self.polyline.length()
    }

    /// Extruded volume in mm³.
    pub fn total_volume(&self) -> CoordF {
        self.mm3_per_mm * self.length() / SCALING_FACTOR
    }

    pub fn reverse(&mut self) {
        self.polyline.reverse();
    }

    /// Shorten the path by `distance` (scaled) from its end.
    pub fn clip_end(&mut self, distance: CoordF) {
        self.polyline.clip_end(distance);
    }

    pub fn simplify(&mut self, tolerance: Coord) {
        self.polyline.simplify(tolerance);
    }

    /// Distance between the centerlines of two neighbouring beads, in mm.
    pub fn spacing(&self) -> CoordF {
        if self.role.is_bridge() {
            self.width
        } else {
            Flow::rounded_rectangle_extrusion_spacing(self.width, self.height).unwrap_or(self.width)
        }
    }

    /// Area swept by the full bead width, grown by `scaled_epsilon`.
    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        cover_polyline(
            self.polyline.points(),
            self.width * SCALING_FACTOR / 2.0 + scaled_epsilon,
            out,
        );
    }

    /// Area swept by the bead spacing, grown by `scaled_epsilon`.
    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        cover_polyline(
            self.polyline.points(),
            self.spacing() * SCALING_FACTOR / 2.0 + scaled_epsilon,
            out,
        );
    }

    pub fn as_polyline(&self) -> &Polyline {
        &self.polyline
    }

    pub fn collect_polylines(&self, out: &mut Polylines) {
        if !self.polyline.is_empty() {
            out.push(self.polyline.clone());
        }
    }

    /// Scale width and volumetric rate by `factor`.
    pub fn scale_width(&mut self, factor: CoordF) {
        self.width *= factor;
        self.mm3_per_mm *= factor;
    }
}

/// An extrusion path whose points are lifted off the layer plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionPath3D {
    pub path: ExtrusionPath,
    /// Z offset of each point, in mm.
    z_offsets: Vec<CoordF>,
}

impl ExtrusionPath3D {
    /// Pair `path` with one z offset per point.
    pub fn new(path: ExtrusionPath, z_offsets: Vec<CoordF>) -> Result<Self, ExtrusionError> {
        if z_offsets.len() != path.len() {
            return Err(ExtrusionError::ZOffsetMismatch {
                points: path.len(),
                offsets: z_offsets.len(),
            });
        }
        Ok(Self { path, z_offsets })
    }

    pub fn push(&mut self, point: Point, z_offset: CoordF) {
        self.path.polyline.points_mut().push(point);
        self.z_offsets.push(z_offset);
    }

    pub fn z_offsets(&self) -> &[CoordF] {
        &self.z_offsets
    }

    /// Points with their z offsets, x/y in scaled units.
    pub fn points_3d(&self) -> impl Iterator<Item = (PointF, CoordF)> + '_ {
        self.path
            .polyline
            .points()
            .iter()
            .zip(&self.z_offsets)
            .map(|(p, &z)| (p.to_f64(), z))
    }

    pub fn role(&self) -> ExtrusionRole {
        self.path.role
    }

    pub fn first_point(&self) -> Option<Point> {
        self.path.first_point()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.path.last_point()
    }

    /// Length in scaled units, including the vertical component.
    pub fn length(&self) -> CoordF {
        let pts = self.path.polyline.points();
        pts.windows(2)
            .zip(self.z_offsets.windows(2))
            .map(|(p, z)| {
                let planar = p[0].distance(&p[1]);
                let dz = (z[1] - z[0]) * SCALING_FACTOR;
                (planar * planar + dz * dz).sqrt()
            })
            .sum()
    }

    pub fn total_volume(&self) -> CoordF {
        self.path.mm3_per_mm * self.length() / SCALING_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;

    fn straight(len_mm: f64) -> Polyline {
        Polyline::from_points(vec![Point::new(0, 0), Point::new(scale(len_mm), 0)])
    }

    #[test]
    fn test_path_from_flow_volume() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        let path = ExtrusionPath::from_flow(straight(10.0), ExtrusionRole::GapFill, &flow);
        assert_eq!(path.width, 0.45);
        assert_eq!(path.height, 0.2);
        let expected = flow.mm3_per_mm().unwrap() * 10.0;
        assert!((path.total_volume() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_path_reverse_and_clip() {
        let mut path = ExtrusionPath::new(ExtrusionRole::ThinWall).with_polyline(straight(10.0));
        path.reverse();
        assert_eq!(path.first_point(), Some(Point::new(scale(10.0), 0)));
        path.clip_end(scale(4.0) as f64);
        assert_eq!(path.last_point(), Some(Point::new(scale(4.0), 0)));
    }

    #[test]
    fn test_covered_by_width() {
        let path = ExtrusionPath::new(ExtrusionRole::GapFill)
            .with_polyline(straight(10.0))
            .with_width(0.4)
            .with_height(0.2);
        let mut out = Vec::new();
        path.polygons_covered_by_width(&mut out, 0.0);
        assert_eq!(out.len(), 1);
        // 10 mm long plus two 0.2 mm caps, 0.4 mm wide
        let area = out[0].area().abs();
        let expected = (scale(10.4) as f64) * (scale(0.4) as f64);
        assert!((area - expected).abs() / expected < 1e-6);

        let mut spaced = Vec::new();
        path.polygons_covered_by_spacing(&mut spaced, 0.0);
        assert!(spaced[0].area().abs() < area);
    }

    #[test]
    fn test_path3d_offsets() {
        let path = ExtrusionPath::new(ExtrusionRole::Perimeter).with_polyline(straight(3.0));
        assert!(ExtrusionPath3D::new(path.clone(), vec![0.0]).is_err());
        let lifted = ExtrusionPath3D::new(path, vec![0.0, 4.0]).unwrap();
        assert!((lifted.length() - scale(5.0) as f64).abs() < 1.0);
        assert_eq!(lifted.points_3d().count(), 2);
    }
}
