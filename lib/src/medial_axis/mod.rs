//! Medial-axis extraction for thin walls and gap fill.
//!
//! [`MedialAxis`] turns a region that is too thin for regular perimeters into
//! variable-width centerlines ([`ThickPolyline`]s). The pipeline:
//!
//! 1. Simplify the region frontier against its bounds
//! 2. Build a Voronoi skeleton and stitch it into polylines
//! 3. Fuse spurious branches (curves, forks, corners)
//! 4. Extend free ends to the boundary and into anchor regions
//! 5. Prune too thin and too short pieces
//! 6. Fix widths: extrusion budget, nozzle growth, tapering, max width
//!
//! All lengths and widths are in scaled units.

mod concat;
mod extend;
mod fusion;
mod prune;
mod skeleton;
mod voronoi;
mod width;

use crate::clipper::{difference, opening, OffsetJoinType};
use crate::flow::Flow;
use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon, Polylines, ThickPolyline, ThickPolylines};
use crate::{scale, unscale, Coord, CoordF, SCALED_EPSILON, SCALED_RESOLUTION};
use serde::{Deserialize, Serialize};
use std::fmt;

use concat::{concat_thick_polylines, concatenate_polylines_with_crossing};

/// Scaled parameters of one medial-axis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedialAxisParams {
    /// Narrowest bead worth extruding.
    pub min_width: CoordF,
    /// Widest bead; thicker parts of the skeleton are dropped.
    pub max_width: CoordF,
    /// Layer height.
    pub height: CoordF,
    /// Nozzle diameter; beads narrower than this grow to it outside anchors.
    pub nozzle_diameter: CoordF,
    /// Length over which free ends ramp down. 0 disables tapering.
    pub taper_size: CoordF,
    /// Simplification resolution.
    pub resolution: Coord,
}

impl MedialAxisParams {
    /// Nozzle diameter defaults to `min_width`, which disables nozzle growth.
    pub fn new(min_width: CoordF, max_width: CoordF, height: CoordF) -> Self {
        Self {
            min_width,
            max_width,
            height,
            nozzle_diameter: min_width,
            taper_size: 0.0,
            resolution: SCALED_RESOLUTION,
        }
    }

    /// Parameters for beads of `flow`, with widths given in mm.
    pub fn from_flow(flow: &Flow, min_width: CoordF, max_width: CoordF) -> Self {
        Self::new(
            scale(min_width) as CoordF,
            scale(max_width) as CoordF,
            scale(flow.height()) as CoordF,
        )
        .nozzle_diameter(scale(flow.nozzle_diameter()) as CoordF)
    }

    pub fn nozzle_diameter(mut self, nozzle_diameter: CoordF) -> Self {
        self.nozzle_diameter = nozzle_diameter;
        self
    }

    pub fn taper_size(mut self, taper_size: CoordF) -> Self {
        self.taper_size = taper_size;
        self
    }

    pub fn resolution(mut self, resolution: Coord) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_width < 0.0 {
            return Err("Minimum width must not be negative".into());
        }
        if self.max_width <= 0.0 {
            return Err("Maximum width must be positive".into());
        }
        if self.min_width > self.max_width {
            return Err(format!(
                "Minimum width {} exceeds maximum width {}",
                self.min_width, self.max_width
            ));
        }
        if self.height <= 0.0 {
            return Err("Layer height must be positive".into());
        }
        if self.resolution <= 0 {
            return Err("Resolution must be positive".into());
        }
        Ok(())
    }
}

impl fmt::Display for MedialAxisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MedialAxisParams(width={:.3}..{:.3}mm, h={:.3}mm, nozzle={:.3}mm, taper={:.3}mm)",
            self.min_width / crate::SCALING_FACTOR,
            self.max_width / crate::SCALING_FACTOR,
            self.height / crate::SCALING_FACTOR,
            self.nozzle_diameter / crate::SCALING_FACTOR,
            self.taper_size / crate::SCALING_FACTOR,
        )
    }
}

/// What every pass after the skeleton needs to look at.
pub(crate) struct Context<'a> {
    /// The simplified region being processed.
    pub expolygon: &'a ExPolygon,
    /// The enclosing region; ends may be extended up to its boundary.
    pub bounds: &'a ExPolygon,
    pub params: &'a MedialAxisParams,
}

/// Medial-axis extraction of one region.
///
/// `surface` is the thin region to fill. `bounds` is the region it was cut
/// from (equal to `surface` when there is none); the parts of `bounds`
/// outside `surface` are anchors the centerlines may reach into.
#[derive(Debug, Clone)]
pub struct MedialAxis<'a> {
    surface: &'a ExPolygon,
    bounds: &'a ExPolygon,
    params: MedialAxisParams,
}

impl<'a> MedialAxis<'a> {
    pub fn new(surface: &'a ExPolygon, bounds: &'a ExPolygon, params: MedialAxisParams) -> Self {
        Self {
            surface,
            bounds,
            params,
        }
    }

    pub fn params(&self) -> &MedialAxisParams {
        &self.params
    }

    /// Run the full pipeline. Degenerate input gives an empty result.
    pub fn build(&self) -> ThickPolylines {
        let params = &self.params;
        let expolygon = self.simplify_polygon_frontier();
        if expolygon.contour.len() < 3 || expolygon.area() < params.min_width * params.min_width {
            log::debug!("medial axis: region too small, nothing to do");
            return Vec::new();
        }

        let ctx = Context {
            expolygon: &expolygon,
            bounds: self.bounds,
            params,
        };

        let pp = skeleton::skeleton(&expolygon, params);
        if pp.is_empty() {
            return pp;
        }
        let pp = concat_thick_polylines(pp);
        let pp = fusion::fusion_curve(pp, &ctx);
        let pp = fusion::main_fusion(pp, &ctx);
        let pp = fusion::fusion_corners(pp, &ctx);
        log_stage("fusion", &pp);

        let (anchors, opened_anchors) = self.anchors(&expolygon);
        let pp = extend::extend_line_both_side(pp, &ctx, &opened_anchors);
        log_stage("extension", &pp);

        let pp = prune::remove_too_thin_extrusion(pp, &ctx);
        let pp = prune::remove_too_thin_points(pp, &ctx);
        let pp = concatenate_polylines_with_crossing(pp);
        let mut pp = prune::remove_too_short_polylines(pp, params.max_width / 2.0);
        log_stage("pruning", &pp);

        width::ensure_not_overextrude(&mut pp, &ctx);
        if (params.nozzle_diameter - params.min_width).abs() > CoordF::EPSILON {
            width::grow_to_nozzle_diameter(&mut pp, &anchors, params);
        }
        if params.taper_size > 0.0 {
            width::taper_ends(&mut pp, params);
        }
        width::cap_width(&mut pp, params.max_width);

        pp.retain(ThickPolyline::is_valid);
        pp.sort_by(|a, b| {
            a.first_point()
                .cmp(&b.first_point())
                .then_with(|| a.last_point().cmp(&b.last_point()))
        });
        log_stage("result", &pp);
        pp
    }

    /// [`build`](Self::build) without the widths.
    pub fn build_polylines(&self) -> Polylines {
        self.build().iter().map(ThickPolyline::to_polyline).collect()
    }

    /// Snap surface vertices lying just off the bounds onto the nearest bounds
    /// vertex, so centerlines reach the real corners of the part. Contour and
    /// holes are both snapped.
    fn simplify_polygon_frontier(&self) -> ExPolygon {
        let resolution = self.params.resolution;
        let mut simplified = self.surface.clone();

        if self.surface != self.bounds {
            let contour = snap_ring(self.surface.contour.points(), self.bounds, resolution);
            let holes: Vec<Option<Vec<Point>>> = self
                .surface
                .holes
                .iter()
                .map(|hole| snap_ring(hole.points(), self.bounds, resolution))
                .collect();

            if contour.is_some() || holes.iter().any(Option::is_some) {
                let candidate = ExPolygon::with_holes(
                    contour.map_or_else(|| self.surface.contour.clone(), Polygon::from_points),
                    holes
                        .into_iter()
                        .zip(&self.surface.holes)
                        .map(|(snapped, hole)| snapped.map_or_else(|| hole.clone(), Polygon::from_points))
                        .collect(),
                );
                let mut clipped = crate::clipper::intersection(&[candidate], std::slice::from_ref(self.bounds));
                if clipped.len() == 1 {
                    simplified = clipped.remove(0);
                } else {
                    log::debug!(
                        "medial axis: frontier snapping split the region in {}, keeping the original",
                        clipped.len()
                    );
                    simplified.contour.remove_collinear(SCALED_EPSILON);
                }
            }
        }

        simplified.remove_point_too_near(resolution);
        simplified.orient();
        simplified
    }

    /// The parts of the bounds outside the region: raw, and opened by the
    /// resolution to drop slivers.
    fn anchors(&self, expolygon: &ExPolygon) -> (ExPolygons, ExPolygons) {
        if self.surface == self.bounds {
            return (Vec::new(), Vec::new());
        }
        let raw = difference(std::slice::from_ref(self.bounds), std::slice::from_ref(expolygon));
        let opened = opening(&raw, unscale(self.params.resolution), OffsetJoinType::Miter);
        (raw, opened)
    }
}

/// Move the vertices of `ring` that lie off `bounds` but within
/// `resolution` of one of its vertices onto that vertex. A vertex only moves
/// when the shift is small against its adjacent edges. `None` when nothing
/// moved.
fn snap_ring(ring: &[Point], bounds: &ExPolygon, resolution: Coord) -> Option<Vec<Point>> {
    let n = ring.len();
    let mut snapped = ring.to_vec();
    let mut changed = false;
    for (i, &p) in ring.iter().enumerate() {
        if bounds.has_boundary_point(&p) {
            continue;
        }
        let Some(target) = bounds.closest_point(&p) else {
            continue;
        };
        let dist = target.distance(&p);
        let edge = ring[(i + n - 1) % n].distance(&p).min(ring[(i + 1) % n].distance(&p));
        if dist <= resolution as CoordF && dist + (SCALED_EPSILON as CoordF) < edge / 2.0 {
            snapped[i] = target;
            changed = true;
        }
    }
    changed.then_some(snapped)
}

fn log_stage(stage: &str, pp: &[ThickPolyline]) {
    log::debug!(
        "medial axis: {} polylines after {} ({} points)",
        pp.len(),
        stage,
        pp.iter().map(ThickPolyline::len).sum::<usize>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> ExPolygon {
        ExPolygon::new(Polygon::rectangle(
            Point::new(scale(x0), scale(y0)),
            Point::new(scale(x1), scale(y1)),
        ))
    }

    fn params(min: f64, max: f64) -> MedialAxisParams {
        MedialAxisParams::new(scale(min) as CoordF, scale(max) as CoordF, scale(0.2) as CoordF)
    }

    #[test]
    fn test_params_defaults_and_builders() {
        let p = params(0.1, 0.6);
        assert_eq!(p.nozzle_diameter, p.min_width);
        assert_eq!(p.taper_size, 0.0);
        assert_eq!(p.resolution, SCALED_RESOLUTION);
        assert!(p.validate().is_ok());

        let p = p.nozzle_diameter(400_000.0).taper_size(100_000.0).resolution(5_000);
        assert_eq!(p.nozzle_diameter, 400_000.0);
        assert_eq!(p.taper_size, 100_000.0);
        assert_eq!(p.resolution, 5_000);
        assert!(params(0.7, 0.6).validate().is_err());
    }

    #[test]
    fn test_params_from_flow() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        let p = MedialAxisParams::from_flow(&flow, 0.1, 0.9);
        assert_eq!(p.min_width, 100_000.0);
        assert_eq!(p.max_width, 900_000.0);
        assert_eq!(p.height, 200_000.0);
        assert_eq!(p.nozzle_diameter, 400_000.0);
        assert!(p.to_string().contains("nozzle=0.400mm"));
    }

    #[test]
    fn test_strip_gives_single_centerline() {
        let strip = rect(0.0, 0.0, 5.0, 0.4);
        let out = MedialAxis::new(&strip, &strip, params(0.1, 0.6)).build();
        let line = out
            .iter()
            .max_by(|a, b| a.length().total_cmp(&b.length()))
            .unwrap();
        assert!(line.length() > scale(4.5) as f64);
        assert!(line.length() <= scale(5.0) as f64 + 10.0);
        for polyline in &out {
            for (p, w) in polyline.points.iter().zip(&polyline.width) {
                assert!(strip.contains_b(p));
                assert!(*w <= scale(0.6) as f64);
            }
        }
    }

    #[test]
    fn test_wide_region_keeps_only_corner_stubs() {
        let square = rect(0.0, 0.0, 5.0, 5.0);
        let out = MedialAxis::new(&square, &square, params(0.1, 0.6)).build();
        for polyline in &out {
            assert!(polyline.length() < scale(2.0) as f64);
            assert!(polyline.width.iter().all(|&w| w <= scale(0.6) as f64));
        }
    }

    #[test]
    fn test_tiny_region_is_empty() {
        let tiny = rect(0.0, 0.0, 0.05, 0.05);
        assert!(MedialAxis::new(&tiny, &tiny, params(0.1, 0.6)).build().is_empty());
        let empty = ExPolygon::default();
        assert!(MedialAxis::new(&empty, &empty, params(0.1, 0.6)).build().is_empty());
    }

    #[test]
    fn test_output_is_sorted() {
        let a = rect(0.0, 0.0, 5.0, 0.4);
        let out = MedialAxis::new(&a, &a, params(0.1, 0.6)).build_polylines();
        let firsts: Vec<Point> = out.iter().filter_map(|p| p.points().first().copied()).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(firsts, sorted);
    }

    #[test]
    fn test_frontier_snaps_hole_vertices() {
        let framed = |lo: f64, hi: f64| {
            let mut hole = Polygon::rectangle(Point::new_scale(lo, lo), Point::new_scale(hi, hi));
            hole.make_clockwise();
            ExPolygon::with_holes(rect(0.0, 0.0, 10.0, 10.0).contour, vec![hole])
        };
        let bounds = framed(4.0, 6.0);
        // hole grown by 3 µm, contour untouched
        let surface = framed(3.997, 6.003);
        let axis = MedialAxis::new(&surface, &bounds, params(0.1, 0.6));

        let simplified = axis.simplify_polygon_frontier();
        assert_eq!(simplified.holes.len(), 1);
        let off: Vec<&Point> = simplified.holes[0]
            .points()
            .iter()
            .filter(|p| !bounds.has_boundary_point(p))
            .collect();
        assert!(off.is_empty(), "hole points off the bounds: {:?}", off);
        assert!((simplified.area() - bounds.area()).abs() < 1e8);
        assert!(simplified.is_valid());
    }

    #[test]
    fn test_ends_extend_into_anchor() {
        // a thin neck cut from a wider part: the centerline reaches into it
        let surface = rect(0.0, 0.0, 3.0, 0.4);
        let bounds = ExPolygon::new(Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(scale(3.0), 0),
            Point::new(scale(3.0), scale(-1.0)),
            Point::new(scale(5.0), scale(-1.0)),
            Point::new(scale(5.0), scale(1.4)),
            Point::new(scale(3.0), scale(1.4)),
            Point::new(scale(3.0), scale(0.4)),
            Point::new(0, scale(0.4)),
        ]));
        let out = MedialAxis::new(&surface, &bounds, params(0.1, 0.6)).build();
        assert!(!out.is_empty());
        let max_x = out
            .iter()
            .flat_map(|p| p.points.iter().map(|q| q.x))
            .max()
            .unwrap();
        assert!(max_x > scale(3.0));
        for polyline in &out {
            for p in &polyline.points {
                assert!(bounds.contains_b(p));
            }
        }
    }
}
