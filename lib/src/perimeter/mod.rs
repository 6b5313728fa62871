//! Thin wall and gap fill generation.
//!
//! # Overview
//!
//! Regular perimeters are closed loops of a fixed width. Two kinds of area
//! escape them:
//!
//! - Thin walls: parts of a slice narrower than one external perimeter
//! - Gaps: slivers left between two consecutive perimeter levels
//!
//! Both are filled with variable-width centerlines from the medial axis.
//!
//! # Algorithm
//!
//! 1. Thin walls: open the slice by half the external perimeter width; what
//!    disappears is too thin for a loop. Each piece wide enough to print
//!    runs through [`MedialAxis`] with the whole slice as bounds, so the
//!    centerlines can anchor into the thick part.
//! 2. Gap fill: [`detect_gaps`] between the two levels, then
//!    [`MedialAxis`] per gap with widths derived from the perimeter spacing.
//! 3. Both are discretized into fixed-width paths by [`variable_width`].

use crate::clipper::{detect_gaps, difference, opening, shrink, OffsetJoinType};
use crate::config::{FlowConfig, ThinWallConfig};
use crate::extrusion::{variable_width, ExtrusionEntityCollection, ExtrusionRole};
use crate::flow::{Flow, FlowRole};
use crate::geometry::{ExPolygon, ThickPolylines};
use crate::medial_axis::{MedialAxis, MedialAxisParams};
use crate::{scale, CoordF, SCALING_FACTOR};
use rayon::prelude::*;

/// Inset overlap tolerance used to size the narrowest gap fill.
const INSET_OVERLAP_TOLERANCE: CoordF = 0.15;

/// Thin walls and gap fill of one slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThinFeatureResult {
    pub thin_walls: ExtrusionEntityCollection,
    pub gap_fill: ExtrusionEntityCollection,
}

impl ThinFeatureResult {
    pub fn is_empty(&self) -> bool {
        self.thin_walls.is_empty() && self.gap_fill.is_empty()
    }

    /// Total extruded volume (mm³).
    pub fn total_volume(&self) -> CoordF {
        self.thin_walls.total_volume() + self.gap_fill.total_volume()
    }

    /// Thin walls first, then gap fill, each group free to be reordered.
    pub fn into_collection(self) -> ExtrusionEntityCollection {
        let mut out = ExtrusionEntityCollection::new();
        for group in [self.thin_walls, self.gap_fill] {
            if !group.is_empty() {
                out.append(group);
            }
        }
        out
    }
}

/// Thin wall and gap fill generator for one print region.
#[derive(Debug, Clone, Default)]
pub struct ThinFeatureGenerator {
    flow_config: FlowConfig,
    thin_wall_config: ThinWallConfig,
}

impl ThinFeatureGenerator {
    pub fn new(flow_config: FlowConfig, thin_wall_config: ThinWallConfig) -> Self {
        Self {
            flow_config,
            thin_wall_config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn flow_config(&self) -> &FlowConfig {
        &self.flow_config
    }

    pub fn thin_wall_config(&self) -> &ThinWallConfig {
        &self.thin_wall_config
    }

    fn flow(&self, role: FlowRole) -> Option<Flow> {
        match self.flow_config.flow(role) {
            Ok(flow) => Some(flow),
            Err(err) => {
                log::warn!("thin features: no {:?} flow: {}", role, err);
                None
            }
        }
    }

    /// Centerline extrusions for the parts of `slice` too thin for an
    /// external perimeter loop.
    pub fn thin_walls(&self, slice: &ExPolygon) -> ExtrusionEntityCollection {
        if !self.thin_wall_config.thin_walls_enabled {
            return ExtrusionEntityCollection::new();
        }
        let Some(flow) = self.flow(FlowRole::ExternalPerimeter) else {
            return ExtrusionEntityCollection::new();
        };
        let params = self.thin_wall_config.medial_axis_params(&flow);
        let slices = std::slice::from_ref(slice);

        let thick = opening(slices, flow.width() / 2.0, OffsetJoinType::Miter);
        let thin = difference(slices, &thick);
        let min_half = params.min_width / SCALING_FACTOR / 2.0;

        let mut polylines = ThickPolylines::new();
        for zone in &thin {
            // nothing in there is wide enough to print
            if shrink(std::slice::from_ref(zone), min_half, OffsetJoinType::Miter).is_empty() {
                log::trace!("thin walls: zone of area {:.0} below minimum width", zone.area());
                continue;
            }
            polylines.extend(MedialAxis::new(zone, slice, params).build());
        }
        log::debug!(
            "thin walls: {} zones, {} centerlines",
            thin.len(),
            polylines.len()
        );
        variable_width(&polylines, ExtrusionRole::ThinWall, &flow)
    }

    /// Gap fill between two consecutive perimeter levels, given as the
    /// regions enclosed by their centerlines.
    pub fn gap_fill(&self, outer: &[ExPolygon], inner: &[ExPolygon]) -> ExtrusionEntityCollection {
        if !self.thin_wall_config.gap_fill_enabled {
            return ExtrusionEntityCollection::new();
        }
        let Some(flow) = self.flow(FlowRole::Perimeter) else {
            return ExtrusionEntityCollection::new();
        };
        let spacing = flow.spacing();
        let min_width = 0.2 * flow.width() * (1.0 - INSET_OVERLAP_TOLERANCE);
        let max_width = 2.0 * spacing;

        let min_area_mm2 = if self.thin_wall_config.gap_fill_min_area > 0.0 {
            self.thin_wall_config.gap_fill_min_area
        } else {
            flow.width() * flow.width()
        };
        let min_area = min_area_mm2 * SCALING_FACTOR * SCALING_FACTOR;

        let params = MedialAxisParams::from_flow(&flow, min_width, max_width)
            .nozzle_diameter(scale(min_width) as CoordF)
            .resolution(scale(self.thin_wall_config.resolution).max(1));

        let gaps = detect_gaps(outer, inner, spacing, min_width, OffsetJoinType::Miter);
        let mut polylines = ThickPolylines::new();
        for gap in gaps.iter().filter(|g| g.area().abs() >= min_area) {
            polylines.extend(MedialAxis::new(gap, gap, params).build());
        }
        log::debug!("gap fill: {} gaps, {} centerlines", gaps.len(), polylines.len());
        variable_width(&polylines, ExtrusionRole::GapFill, &flow)
    }

    /// Thin walls of `slice` plus the gap fill between its external
    /// perimeter and the first internal one.
    pub fn generate(&self, slice: &ExPolygon) -> ThinFeatureResult {
        let thin_walls = self.thin_walls(slice);
        let gap_fill = match (
            self.flow(FlowRole::ExternalPerimeter),
            self.flow(FlowRole::Perimeter),
        ) {
            (Some(external), Some(perimeter)) => {
                let outer = shrink(std::slice::from_ref(slice), external.width() / 2.0, OffsetJoinType::Miter);
                let step = (external.spacing() + perimeter.spacing()) / 2.0;
                let inner = shrink(&outer, step, OffsetJoinType::Miter);
                self.gap_fill(&outer, &inner)
            }
            _ => ExtrusionEntityCollection::new(),
        };
        ThinFeatureResult {
            thin_walls,
            gap_fill,
        }
    }

    /// [`thin_walls`](Self::thin_walls) over independent regions in
    /// parallel, one collection per region in input order.
    pub fn process_regions(&self, slices: &[ExPolygon]) -> Vec<ExtrusionEntityCollection> {
        slices.par_iter().map(|slice| self.thin_walls(slice)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::union_ex;
    use crate::geometry::{Point, Polygon};
    use crate::SCALED_EPSILON;

    fn rect_mm(x0: f64, y0: f64, x1: f64, y1: f64) -> ExPolygon {
        Polygon::rectangle(Point::new(scale(x0), scale(y0)), Point::new(scale(x1), scale(y1))).into()
    }

    fn perimeter_spacing(generator: &ThinFeatureGenerator) -> f64 {
        generator.flow_config().flow(FlowRole::Perimeter).unwrap().spacing()
    }

    #[test]
    fn test_thin_strip_becomes_thin_wall() {
        let generator = ThinFeatureGenerator::with_defaults();
        let strip = rect_mm(0.0, 0.0, 5.0, 0.3);
        let out = generator.thin_walls(&strip);
        assert!(!out.is_empty());
        for entity in &out.entities {
            assert_eq!(entity.role(), ExtrusionRole::ThinWall);
        }
        assert!(out.length() > scale(4.0) as f64);
        assert!(out.total_volume() > 0.0);
    }

    #[test]
    fn test_wide_square_has_no_thin_walls() {
        let generator = ThinFeatureGenerator::with_defaults();
        let square = rect_mm(0.0, 0.0, 10.0, 10.0);
        assert!(generator.thin_walls(&square).is_empty());
    }

    #[test]
    fn test_fin_stays_inside_slice() {
        let generator = ThinFeatureGenerator::with_defaults();
        let part = union_ex(&[rect_mm(0.0, 0.0, 10.0, 10.0), rect_mm(10.0, 4.0, 15.0, 4.3)]);
        assert_eq!(part.len(), 1);
        let out = generator.thin_walls(&part[0]);
        assert!(!out.is_empty());
        let bbox = part[0].bounding_box().inflated(SCALED_EPSILON * 10);
        for polyline in out.collect_polylines_vec() {
            for p in polyline.points() {
                assert!(bbox.contains(p), "{:?} escaped the slice", p);
            }
        }
    }

    #[test]
    fn test_disabled_thin_walls() {
        let generator = ThinFeatureGenerator::new(FlowConfig::default(), ThinWallConfig::new().thin_walls(false));
        assert!(generator.thin_walls(&rect_mm(0.0, 0.0, 5.0, 0.3)).is_empty());
    }

    #[test]
    fn test_gap_fill_between_levels() {
        let generator = ThinFeatureGenerator::with_defaults();
        let spacing = perimeter_spacing(&generator);
        let outer = rect_mm(0.0, 0.0, 10.0, spacing + 0.3);
        let out = generator.gap_fill(&[outer], &[]);
        assert!(!out.is_empty());
        for entity in &out.entities {
            assert_eq!(entity.role(), ExtrusionRole::GapFill);
        }
    }

    #[test]
    fn test_gap_fill_skips_small_gaps() {
        let generator = ThinFeatureGenerator::new(FlowConfig::default(), ThinWallConfig::new().gap_fill_min_area(5.0));
        let spacing = perimeter_spacing(&generator);
        let outer = rect_mm(0.0, 0.0, 10.0, spacing + 0.3);
        assert!(generator.gap_fill(&[outer.clone()], &[]).is_empty());

        let disabled = ThinFeatureGenerator::new(FlowConfig::default(), ThinWallConfig::new().gap_fill(false));
        assert!(disabled.gap_fill(&[outer], &[]).is_empty());
    }

    #[test]
    fn test_generate_narrow_strip() {
        let generator = ThinFeatureGenerator::with_defaults();
        let result = generator.generate(&rect_mm(0.0, 0.0, 10.0, 1.2));
        assert!(result.thin_walls.is_empty());
        assert!(!result.gap_fill.is_empty());
        let volume = result.total_volume();
        let merged = result.into_collection();
        assert_eq!(merged.len(), 1);
        assert!((merged.total_volume() - volume).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_flow_gives_nothing() {
        let generator = ThinFeatureGenerator::new(FlowConfig::new().layer_height(0.0), ThinWallConfig::default());
        let result = generator.generate(&rect_mm(0.0, 0.0, 5.0, 0.3));
        assert!(result.is_empty());
    }

    #[test]
    fn test_process_regions_keeps_order() {
        let generator = ThinFeatureGenerator::with_defaults();
        let regions = vec![
            rect_mm(0.0, 0.0, 5.0, 0.3),
            rect_mm(0.0, 10.0, 10.0, 20.0),
            rect_mm(0.0, 30.0, 6.0, 30.35),
        ];
        let out = generator.process_regions(&regions);
        assert_eq!(out.len(), 3);
        assert!(!out[0].is_empty());
        assert!(out[1].is_empty());
        assert!(!out[2].is_empty());
        assert_eq!(out[0], generator.thin_walls(&regions[0]));
    }
}
