//! Width post-processing of the final centerlines.

use super::{Context, MedialAxisParams};
use crate::geometry::{ExPolygon, ThickPolyline};
use crate::CoordF;
use std::f64::consts::PI;

/// Cross-section lost to the rounded sides of a bead, as a fraction of
/// `height²`.
const ROUNDING_LOSS: CoordF = 1.0 - PI / 4.0;

/// Extra length a polyline needs beyond twice the taper to be tapered.
const TAPER_MIN_LENGTH_RATIO: CoordF = 2.2;

/// Volume swept by `pp` per unit height, using the rounded-rectangle
/// cross-section `h·(w - h·(1 - π/4))`.
fn extruded_volume(pp: &[ThickPolyline], height: CoordF) -> CoordF {
    pp.iter()
        .flat_map(ThickPolyline::thicklines)
        .map(|l| l.length() * height * ((l.a_width + l.b_width) / 2.0 - height * ROUNDING_LOSS))
        .sum()
}

/// Scale all widths down uniformly if the beads would put more plastic
/// down than the bounds can hold.
pub(crate) fn ensure_not_overextrude(pp: &mut [ThickPolyline], ctx: &Context) {
    let h = ctx.params.height;
    let bounds = ctx.bounds;
    let perimeter = bounds.contour.length() + bounds.holes.iter().map(|h| h.length()).sum::<CoordF>();
    let budget = h * bounds.area() + perimeter * h * h * ROUNDING_LOSS * 0.5;

    let volume = extruded_volume(pp, h);
    if volume <= budget {
        return;
    }
    let (mut sum_length, mut sum_weighted) = (0.0, 0.0);
    for line in pp.iter().flat_map(ThickPolyline::thicklines) {
        let l = line.length();
        sum_length += l;
        sum_weighted += l * (line.a_width + line.b_width) / 2.0;
    }
    if sum_weighted <= 0.0 {
        return;
    }
    let ratio = (budget + h * h * ROUNDING_LOSS * sum_length) / (h * sum_weighted);
    if ratio >= 1.0 {
        return;
    }
    log::debug!("medial axis: over-extrusion, scaling widths by {ratio:.3}");
    for polyline in pp.iter_mut() {
        for w in &mut polyline.width {
            *w *= ratio;
        }
    }
}

/// Widen points narrower than the nozzle, except inside anchors where the
/// bead overlaps other extrusions. Runs after [`ensure_not_overextrude`] and
/// may push the volume past the bounds' budget.
pub(crate) fn grow_to_nozzle_diameter(pp: &mut [ThickPolyline], anchors: &[ExPolygon], params: &MedialAxisParams) {
    let target = params.nozzle_diameter.min(params.max_width);
    for polyline in pp.iter_mut() {
        for (p, w) in polyline.points.iter().zip(polyline.width.iter_mut()) {
            if *w < target && !anchors.iter().any(|a| a.contains_point(p)) {
                *w = target;
            }
        }
    }
}

/// Ramp the width of the first `length` of `polyline` up from `min_size`.
fn taper_start(polyline: &mut ThickPolyline, min_size: CoordF, length: CoordF, resolution: CoordF) {
    polyline.width[0] = min_size;
    let mut dist = 0.0;
    let mut last_dist = 0.0;
    let mut i = 1;
    while i < polyline.len() {
        dist += polyline.points[i - 1].distance(&polyline.points[i]);
        if dist > length {
            if dist > length + resolution {
                // the ramp ends inside this segment
                let t = (length - last_dist) / (dist - last_dist);
                let p = polyline.points[i - 1].interpolate(t, &polyline.points[i]);
                let w = polyline.width[i];
                polyline.points.insert(i, p);
                polyline.width.insert(i, w);
            }
            break;
        }
        let w = polyline.width[i];
        polyline.width[i] = min_size.max(min_size + (w - min_size) * dist / length);
        last_dist = dist;
        i += 1;
    }
}

/// Taper the free ends of every polyline long enough to hold two tapers.
pub(crate) fn taper_ends(pp: &mut [ThickPolyline], params: &MedialAxisParams) {
    let min_size = (params.nozzle_diameter * 0.1).max(params.height * ROUNDING_LOSS);
    let length = params.taper_size.min((params.nozzle_diameter - min_size) / 2.0);
    let resolution = params.resolution as CoordF;
    if length <= resolution {
        return;
    }
    for polyline in pp.iter_mut() {
        if polyline.len() < 2 || polyline.length() < length * TAPER_MIN_LENGTH_RATIO {
            continue;
        }
        if polyline.endpoints.0 {
            taper_start(polyline, min_size, length, resolution);
        }
        if polyline.endpoints.1 {
            polyline.reverse();
            taper_start(polyline, min_size, length, resolution);
            polyline.reverse();
        }
    }
}

pub(crate) fn cap_width(pp: &mut [ThickPolyline], max_width: CoordF) {
    for polyline in pp.iter_mut() {
        for w in &mut polyline.width {
            *w = w.min(max_width);
        }
    }
}
