//! Turning variable-width centerlines into constant-width extrusion paths.
//!
//! A linear move extrudes at one rate, so every thick polyline is cut into
//! pieces whose width varies by less than the tolerance. Consecutive pieces
//! of similar width are then merged back into one path.

use super::{ExtrusionEntityCollection, ExtrusionLoop, ExtrusionLoopRole, ExtrusionPath, ExtrusionRole};
use crate::flow::Flow;
use crate::geometry::{Polyline, ThickLine, ThickPolyline};
use crate::{CoordF, SCALED_EPSILON, SCALING_FACTOR};
use std::f64::consts::PI;

/// Width step (scaled) below which two widths print the same.
const WIDTH_TOLERANCE: CoordF = 4.0 * SCALED_EPSILON as CoordF;

/// Upper bound on the pieces one segment is cut into.
const MAX_SUBDIVISIONS: usize = 16_000;

/// Cut the segments of `polyline` so that each piece has a nearly constant
/// width.
pub fn discretize(polyline: &ThickPolyline) -> Vec<ThickLine> {
    let mut out = Vec::new();
    for line in polyline.thicklines() {
        let length = line.length();
        if length < SCALED_EPSILON as CoordF {
            continue;
        }
        let delta = (line.b_width - line.a_width).abs();
        let segments = (delta / WIDTH_TOLERANCE).ceil() as usize;
        if segments > 2 {
            let segments = segments.min(MAX_SUBDIVISIONS);
            let mut prev = line.a;
            let mut prev_width = line.a_width;
            for j in 1..=segments {
                let t = j as CoordF / segments as CoordF;
                let (p, w) = if j == segments {
                    (line.b, line.b_width)
                } else {
                    (line.a.interpolate(t, &line.b), line.a_width + t * (line.b_width - line.a_width))
                };
                out.push(ThickLine::new(prev, p, prev_width, w));
                prev = p;
                prev_width = w;
            }
        } else if delta > 0.0 {
            // two constant-width halves
            let mid = line.a.interpolate(0.5, &line.b);
            out.push(ThickLine::new(line.a, mid, line.a_width, line.a_width));
            out.push(ThickLine::new(mid, line.b, line.b_width, line.b_width));
        } else {
            out.push(line);
        }
    }
    out
}

/// Flow of a bead filling a centerline of local width `width` (scaled).
fn bead_flow(width: CoordF, role: ExtrusionRole, flow: &Flow) -> Option<Flow> {
    let w = width / SCALING_FACTOR;
    if w <= 0.0 {
        return None;
    }
    if role == ExtrusionRole::GapFill {
        // gap fill widths are spacings between the neighbouring perimeters
        return flow.with_spacing(w).ok();
    }
    // Thin walls take the width as is, but a bead narrower than twice its
    // rounded ends would have no positive cross-section: blend towards the
    // spacing-based width as it shrinks.
    let min_w = flow.height() * (1.0 - PI / 4.0);
    let bead = if w >= 2.0 * min_w {
        w
    } else {
        let t = w / (2.0 * min_w);
        t * w + (1.0 - t) * (w + min_w)
    };
    flow.with_width(bead).ok()
}

/// Merge consecutive constant-width pieces into paths.
fn thick_lines_to_paths(lines: &[ThickLine], role: ExtrusionRole, flow: &Flow) -> Vec<ExtrusionPath> {
    let mut paths = Vec::new();
    let mut current: Option<(ExtrusionPath, CoordF)> = None;
    for line in lines {
        let w = line.a_width.max(line.b_width);
        if let Some((path, path_width)) = current.as_mut() {
            if (w - *path_width).abs() <= WIDTH_TOLERANCE / 2.0 && path.last_point() == Some(line.a) {
                path.polyline.push(line.b);
                continue;
            }
        }
        if let Some((path, _)) = current.take() {
            paths.push(path);
        }
        match bead_flow(w, role, flow) {
            Some(bead) => {
                let polyline = Polyline::from_points(vec![line.a, line.b]);
                current = Some((ExtrusionPath::from_flow(polyline, role, &bead), w));
            }
            None => log::trace!("variable width: no printable flow for width {w:.0}"),
        }
    }
    if let Some((path, _)) = current {
        paths.push(path);
    }
    paths
}

/// Convert medial-axis output into extrusion entities of `role`. Closed
/// polylines become loops, open ones a series of paths.
pub fn variable_width(polylines: &[ThickPolyline], role: ExtrusionRole, flow: &Flow) -> ExtrusionEntityCollection {
    let mut out = ExtrusionEntityCollection::new();
    for polyline in polylines {
        let lines = discretize(polyline);
        let paths = thick_lines_to_paths(&lines, role, flow);
        let (Some(first), Some(last)) = (
            paths.first().and_then(ExtrusionPath::first_point),
            paths.last().and_then(ExtrusionPath::last_point),
        ) else {
            continue;
        };
        if first == last {
            let loop_role = if role == ExtrusionRole::ThinWall {
                ExtrusionLoopRole::ThinWall
            } else {
                ExtrusionLoopRole::Default
            };
            out.append(ExtrusionLoop::new(paths, loop_role));
        } else {
            out.extend(paths);
        }
    }
    log::debug!(
        "variable width: {} polylines to {} {} entities",
        polylines.len(),
        out.len(),
        role
    );
    out
}
