//! Extending free ends to the region boundary and into anchors.

use super::Context;
use crate::geometry::{ExPolygon, Line, Point, ThickPolyline, ThickPolylines};
use crate::{CoordF, SCALED_RESOLUTION};
use std::f64::consts::PI;

/// Smallest angle between the polyline and an anchor for the end to be
/// redirected towards that anchor.
const ANCHOR_MIN_ANGLE: CoordF = 2.0 * PI / 3.0;

/// Closest intersection of `line` with any ring of `expolygon`, measured
/// from `line.a`.
fn first_intersection(expolygon: &ExPolygon, line: &Line) -> Option<Point> {
    std::iter::once(&expolygon.contour)
        .chain(expolygon.holes.iter())
        .filter_map(|ring| ring.first_intersection(line))
        .min_by_key(|p| p.distance_squared(&line.a))
}

/// Extend the last point of `polyline` up to the boundary of the region,
/// then on to the bounds or into an anchor.
fn extend_end(polyline: &mut ThickPolyline, ctx: &Context, anchors: &[ExPolygon]) {
    let n = polyline.len();
    if n < 2 || !polyline.endpoints.1 {
        return;
    }
    let end = polyline.last_point();
    if ctx.bounds.has_boundary_point(&end) {
        return;
    }
    let end_width = polyline.width[n - 1];

    // Direction from the last segment long enough to be meaningful.
    let mut start = n - 2;
    let mut line = Line::new(polyline.points[start], end);
    while line.length() < SCALED_RESOLUTION as CoordF && start > 0 {
        start -= 1;
        line.a = polyline.points[start];
    }
    if n == 2 && ctx.expolygon.contains_point(&line.midpoint()) {
        line.a = line.midpoint();
    }
    line.extend_end(ctx.params.max_width);

    let new_back = if ctx.expolygon.has_boundary_point(&end) {
        end
    } else {
        let p = match first_intersection(ctx.expolygon, &line) {
            Some(p) => p,
            None if ctx.expolygon.contains_point(&line.b) => line.b,
            None => return,
        };
        polyline.push(p, end_width);
        p
    };

    let mut new_bound = match first_intersection(ctx.bounds, &line) {
        Some(p) => p,
        None => {
            if line.b.coincides_with_epsilon(&polyline.last_point()) {
                return;
            }
            if !anchors.iter().any(|a| a.contains_point(&line.b)) {
                log::warn!(
                    "medial axis: extension of ({}, {}) leaves the bounds without reaching an anchor",
                    end.x,
                    end.y
                );
                return;
            }
            line.b
        }
    };

    // Prefer heading into a nearby anchor when the line is not pointing
    // back at it.
    let mut best: Option<(Point, CoordF)> = None;
    for anchor in anchors {
        let center = anchor.contour.centroid();
        let dist = new_bound.distance(&center) + new_back.distance(&center);
        let mut angle = new_back.ccw_angle(&center, &line.a);
        if angle > PI {
            angle = 2.0 * PI - angle;
        }
        if dist < ctx.params.max_width && angle > ANCHOR_MIN_ANGLE && best.map_or(true, |(_, d)| dist < d) {
            best = Some((center, dist));
        }
    }
    if let Some((center, _)) = best {
        let target = Point::new((center.x + new_bound.x) / 2, (center.y + new_bound.y) / 2);
        let mut redirect = Line::new(new_back, target);
        redirect.extend_end(ctx.params.max_width);
        if let Some(p) = ctx.bounds.contour.first_intersection(&redirect) {
            new_bound = p;
        }
    }

    if new_bound.coincides_with_epsilon(&new_back) {
        return;
    }
    polyline.push(new_bound, end_width);
}

/// Extend both free ends of every polyline.
pub(crate) fn extend_line_both_side(mut pp: ThickPolylines, ctx: &Context, anchors: &[ExPolygon]) -> ThickPolylines {
    for polyline in &mut pp {
        extend_end(polyline, ctx, anchors);
        if !polyline.is_empty() {
            polyline.reverse();
            extend_end(polyline, ctx, anchors);
            polyline.reverse();
        }
    }
    pp.retain(|p| !p.is_empty());
    pp
}
