//! Fusion passes: cleaning up the branches the raw skeleton grows towards
//! polygon corners.
//!
//! A sampled or exact Voronoi skeleton of a thin wall ends in a "Y" at every
//! blunt end: two short branches running into the corners instead of one
//! branch running to the end. These passes remove spurious branches, merge
//! the arms of such forks into a single centerline and pull junctions into
//! corners.

use super::concat::{concat_thick_polylines, end_at, End};
use super::Context;
use crate::geometry::{ExPolygon, Point, PointF, ThickPolyline, ThickPolylines};
use crate::{CoordF, SCALED_EPSILON};
use std::f64::consts::{FRAC_PI_2, PI};

/// Spur/contour alignment above which a curve spur is kept.
const CURVE_ALIGNED_DOT: CoordF = 0.15;
/// Contour-angle coefficient above which a curve spur is kept.
const CURVE_ANGLE_COEFF: CoordF = 0.2;
/// Largest |Σ dot| between a removable spur and the two other branches.
const CURVE_SUM_DOT: CoordF = 0.2;
/// Largest min |dot| between a removable spur and the two other branches.
const CURVE_MIN_DOT: CoordF = 0.5;

/// Alignment assumed for both arms when no main branch exists.
const MAIN_BRANCH_DOT: CoordF = 0.707;
/// Arms less aligned with the main branch than this are never merged.
const MIN_BRANCH_DOT: CoordF = 0.1;
/// Allowed alignment asymmetry between arms of disproportionate length.
const BRANCH_DOT_SYMMETRY: CoordF = 0.2;
/// Length ratio above which arms must be symmetric to merge.
const LENGTH_RATIO_CAP: CoordF = 1.42;
/// Merged widths stay within this factor of the main branch width.
const MAIN_WIDTH_SLACK: CoordF = 1.1;
/// Corner pull per unit of spur length, at a right-angle corner.
const CORNER_PULL: CoordF = 0.144;

#[inline]
fn direction(from: Point, to: Point) -> PointF {
    (to - from).to_f64().normalize()
}

/// Direction in which `polyline` leaves its end `end`.
fn leaving(polyline: &ThickPolyline, end: End) -> PointF {
    let n = polyline.len();
    match end {
        End::First => direction(polyline.points[0], polyline.points[1]),
        End::Last => direction(polyline.points[n - 1], polyline.points[n - 2]),
    }
}

/// Flag of the end opposite to `end`.
fn far_endpoint(polyline: &ThickPolyline, end: End) -> bool {
    match end {
        End::First => polyline.endpoints.1,
        End::Last => polyline.endpoints.0,
    }
}

/// Nearest ring vertex of `expolygon` to `p`: the ring points and the index.
fn nearest_vertex<'a>(expolygon: &'a ExPolygon, p: &Point) -> Option<(&'a [Point], usize)> {
    std::iter::once(&expolygon.contour)
        .chain(expolygon.holes.iter())
        .filter(|ring| ring.len() >= 3)
        .filter_map(|ring| {
            ring.closest_point_index(p)
                .map(|i| (ring.points(), i, ring.points()[i].distance_squared(p)))
        })
        .min_by_key(|&(_, _, d)| d)
        .map(|(pts, i, _)| (pts, i))
}

/// How close to a right angle the boundary is near `p`: 1 at 90°, 0 for a
/// flat or folded-back contour. Neighbouring vertices closer than
/// `min_dist` are skipped so tiny facets do not dominate.
pub(crate) fn coeff_from_angle_contour(p: &Point, expolygon: &ExPolygon, min_dist: CoordF) -> CoordF {
    let Some((pts, idx)) = nearest_vertex(expolygon, p) else {
        return 0.0;
    };
    let n = pts.len();
    let nearest = pts[idx];

    let mut before = (idx + n - 1) % n;
    while nearest.distance(&pts[before]) < min_dist {
        before = (before + n - 1) % n;
        if before == idx {
            before = (idx + n - 1) % n;
            break;
        }
    }
    let mut after = (idx + 1) % n;
    while nearest.distance(&pts[after]) < min_dist {
        after = (after + 1) % n;
        if after == idx {
            after = (idx + 1) % n;
            break;
        }
    }

    let mut angle = nearest.ccw_angle(&pts[before], &pts[after]);
    if angle >= PI {
        angle = 2.0 * PI - angle;
    }
    1.0 - (angle - FRAC_PI_2).abs() / FRAC_PI_2
}

/// Orient `polyline` so a free zero-width end is last. Returns false if it
/// has none.
fn orient_zero_spur(polyline: &mut ThickPolyline) -> bool {
    let n = polyline.len();
    if n < 2 {
        return false;
    }
    let last_zero = polyline.endpoints.1 && polyline.width[n - 1] <= 0.0;
    let first_zero = polyline.endpoints.0 && polyline.width[0] <= 0.0;
    if first_zero && !last_zero {
        polyline.reverse();
    }
    first_zero || last_zero
}

/// Other polylines with an end on `p`, with the touching end.
fn branches_at(pp: &[ThickPolyline], skip: usize, p: &Point) -> Vec<(usize, End)> {
    pp.iter()
        .enumerate()
        .filter(|(j, other)| *j != skip && other.len() >= 2)
        .filter_map(|(j, other)| end_at(other, p).map(|e| (j, e)))
        .collect()
}

fn is_curve_spur(pp: &mut [ThickPolyline], i: usize, ctx: &Context) -> bool {
    if !orient_zero_spur(&mut pp[i]) {
        return false;
    }
    let spur = &pp[i];
    if spur.length() > ctx.params.max_width {
        return false;
    }
    let n = spur.len();
    let end = spur.points[n - 1];
    let Some((ring, idx)) = nearest_vertex(ctx.expolygon, &end) else {
        return false;
    };
    let m = ring.len();
    let (prev, next) = (ring[(idx + m - 1) % m], ring[(idx + 1) % m]);
    let spur_dir = direction(end, spur.points[n - 2]);
    let mindot = spur_dir
        .dot(&direction(ring[idx], prev))
        .abs()
        .min(spur_dir.dot(&direction(ring[idx], next)).abs());
    let contour_angle = (ring[idx].ccw_angle(&prev, &next) - FRAC_PI_2).abs();

    // only shallow contour angles, or spurs running along the contour
    if mindot > CURVE_ALIGNED_DOT && 1.0 - contour_angle / FRAC_PI_2 > CURVE_ANGLE_COEFF {
        return false;
    }

    let crossing = branches_at(&*pp, i, &spur.first_point());
    if crossing.len() != 2 {
        return false;
    }
    let root = direction(spur.points[0], spur.points[1]);
    let dots: Vec<CoordF> = crossing
        .iter()
        .map(|&(j, e)| root.dot(&leaving(&pp[j], e)))
        .collect();
    let sum_dot: CoordF = dots.iter().sum();
    let min_dot = dots.iter().map(|d| d.abs()).fold(1.0, CoordF::min);
    sum_dot.abs() <= CURVE_SUM_DOT && min_dot <= CURVE_MIN_DOT
}

/// Delete short zero-width spurs that hit a shallow contour bend at a
/// junction of three branches, then re-join the two remaining branches.
/// Runs until nothing more is removed.
pub(crate) fn fusion_curve(mut pp: ThickPolylines, ctx: &Context) -> ThickPolylines {
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < pp.len() {
            if is_curve_spur(&mut pp, i, ctx) {
                log::trace!("medial axis: curve spur removed at {:?}", pp[i].last_point());
                pp.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
        if !changed {
            return pp;
        }
        pp = concat_thick_polylines(pp);
        pp.sort_by(|a, b| a.length().total_cmp(&b.length()));
    }
}

/// Pull the junction of a short zero-width spur sitting on the outside of a
/// corner towards that corner, and drop the spur.
pub(crate) fn fusion_corners(mut pp: ThickPolylines, ctx: &Context) -> ThickPolylines {
    let mut changed = false;
    let mut i = 0;
    while i < pp.len() {
        if !orient_zero_spur(&mut pp[i]) {
            i += 1;
            continue;
        }
        let spur = &pp[i];
        let length = spur.length();
        let crossing = branches_at(&pp, i, &spur.first_point());
        if length > ctx.params.max_width || crossing.len() != 2 {
            i += 1;
            continue;
        }

        // the spur must sit on the outer side of the bend
        let (root, second) = (spur.points[0], spur.points[1]);
        let folded = |angle: CoordF| if angle >= PI { 2.0 * PI - angle } else { angle };
        let arm_point = |(j, e): (usize, End)| {
            let other = &pp[j];
            match e {
                End::First => other.points[1],
                End::Last => other.points[other.len() - 2],
            }
        };
        let angle1 = folded(root.ccw_angle(&second, &arm_point(crossing[0])));
        let angle2 = folded(root.ccw_angle(&second, &arm_point(crossing[1])));
        if angle1 + angle2 < PI {
            i += 1;
            continue;
        }
        // arms that end freely must be longer than the spur
        if crossing
            .iter()
            .any(|&(j, e)| far_endpoint(&pp[j], e) && length > pp[j].length())
        {
            i += 1;
            continue;
        }

        let min_dist = ctx.params.min_width.min(length / 2.0);
        let pull = length * CORNER_PULL * coeff_from_angle_contour(&spur.last_point(), ctx.expolygon, min_dist);
        let offset = direction(root, second) * pull;
        let delta = Point::from_f64(offset);
        for &(j, e) in &crossing {
            let other = &mut pp[j];
            let k = match e {
                End::First => 0,
                End::Last => other.len() - 1,
            };
            other.points[k] += delta;
        }
        log::trace!("medial axis: corner junction pulled by {pull:.0}");
        pp.remove(i);
        changed = true;
    }
    if changed {
        pp = concat_thick_polylines(pp);
        pp.sort_by(|a, b| a.length().total_cmp(&b.length()));
    }
    pp
}

/// Polylines with a zero-width end first, then by increasing length.
fn sort_for_fusion(pp: &mut ThickPolylines) {
    let has_zero = |p: &ThickPolyline| {
        p.width.first().map_or(false, |&w| w <= 0.0) || p.width.last().map_or(false, |&w| w <= 0.0)
    };
    pp.sort_by(|a, b| {
        has_zero(b)
            .cmp(&has_zero(a))
            .then_with(|| a.length().total_cmp(&b.length()))
    });
}

/// A selected pair of arms to merge.
#[derive(Debug, Clone, Copy)]
struct Fusion {
    poly: usize,
    candidate: usize,
    dot_poly: CoordF,
    dot_candidate: CoordF,
    main: Option<usize>,
    main_is_junction: bool,
}

/// Reverse `pp[i]` and `pp[j]` so they both start at their shared point.
fn orient_pair(pp: &mut [ThickPolyline], i: usize, j: usize) -> bool {
    let (pi_first, pi_last) = (pp[i].first_point(), pp[i].last_point());
    let (pj_first, pj_last) = (pp[j].first_point(), pp[j].last_point());
    if pi_last.coincides_with_epsilon(&pj_last) {
        pp[i].reverse();
        pp[j].reverse();
    } else if pi_first.coincides_with_epsilon(&pj_last) {
        pp[j].reverse();
    } else if pi_first.coincides_with_epsilon(&pj_first) {
    } else if pi_last.coincides_with_epsilon(&pj_first) {
        pp[i].reverse();
    } else {
        return false;
    }
    true
}

fn spur_coeff(polyline: &ThickPolyline, ctx: &Context, min_dist: CoordF) -> CoordF {
    if polyline.width[polyline.len() - 1] <= 0.0 {
        0.1 + 0.9 * coeff_from_angle_contour(&polyline.last_point(), ctx.expolygon, min_dist)
    } else {
        1.0
    }
}

fn find_fusion(pp: &mut ThickPolylines, ctx: &Context) -> Option<Fusion> {
    let max_width = ctx.params.max_width;
    let min_width = ctx.params.min_width;
    for i in 0..pp.len() {
        if pp[i].len() < 2 || !(pp[i].endpoints.0 || pp[i].endpoints.1) {
            continue;
        }
        let mut best: Option<(CoordF, Fusion)> = None;
        for j in (i + 1)..pp.len() {
            if pp[j].len() < 2 || !orient_pair(pp, i, j) {
                continue;
            }
            let (poly, other) = (&pp[i], &pp[j]);
            if !poly.endpoints.1 || !other.endpoints.1 {
                continue;
            }
            let (np, no) = (poly.len(), other.len());
            // merged width would be too large
            if poly.points[np - 1].distance(&other.points[no - 1])
                + (poly.width[np - 1] + other.width[no - 1]) / 4.0
                > max_width * 1.05
            {
                continue;
            }
            let (lp, lo) = (poly.length(), other.length());
            if (lp - lo).abs() > max_width {
                continue;
            }
            let coeff_poly = spur_coeff(poly, ctx, min_width.min(lp / 2.0));
            let coeff_other = spur_coeff(other, ctx, min_width.min(lo / 2.0));
            if (lp * coeff_poly - lo * coeff_other).abs() > max_width / 2.0 {
                continue;
            }
            let mut test_dot = direction(poly.points[0], poly.points[1])
                .dot(&direction(other.points[0], other.points[1]));

            // the branch the two arms fork from
            let junction = poly.first_point();
            let mut main_is_junction = false;
            let mut main: Option<usize> = None;
            let mut main_length = 0.0;
            for (k, e) in branches_at(&*pp, i, &junction) {
                if k == j {
                    continue;
                }
                let candidate = &pp[k];
                if !far_endpoint(candidate, e) {
                    main_is_junction = true;
                    main = Some(k);
                    break;
                }
                let l = candidate.length();
                if l > main_length {
                    main_length = l;
                    main = Some(k);
                }
            }
            let (poly, other) = (&pp[i], &pp[j]);

            let (mut dot_poly, mut dot_other) = (MAIN_BRANCH_DOT, MAIN_BRANCH_DOT);
            if let Some(k) = main {
                let main_branch = &pp[k];
                let main_end = end_at(main_branch, &junction).unwrap_or(End::First);
                let main_far_width = match main_end {
                    End::First => main_branch.width[main_branch.len() - 1],
                    End::Last => main_branch.width[0],
                };
                let lm = main_branch.length();
                let weaker_than = |l: CoordF, w_end: CoordF| l > lm && (w_end > 0.0 || main_far_width <= 0.0);
                if !main_is_junction
                    && (weaker_than(lp, poly.width[np - 1]) || weaker_than(lo, other.width[no - 1]))
                {
                    // the main branch should be the longest or continue elsewhere
                    continue;
                }
                let main_dir = leaving(main_branch, main_end);
                dot_poly = (-direction(poly.points[0], poly.points[1]).dot(&main_dir)).max(0.0);
                dot_other = (-direction(other.points[0], other.points[1]).dot(&main_dir)).max(0.0);
                if main_far_width > 0.0 {
                    test_dot += 2.0 * dot_poly;
                }
            }

            // merge "Y" forks, not "T" junctions
            let ratio = if lp > lo { lp / lo.max(1.0) } else { lo / lp.max(1.0) };
            if dot_poly < MIN_BRANCH_DOT
                || dot_other < MIN_BRANCH_DOT
                || (ratio > LENGTH_RATIO_CAP && (dot_poly - dot_other).abs() > BRANCH_DOT_SYMMETRY)
            {
                continue;
            }
            if best.map_or(true, |(d, _)| test_dot > d) {
                best = Some((
                    test_dot,
                    Fusion {
                        poly: i,
                        candidate: j,
                        dot_poly,
                        dot_candidate: dot_other,
                        main,
                        main_is_junction,
                    },
                ));
            }
        }
        if let Some((_, fusion)) = best {
            return Some(fusion);
        }
    }
    None
}

/// Cumulative arc length at every vertex.
fn arc_lengths(polyline: &ThickPolyline) -> Vec<CoordF> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(polyline.len());
    out.push(0.0);
    for w in polyline.points.windows(2) {
        acc += w[0].distance(&w[1]);
        out.push(acc);
    }
    out
}

/// Position and width at arc length `d`.
fn sample(polyline: &ThickPolyline, cum: &[CoordF], d: CoordF) -> (PointF, CoordF) {
    let n = polyline.len();
    let k = cum.partition_point(|&c| c < d).clamp(1, n - 1);
    let seg = cum[k] - cum[k - 1];
    let t = if seg > 0.0 { ((d - cum[k - 1]) / seg).clamp(0.0, 1.0) } else { 1.0 };
    let a = polyline.points[k - 1].to_f64();
    let b = polyline.points[k].to_f64();
    let w = polyline.width[k - 1] + (polyline.width[k] - polyline.width[k - 1]) * t;
    (a + (b - a) * t, w)
}

fn apply_fusion(pp: &mut ThickPolylines, f: Fusion, ctx: &Context) {
    let (i, j) = (f.poly, f.candidate);
    if !orient_pair(pp, i, j) {
        return;
    }
    let max_width = ctx.params.max_width;
    let min_width = ctx.params.min_width;
    let junction = pp[i].first_point();
    let main_width = f.main.and_then(|k| {
        let m = &pp[k];
        match end_at(m, &junction)? {
            End::First => m.width.first().copied(),
            End::Last => m.width.last().copied(),
        }
    });

    let poly = &pp[i];
    let cand = &pp[j];
    let (lp, lc) = (poly.length(), cand.length());
    let biggest = lp.max(lc).max(1.0);
    let angle_poly = coeff_from_angle_contour(&poly.last_point(), ctx.expolygon, min_width.min(lp / 2.0));
    let angle_cand = coeff_from_angle_contour(&cand.last_point(), ctx.expolygon, min_width.min(lc / 2.0));
    // shorter arms pull a little harder, which keeps the result near the center
    let weight_poly = (2.0 - lp / biggest) * angle_poly;
    let weight_cand = (2.0 - lc / biggest) * angle_cand;
    let denom = f.dot_poly * weight_poly + f.dot_candidate * weight_cand;
    let coeff_poly = if denom > 0.0 {
        f.dot_poly * weight_poly / denom
    } else {
        0.5
    };
    let coeff_cand = 1.0 - coeff_poly;
    let dot_max = f.dot_poly.max(f.dot_candidate).max(CoordF::EPSILON);
    let dot_min = f.dot_poly.min(f.dot_candidate);

    // pair the two arms by distance from the junction
    let cum_p = arc_lengths(poly);
    let cum_c = arc_lengths(cand);
    let limit = lp.min(lc);
    let mut stations: Vec<CoordF> = cum_p
        .iter()
        .chain(cum_c.iter())
        .copied()
        .filter(|&d| d > 0.0 && d < limit)
        .collect();
    stations.push(limit);
    stations.sort_by(|a, b| a.total_cmp(b));
    stations.dedup_by(|a, b| (*a - *b).abs() < SCALED_EPSILON as CoordF);

    let mut merged = ThickPolyline::from_parts(vec![junction], vec![poly.width[0]], (poly.endpoints.0, true));
    for d in stations {
        let (p, wp) = sample(poly, &cum_p, d);
        let (c, wc) = sample(cand, &cum_c, d);
        let point = p * coeff_poly + c * coeff_cand;

        let from_widths = 0.5 * wp * f.dot_poly / dot_max + 0.5 * wc * f.dot_candidate / dot_max;
        let from_distance = 2.0 * p.distance(&c) * (dot_min / dot_max).sqrt();
        let mut width = from_widths.max(from_distance).min(max_width);
        if let Some(mw) = main_width.filter(|&w| w > 0.0) {
            let dist = junction.to_f64().distance(&point);
            width = width.min((mw * mw + dist * dist).sqrt());
            if f.main_is_junction {
                width = width.min(mw * MAIN_WIDTH_SLACK);
            }
        }
        merged.push(Point::from_f64(point), width);
    }

    // the longer arm continues past the paired part
    let (longer, cum) = if lp > lc { (poly, &cum_p) } else { (cand, &cum_c) };
    for (k, &d) in cum.iter().enumerate() {
        if d > limit + SCALED_EPSILON as CoordF {
            merged.push(longer.points[k], longer.width[k]);
        }
    }
    merged.endpoints.1 = longer.endpoints.1;

    // clean up coincident points and anything pushed outside the bounds
    let mut cleaned = ThickPolyline::from_parts(Vec::new(), Vec::new(), merged.endpoints);
    for (k, (&p, &w)) in merged.points.iter().zip(merged.width.iter()).enumerate() {
        if !ctx.bounds.contains_b(&p) {
            continue;
        }
        match cleaned.points.last() {
            Some(last) if last.coincides_with_epsilon(&p) => {
                // keep the later width at the far end
                if k + 1 == merged.len() {
                    let n = cleaned.len();
                    cleaned.points[n - 1] = p;
                    cleaned.width[n - 1] = w;
                }
            }
            _ => cleaned.push(p, w),
        }
    }

    log::trace!(
        "medial axis: fused arms of {:.0} and {:.0} at {:?}",
        lp,
        lc,
        junction
    );
    let (hi, lo) = if i > j { (i, j) } else { (j, i) };
    pp.remove(hi);
    pp.remove(lo);
    if cleaned.len() >= 2 {
        pp.push(cleaned);
    }
}

/// Merge pairs of arms that fork from a common junction into one
/// centerline, until no mergeable pair is left. Every merge removes at least
/// one polyline.
pub(crate) fn main_fusion(mut pp: ThickPolylines, ctx: &Context) -> ThickPolylines {
    loop {
        pp = concat_thick_polylines(pp);
        sort_for_fusion(&mut pp);
        match find_fusion(&mut pp, ctx) {
            Some(fusion) => apply_fusion(&mut pp, fusion, ctx),
            None => return pp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::medial_axis::MedialAxisParams;

    fn square(size: i64) -> ExPolygon {
        ExPolygon::new(Polygon::rectangle(Point::new(0, 0), Point::new(size, size)))
    }

    fn tp(points: &[(i64, i64)], width: &[f64], endpoints: (bool, bool)) -> ThickPolyline {
        ThickPolyline::from_parts(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            width.to_vec(),
            endpoints,
        )
    }

    #[test]
    fn test_coeff_right_angle_and_flat() {
        let sq = square(1_000_000);
        let c = coeff_from_angle_contour(&Point::new(10, 10), &sq, 0.0);
        assert!((c - 1.0).abs() < 1e-9);

        // a vertex in the middle of a straight edge is flat
        let flat = ExPolygon::new(Polygon::from_points(vec![
            Point::new(0, 0),
            Point::new(500_000, 0),
            Point::new(1_000_000, 0),
            Point::new(1_000_000, 1_000_000),
            Point::new(0, 1_000_000),
        ]));
        let c = coeff_from_angle_contour(&Point::new(500_000, 10), &flat, 0.0);
        assert!(c.abs() < 1e-9);
    }

    #[test]
    fn test_main_fusion_merges_symmetric_fork() {
        // a strip end: the centerline forks into two arms reaching the corners
        let bounds = ExPolygon::new(Polygon::rectangle(Point::new(-5_000_000, 0), Point::new(400_000, 400_000)));
        let params = MedialAxisParams::new(50_000.0, 600_000.0, 200_000.0);
        let ctx = Context {
            expolygon: &bounds,
            bounds: &bounds,
            params: &params,
        };
        let pp = vec![
            tp(&[(-4_000_000, 200_000), (200_000, 200_000)], &[400_000.0, 400_000.0], (true, false)),
            tp(&[(200_000, 200_000), (400_000, 400_000)], &[400_000.0, 0.0], (false, true)),
            tp(&[(200_000, 200_000), (400_000, 0)], &[400_000.0, 0.0], (false, true)),
        ];
        let out = main_fusion(pp, &ctx);
        assert_eq!(out.len(), 1);
        let line = &out[0];
        // the merged end lies on the center line
        let end = if line.last_point().x > line.first_point().x {
            line.last_point()
        } else {
            line.first_point()
        };
        assert!((end.y - 200_000).abs() < 1_000);
        assert!(line.width.iter().all(|&w| w <= 600_000.0));
    }

    #[test]
    fn test_fusion_corners_pulls_junction() {
        let sq = square(2_000_000);
        let params = MedialAxisParams::new(50_000.0, 600_000.0, 200_000.0);
        let ctx = Context {
            expolygon: &sq,
            bounds: &sq,
            params: &params,
        };
        // an "L" centerline with a short spur at its outer corner
        let pp = vec![
            tp(&[(1_000_000, 200_000), (1_700_000, 200_000)], &[300_000.0, 300_000.0], (true, false)),
            tp(&[(1_700_000, 200_000), (1_700_000, 1_000_000)], &[300_000.0, 300_000.0], (false, true)),
            tp(&[(1_700_000, 200_000), (2_000_000, 0)], &[300_000.0, 0.0], (false, true)),
        ];
        let out = fusion_corners(pp, &ctx);
        assert_eq!(out.len(), 1);
        let corner = out[0].points[1];
        assert!(corner.x > 1_700_000 && corner.y < 200_000);
    }
}
