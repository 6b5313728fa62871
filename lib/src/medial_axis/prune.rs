//! Pruning passes: too thin ends, too thin interior points, too short
//! dangling polylines.

use super::concat::concat_thick_polylines;
use super::Context;
use crate::geometry::{ThickPolyline, ThickPolylines};
use crate::CoordF;

/// Strip the thin points off the first end. Returns true if anything changed.
fn trim_thin_start(polyline: &mut ThickPolyline, min_width: CoordF, resolution: CoordF) -> bool {
    let mut changed = false;
    while polyline.len() > 1 && polyline.width[0] < min_width {
        let (w0, w1) = (polyline.width[0], polyline.width[1]);
        if w1 > min_width {
            // the threshold is crossed inside the first segment
            let t = (min_width - w0) / (w1 - w0);
            let (p0, p1) = (polyline.points[0], polyline.points[1]);
            if p0.distance(&p1) * (1.0 - t) > resolution {
                polyline.points[0] = p0.interpolate(t, &p1);
                polyline.width[0] = min_width;
            } else {
                polyline.points.remove(0);
                polyline.width.remove(0);
            }
            return true;
        }
        polyline.points.remove(0);
        polyline.width.remove(0);
        changed = true;
    }
    changed
}

/// Cut the free ends of every polyline where they are narrower than
/// `min_width`.
pub(crate) fn remove_too_thin_extrusion(mut pp: ThickPolylines, ctx: &Context) -> ThickPolylines {
    let min_width = ctx.params.min_width;
    let max_width = ctx.params.max_width;
    let resolution = ctx.params.resolution as CoordF;
    let mut any_change = false;

    pp.retain_mut(|polyline| {
        let mut changed = false;
        if polyline.endpoints.0 {
            changed |= trim_thin_start(polyline, min_width, resolution);
        }
        if polyline.endpoints.1 {
            polyline.reverse();
            changed |= trim_thin_start(polyline, min_width, resolution);
            polyline.reverse();
        }
        any_change |= changed;
        polyline.len() >= 2 && !(changed && polyline.len() == 2 && polyline.length() < max_width)
    });

    if any_change {
        concat_thick_polylines(pp)
    } else {
        pp
    }
}

/// Split polylines at interior points narrower than `min_width`. The new
/// ends are free.
pub(crate) fn remove_too_thin_points(pp: ThickPolylines, ctx: &Context) -> ThickPolylines {
    let min_width = ctx.params.min_width;
    let mut out = Vec::with_capacity(pp.len());
    for polyline in pp {
        if polyline.width.iter().all(|&w| w >= min_width) {
            out.push(polyline);
            continue;
        }
        let n = polyline.len();
        let mut run_start: Option<usize> = None;
        for i in 0..=n {
            let thick = i < n && polyline.width[i] >= min_width;
            match (thick, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    run_start = None;
                    if i - start < 2 {
                        continue;
                    }
                    let first_free = if start == 0 { polyline.endpoints.0 } else { true };
                    let last_free = if i == n { polyline.endpoints.1 } else { true };
                    out.push(ThickPolyline::from_parts(
                        polyline.points[start..i].to_vec(),
                        polyline.width[start..i].to_vec(),
                        (first_free, last_free),
                    ));
                }
                _ => {}
            }
        }
    }
    out
}

/// Repeatedly drop the shortest polyline with a free end that is shorter
/// than `min_length`, re-joining its neighbours afterwards.
pub(crate) fn remove_too_short_polylines(mut pp: ThickPolylines, min_length: CoordF) -> ThickPolylines {
    loop {
        let shortest = pp
            .iter()
            .enumerate()
            .filter(|(_, p)| (p.endpoints.0 || p.endpoints.1) && p.length() < min_length)
            .min_by(|(_, a), (_, b)| a.length().total_cmp(&b.length()))
            .map(|(i, _)| i);
        let Some(i) = shortest else {
            return pp;
        };
        pp.remove(i);
        pp = concat_thick_polylines(pp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ExPolygon, Point, Polygon};
    use crate::medial_axis::MedialAxisParams;

    fn tp(points: &[(i64, i64)], width: &[f64], endpoints: (bool, bool)) -> ThickPolyline {
        ThickPolyline::from_parts(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            width.to_vec(),
            endpoints,
        )
    }

    fn with_ctx<R>(f: impl FnOnce(&Context) -> R) -> R {
        let region = ExPolygon::new(Polygon::rectangle(Point::new(0, 0), Point::new(10_000_000, 10_000_000)));
        let params = MedialAxisParams::new(100_000.0, 600_000.0, 200_000.0);
        let ctx = Context {
            expolygon: &region,
            bounds: &region,
            params: &params,
        };
        f(&ctx)
    }

    #[test]
    fn test_thin_end_is_split_at_threshold() {
        let pp = vec![tp(
            &[(0, 0), (1_000_000, 0), (2_000_000, 0)],
            &[0.0, 200_000.0, 200_000.0],
            (true, false),
        )];
        let out = with_ctx(|ctx| remove_too_thin_extrusion(pp, ctx));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points[0], Point::new(500_000, 0));
        assert_eq!(out[0].width[0], 100_000.0);
        assert_eq!(out[0].len(), 3);
    }

    #[test]
    fn test_thin_stub_is_removed() {
        let pp = vec![
            tp(&[(0, 0), (100_000, 0)], &[10_000.0, 50_000.0], (true, true)),
            tp(&[(0, 1_000_000), (2_000_000, 1_000_000)], &[200_000.0, 200_000.0], (true, true)),
        ];
        let out = with_ctx(|ctx| remove_too_thin_extrusion(pp, ctx));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_point(), Point::new(0, 1_000_000));
    }

    #[test]
    fn test_thin_interior_point_splits() {
        let pp = vec![tp(
            &[(0, 0), (1_000_000, 0), (2_000_000, 0), (3_000_000, 0), (4_000_000, 0)],
            &[200_000.0, 200_000.0, 50_000.0, 200_000.0, 200_000.0],
            (false, false),
        )];
        let out = with_ctx(|ctx| remove_too_thin_points(pp, ctx));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].endpoints, (false, true));
        assert_eq!(out[1].endpoints, (true, false));
        assert_eq!(out[0].last_point(), Point::new(1_000_000, 0));
        assert_eq!(out[1].first_point(), Point::new(3_000_000, 0));
    }

    #[test]
    fn test_short_dangling_branch_removed() {
        let pp = vec![
            tp(&[(0, 0), (1_000_000, 0)], &[200_000.0; 2], (true, false)),
            tp(&[(1_000_000, 0), (2_000_000, 0)], &[200_000.0; 2], (false, true)),
            tp(&[(1_000_000, 0), (1_000_000, 100_000)], &[200_000.0; 2], (false, true)),
        ];
        let out = remove_too_short_polylines(pp, 300_000.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].length(), 2_000_000.0);
    }
}
