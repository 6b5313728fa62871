//! Joining thick polylines at shared endpoints.

use crate::geometry::{Point, PointF, ThickPolyline, ThickPolylines};
use crate::CoordF;

/// Which end of a polyline touches a given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    First,
    Last,
}

/// The end of `polyline` lying on `p`, if any. The last point wins ties.
pub(crate) fn end_at(polyline: &ThickPolyline, p: &Point) -> Option<End> {
    if polyline.is_empty() {
        None
    } else if polyline.last_point().coincides_with_epsilon(p) {
        Some(End::Last)
    } else if polyline.first_point().coincides_with_epsilon(p) {
        Some(End::First)
    } else {
        None
    }
}

/// Polylines (other than `skip`) that have an end on `p`, counted once each.
fn touching(pp: &[ThickPolyline], skip: usize, p: &Point) -> Vec<usize> {
    pp.iter()
        .enumerate()
        .filter(|(j, other)| *j != skip && !other.is_loop() && end_at(other, p).is_some())
        .map(|(j, _)| j)
        .collect()
}

/// Append `tail` to `head`; `tail` must start where `head` ends. The shared
/// vertex keeps the larger width.
fn append(head: &mut ThickPolyline, tail: ThickPolyline) {
    if let (Some(w), Some(&tw)) = (head.width.last_mut(), tail.width.first()) {
        *w = w.max(tw);
    }
    head.endpoints.1 = tail.endpoints.1;
    head.points.extend(tail.points.into_iter().skip(1));
    head.width.extend(tail.width.into_iter().skip(1));
}

/// Merge polylines wherever exactly two of them meet, until no such pair is
/// left. Closed results get both endpoint flags cleared.
pub(crate) fn concat_thick_polylines(mut pp: ThickPolylines) -> ThickPolylines {
    loop {
        let mut merged = false;
        for i in 0..pp.len() {
            if pp[i].len() < 2 {
                continue;
            }
            if pp[i].first_point().coincides_with_epsilon(&pp[i].last_point()) {
                pp[i].endpoints = (false, false);
                continue;
            }
            let at_last = touching(&pp, i, &pp[i].last_point());
            let at_first = touching(&pp, i, &pp[i].first_point());

            let (j, reverse_self) = if at_last.len() == 1 {
                (at_last[0], false)
            } else if at_first.len() == 1 {
                (at_first[0], true)
            } else {
                continue;
            };

            let mut other = pp.remove(j);
            let i = if j < i { i - 1 } else { i };
            if reverse_self {
                pp[i].reverse();
            }
            let junction = pp[i].last_point();
            if end_at(&other, &junction) == Some(End::Last) {
                other.reverse();
            }
            append(&mut pp[i], other);
            if pp[i].first_point().coincides_with_epsilon(&pp[i].last_point()) {
                pp[i].endpoints = (false, false);
            }
            merged = true;
            break;
        }
        if !merged {
            return pp;
        }
    }
}

/// Direction of the last segment of `polyline` leading into its last point.
fn incoming(polyline: &ThickPolyline) -> PointF {
    let n = polyline.len();
    (polyline.points[n - 1] - polyline.points[n - 2]).to_f64().normalize()
}

/// Greedily chain open polylines through junctions of any degree, picking
/// at each junction the partner that continues straightest.
pub(crate) fn concatenate_polylines_with_crossing(mut pp: ThickPolylines) -> ThickPolylines {
    let mut i = 0;
    while i < pp.len() {
        if pp[i].len() < 2 || pp[i].is_loop() || (pp[i].endpoints.0 && pp[i].endpoints.1) {
            i += 1;
            continue;
        }
        let mut best: Option<(usize, bool, CoordF)> = None;
        for j in 0..pp.len() {
            let other = &pp[j];
            if j == i || other.len() < 2 || other.is_loop() || (other.endpoints.0 && other.endpoints.1) {
                continue;
            }
            for reverse_self in [false, true] {
                let me = &pp[i];
                let (junction, arriving) = if reverse_self {
                    let mut r = me.clone();
                    r.reverse();
                    (r.last_point(), incoming(&r))
                } else {
                    (me.last_point(), incoming(me))
                };
                // a junction end is never a free terminus
                let free = if reverse_self { me.endpoints.0 } else { me.endpoints.1 };
                if free {
                    continue;
                }
                let leaving = match end_at(other, &junction) {
                    Some(End::First) if !other.endpoints.0 => {
                        (other.points[1] - other.points[0]).to_f64().normalize()
                    }
                    Some(End::Last) if !other.endpoints.1 => {
                        let n = other.len();
                        (other.points[n - 2] - other.points[n - 1]).to_f64().normalize()
                    }
                    _ => continue,
                };
                let dot = arriving.dot(&leaving);
                if best.map_or(true, |(_, _, d)| dot > d) {
                    best = Some((j, reverse_self, dot));
                }
            }
        }
        let Some((j, reverse_self, _)) = best else {
            i += 1;
            continue;
        };

        let mut other = pp.remove(j);
        if j < i {
            i -= 1;
        }
        if reverse_self {
            pp[i].reverse();
        }
        let junction = pp[i].last_point();
        if end_at(&other, &junction) == Some(End::Last) {
            other.reverse();
        }
        // the junction vertex can be wider than both sides; bring it back down
        let me = &mut pp[i];
        let n = me.len();
        if other.len() > 1 && me.width[n - 1] > me.width[n - 2] && me.width[n - 1] > other.width[1] {
            me.width[n - 1] = me.width[n - 2].min(other.width[1]);
        }
        me.endpoints.1 = other.endpoints.1;
        me.points.extend(other.points.into_iter().skip(1));
        me.width.extend(other.width.into_iter().skip(1));
        if me.first_point().coincides_with_epsilon(&me.last_point()) {
            me.endpoints = (false, false);
        }
        // retry the same polyline with its new end
    }
    concat_thick_polylines(pp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(points: &[(i64, i64)], endpoints: (bool, bool)) -> ThickPolyline {
        ThickPolyline::from_parts(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            vec![10.0; points.len()],
            endpoints,
        )
    }

    #[test]
    fn test_concat_two_at_shared_point() {
        let pp = vec![
            tp(&[(0, 0), (1000, 0)], (true, false)),
            tp(&[(2000, 0), (1000, 0)], (true, false)),
        ];
        let out = concat_thick_polylines(pp);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 3);
        assert_eq!(out[0].endpoints, (true, true));
        assert_eq!(out[0].width.len(), 3);
    }

    #[test]
    fn test_concat_leaves_junctions() {
        let pp = vec![
            tp(&[(0, 0), (1000, 0)], (true, false)),
            tp(&[(1000, 0), (2000, 0)], (false, true)),
            tp(&[(1000, 0), (1000, 1000)], (false, true)),
        ];
        assert_eq!(concat_thick_polylines(pp).len(), 3);
    }

    #[test]
    fn test_concat_closes_loop() {
        let pp = vec![
            tp(&[(0, 0), (1000, 0), (1000, 1000)], (false, false)),
            tp(&[(1000, 1000), (0, 1000), (0, 0)], (false, false)),
        ];
        let out = concat_thick_polylines(pp);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_loop());
        assert_eq!(out[0].endpoints, (false, false));
    }

    #[test]
    fn test_crossing_prefers_straight_partner() {
        // a "+" crossing: opposite arms are chained together
        let pp = vec![
            tp(&[(-1000, 0), (0, 0)], (true, false)),
            tp(&[(0, 0), (0, 1000)], (false, true)),
            tp(&[(0, 0), (1000, 0)], (false, true)),
            tp(&[(0, 0), (0, -1000)], (false, true)),
        ];
        let out = concatenate_polylines_with_crossing(pp);
        assert_eq!(out.len(), 2);
        let horizontal = out
            .iter()
            .find(|p| p.points.iter().any(|q| q.x == -1000))
            .unwrap();
        assert!(horizontal.points.iter().any(|q| q.x == 1000));
        assert_eq!(horizontal.endpoints, (true, true));
        let vertical = out.iter().find(|p| p.points.iter().any(|q| q.y == 1000)).unwrap();
        assert!(vertical.points.iter().any(|q| q.y == -1000));
    }
}
