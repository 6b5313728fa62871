//! Voronoi diagram of sampled boundary sites.
//!
//! The polygon boundary is sampled into point sites, each remembering the
//! boundary segment(s) it was taken from. The diagram is built as the dual of
//! an incremental Bowyer-Watson Delaunay triangulation with exact
//! `orient2d`/`incircle` predicates: every triangle circumcenter is a Voronoi
//! vertex and every interior Delaunay edge yields the Voronoi edge joining the
//! circumcenters of its two triangles. Edges touching the enclosing super
//! triangle are the infinite ones and are never emitted.

use crate::geometry::{BoundingBox, ExPolygon, Line, Point, PointF};
use crate::CoordF;
use std::collections::{HashMap, HashSet};

/// Upper bound on the number of sampled sites for one region.
const MAX_SITES: usize = 20_000;

/// The super triangle is this many bounding-box sizes away from the input.
const SUPER_TRIANGLE_SCALE: CoordF = 1_000.0;

/// A sampled point of the polygon boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Site {
    pub point: Point,
    /// Boundary segments (indices into `ExPolygon::lines()`) the site lies on.
    /// Interior samples repeat the same index twice, vertices carry both
    /// adjacent segments.
    pub segments: [usize; 2],
}

impl Site {
    /// True when both sites were sampled from a common boundary segment.
    pub fn shares_segment(&self, other: &Site) -> bool {
        self.segments.iter().any(|s| other.segments.contains(s))
    }
}

/// A Voronoi vertex: the circumcenter of one Delaunay triangle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoronoiVertex {
    pub position: PointF,
    pub sites: [usize; 3],
}

/// A finite Voronoi edge between two vertices, generated by two sites.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoronoiEdge {
    pub from: usize,
    pub to: usize,
    pub sites: [usize; 2],
}

#[derive(Debug, Default)]
pub(crate) struct VoronoiDiagram {
    pub sites: Vec<Site>,
    pub lines: Vec<Line>,
    pub vertices: Vec<VoronoiVertex>,
    pub edges: Vec<VoronoiEdge>,
}

impl VoronoiDiagram {
    /// Sample the boundary of `expolygon` every `step` units and build the
    /// diagram of the samples.
    pub fn build(expolygon: &ExPolygon, step: CoordF) -> Self {
        let lines = expolygon.lines();
        let sites = sample_boundary(expolygon, step);
        if sites.len() < 3 {
            return Self {
                sites,
                lines,
                ..Self::default()
            };
        }

        let bbox = BoundingBox::from_points(&sites.iter().map(|s| s.point).collect::<Vec<_>>());
        let origin = bbox.center().to_f64();
        let local: Vec<PointF> = sites.iter().map(|s| s.point.to_f64() - origin).collect();
        let size = bbox.size();
        let extent = (size.x.max(size.y) as CoordF).max(1.0);

        let delaunay = Delaunay::triangulate(local, extent);

        let mut vertex_of_triangle = HashMap::new();
        let mut vertices = Vec::new();
        for (t, tri) in delaunay.real_triangles() {
            let [a, b, c] = tri.v;
            if let Some(center) =
                circumcenter(delaunay.points[a], delaunay.points[b], delaunay.points[c])
            {
                vertex_of_triangle.insert(t, vertices.len());
                vertices.push(VoronoiVertex {
                    position: center + origin,
                    sites: tri.v,
                });
            }
        }

        let mut edges = Vec::new();
        for (t, tri) in delaunay.real_triangles() {
            for i in 0..3 {
                let Some(u) = tri.n[i] else { continue };
                if u <= t {
                    continue;
                }
                let (Some(&from), Some(&to)) =
                    (vertex_of_triangle.get(&t), vertex_of_triangle.get(&u))
                else {
                    continue;
                };
                edges.push(VoronoiEdge {
                    from,
                    to,
                    sites: [tri.v[(i + 1) % 3], tri.v[(i + 2) % 3]],
                });
            }
        }

        log::trace!(
            "voronoi: {} sites, {} vertices, {} finite edges",
            sites.len(),
            vertices.len(),
            edges.len()
        );

        Self {
            sites,
            lines,
            vertices,
            edges,
        }
    }
}

/// Sample every ring of `expolygon`. Vertices are always sites; long edges get
/// evenly spaced interior samples no further than `step` apart.
pub(crate) fn sample_boundary(expolygon: &ExPolygon, step: CoordF) -> Vec<Site> {
    let rings: Vec<&[Point]> = std::iter::once(expolygon.contour.points())
        .chain(expolygon.holes.iter().map(|h| h.points()))
        .collect();

    let total_length: CoordF = expolygon.contour.length()
        + expolygon.holes.iter().map(|h| h.length()).sum::<CoordF>();
    let step = step.max(total_length / MAX_SITES as CoordF).max(1.0);

    let mut sites = Vec::new();
    let mut seen = HashSet::new();
    let mut base = 0;
    for ring in rings {
        let n = ring.len();
        if n < 2 {
            base += if n >= 1 { n } else { 0 };
            continue;
        }
        for k in 0..n {
            let a = ring[k];
            let b = ring[(k + 1) % n];
            let prev_segment = base + (k + n - 1) % n;
            let segment = base + k;
            if seen.insert(a) {
                sites.push(Site {
                    point: a,
                    segments: [prev_segment, segment],
                });
            }
            let count = (a.distance(&b) / step).ceil() as usize;
            for j in 1..count {
                let p = a.interpolate(j as CoordF / count as CoordF, &b);
                if seen.insert(p) {
                    sites.push(Site {
                        point: p,
                        segments: [segment, segment],
                    });
                }
            }
        }
        base += n;
    }
    sites
}

/// Circumcenter of a triangle, `None` when the points are collinear.
pub(crate) fn circumcenter(a: PointF, b: PointF, c: PointF) -> Option<PointF> {
    let (bx, by) = (b.x - a.x, b.y - a.y);
    let (cx, cy) = (c.x - a.x, c.y - a.y);
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < CoordF::EPSILON {
        return None;
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    if !ux.is_finite() || !uy.is_finite() {
        return None;
    }
    Some(PointF::new(a.x + ux, a.y + uy))
}

#[inline]
fn coord(p: PointF) -> robust::Coord<f64> {
    robust::Coord { x: p.x, y: p.y }
}

#[inline]
fn orient(a: PointF, b: PointF, c: PointF) -> f64 {
    robust::orient2d(coord(a), coord(b), coord(c))
}

/// A counter-clockwise triangle. `n[i]` is the neighbour across the edge
/// opposite `v[i]`.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    n: [Option<usize>; 3],
    alive: bool,
}

struct Delaunay {
    points: Vec<PointF>,
    triangles: Vec<Triangle>,
    /// Indices `real..real + 3` are the super triangle.
    real: usize,
}

impl Delaunay {
    /// Triangulate distinct points given in local coordinates around the
    /// origin; `extent` is the size of their bounding box.
    fn triangulate(mut points: Vec<PointF>, extent: CoordF) -> Self {
        let real = points.len();
        let m = extent * SUPER_TRIANGLE_SCALE;
        points.push(PointF::new(-2.0 * m, -m));
        points.push(PointF::new(2.0 * m, -m));
        points.push(PointF::new(0.0, 2.0 * m));

        let mut dt = Self {
            points,
            triangles: vec![Triangle {
                v: [real, real + 1, real + 2],
                n: [None; 3],
                alive: true,
            }],
            real,
        };

        let mut hint = 0;
        for idx in insertion_order(&dt.points[..real]) {
            hint = dt.insert(idx, hint);
        }
        dt
    }

    fn real_triangles(&self) -> impl Iterator<Item = (usize, &Triangle)> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.alive && t.v.iter().all(|&v| v < self.real))
    }

    fn contains(&self, t: &Triangle, p: PointF) -> bool {
        (0..3).all(|i| {
            orient(
                self.points[t.v[(i + 1) % 3]],
                self.points[t.v[(i + 2) % 3]],
                p,
            ) >= 0.0
        })
    }

    /// Visibility walk from `start`, with a linear scan as fallback.
    fn locate(&self, p: PointF, start: usize) -> Option<usize> {
        let mut t = start;
        let mut steps = 0;
        'walk: while steps <= self.triangles.len() {
            let tri = &self.triangles[t];
            if !tri.alive {
                break;
            }
            for k in 0..3 {
                let i = (k + steps) % 3;
                let a = self.points[tri.v[(i + 1) % 3]];
                let b = self.points[tri.v[(i + 2) % 3]];
                if orient(a, b, p) < 0.0 {
                    match tri.n[i] {
                        Some(next) => {
                            t = next;
                            steps += 1;
                            continue 'walk;
                        }
                        None => break 'walk,
                    }
                }
            }
            return Some(t);
        }
        self.triangles
            .iter()
            .position(|tri| tri.alive && self.contains(tri, p))
    }

    fn in_circumcircle(&self, t: usize, p: PointF) -> bool {
        let [a, b, c] = self.triangles[t].v;
        robust::incircle(
            coord(self.points[a]),
            coord(self.points[b]),
            coord(self.points[c]),
            coord(p),
        ) > 0.0
    }

    /// Insert point `idx`, returning a live triangle to start the next walk from.
    fn insert(&mut self, idx: usize, hint: usize) -> usize {
        let p = self.points[idx];
        let Some(start) = self.locate(p, hint) else {
            log::trace!("voronoi: site {idx} could not be located, skipped");
            return hint;
        };

        // Grow the cavity of triangles whose circumcircle contains p
        let mut state: HashMap<usize, bool> = HashMap::new();
        state.insert(start, true);
        let mut cavity = vec![start];
        let mut stack = vec![start];
        let mut boundary: Vec<(usize, usize, Option<usize>)> = Vec::new();
        while let Some(t) = stack.pop() {
            let tri = self.triangles[t];
            for i in 0..3 {
                let a = tri.v[(i + 1) % 3];
                let b = tri.v[(i + 2) % 3];
                let Some(u) = tri.n[i] else {
                    boundary.push((a, b, None));
                    continue;
                };
                let inside = match state.get(&u) {
                    Some(&inside) => inside,
                    None => {
                        let inside = self.in_circumcircle(u, p);
                        state.insert(u, inside);
                        if inside {
                            cavity.push(u);
                            stack.push(u);
                        }
                        inside
                    }
                };
                if !inside {
                    boundary.push((a, b, Some(u)));
                }
            }
        }

        let base = self.triangles.len();
        let mut by_start = HashMap::with_capacity(boundary.len());
        let mut by_end = HashMap::with_capacity(boundary.len());
        for (k, &(a, b, outer)) in boundary.iter().enumerate() {
            let new = base + k;
            self.triangles.push(Triangle {
                v: [a, b, idx],
                n: [None, None, outer],
                alive: true,
            });
            by_start.insert(a, new);
            by_end.insert(b, new);
            if let Some(o) = outer {
                let tri = &mut self.triangles[o];
                for j in 0..3 {
                    let x = tri.v[(j + 1) % 3];
                    let y = tri.v[(j + 2) % 3];
                    if x == b && y == a {
                        tri.n[j] = Some(new);
                    }
                }
            }
        }
        for (k, &(a, b, _)) in boundary.iter().enumerate() {
            let tri = &mut self.triangles[base + k];
            tri.n[0] = by_start.get(&b).copied();
            tri.n[1] = by_end.get(&a).copied();
        }
        for t in cavity {
            self.triangles[t].alive = false;
        }
        if boundary.is_empty() {
            hint
        } else {
            base
        }
    }
}

/// Z-order (Morton) insertion so consecutive points are spatial neighbours
/// and walks stay short.
fn insertion_order(points: &[PointF]) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }
    let (mut min_x, mut min_y) = (CoordF::INFINITY, CoordF::INFINITY);
    let (mut max_x, mut max_y) = (CoordF::NEG_INFINITY, CoordF::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let cell = |v: CoordF, min: CoordF| (((v - min) / span) * 65_535.0) as u32;

    let mut keyed: Vec<(u64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (morton(cell(p.x, min_x), cell(p.y, min_y)), i))
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, i)| i).collect()
}

fn morton(x: u32, y: u32) -> u64 {
    fn spread(v: u32) -> u64 {
        let mut v = v as u64 & 0xffff_ffff;
        v = (v | (v << 16)) & 0x0000_ffff_0000_ffff;
        v = (v | (v << 8)) & 0x00ff_00ff_00ff_00ff;
        v = (v | (v << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
        v = (v | (v << 2)) & 0x3333_3333_3333_3333;
        v = (v | (v << 1)) & 0x5555_5555_5555_5555;
        v
    }
    spread(x) | (spread(y) << 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    fn rect(w: i64, h: i64) -> ExPolygon {
        ExPolygon::new(Polygon::rectangle(Point::new(0, 0), Point::new(w, h)))
    }

    #[test]
    fn test_sample_boundary_tags_segments() {
        let sites = sample_boundary(&rect(1000, 100), 100.0);
        // corners carry two segments, edge samples one
        let corner = sites.iter().find(|s| s.point == Point::new(0, 0)).unwrap();
        assert_ne!(corner.segments[0], corner.segments[1]);
        let mid = sites.iter().find(|s| s.point == Point::new(500, 0)).unwrap();
        assert_eq!(mid.segments[0], mid.segments[1]);
        // 10 + 1 + 10 + 1 samples along the perimeter
        assert_eq!(sites.len(), 22);
    }

    #[test]
    fn test_circumcenter() {
        let c = circumcenter(
            PointF::new(0.0, 0.0),
            PointF::new(2.0, 0.0),
            PointF::new(0.0, 2.0),
        )
        .unwrap();
        assert!((c.x - 1.0).abs() < 1e-12 && (c.y - 1.0).abs() < 1e-12);
        assert!(circumcenter(
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 0.0),
            PointF::new(2.0, 0.0)
        )
        .is_none());
    }

    #[test]
    fn test_delaunay_triangle_count() {
        // n points in general position with h on the hull: 2n - h - 2 triangles
        let pts = vec![
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            PointF::new(10.0, 10.0),
            PointF::new(0.0, 10.0),
            PointF::new(4.0, 6.0),
        ];
        let dt = Delaunay::triangulate(pts, 10.0);
        assert_eq!(dt.real_triangles().count(), 4);
    }

    #[test]
    fn test_delaunay_is_empty_circle() {
        let pts: Vec<PointF> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.7;
                PointF::new(t.cos() * (10.0 + i as f64), t.sin() * (10.0 + i as f64))
            })
            .collect();
        let dt = Delaunay::triangulate(pts.clone(), 100.0);
        for (t, tri) in dt.real_triangles() {
            for (i, p) in pts.iter().enumerate() {
                if tri.v.contains(&i) {
                    continue;
                }
                assert!(!dt.in_circumcircle(t, *p));
            }
        }
    }

    #[test]
    fn test_voronoi_of_strip_has_central_edges() {
        let strip = rect(2_000_000, 400_000);
        let diagram = VoronoiDiagram::build(&strip, 50_000.0);
        assert!(!diagram.edges.is_empty());
        // cross edges between the long sides run along y = 200000
        let central = diagram
            .edges
            .iter()
            .filter(|e| {
                let a = diagram.vertices[e.from].position;
                let b = diagram.vertices[e.to].position;
                (a.y - 200_000.0).abs() < 1_000.0 && (b.y - 200_000.0).abs() < 1_000.0
            })
            .count();
        assert!(central > 10);
    }
}
