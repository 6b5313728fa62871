//! From Voronoi edges to the initial set of thick polylines.
//!
//! Edges are filtered (shared generating segment, too thick on both ends,
//! leaving the polygon), keyed into a graph by their rounded endpoints and
//! stitched into maximal chains. Chains end at free termini (no further
//! neighbour) or at junctions (two or more neighbours).

use super::voronoi::VoronoiDiagram;
use super::MedialAxisParams;
use crate::geometry::{orientation, ExPolygon, Orientation, Point, ThickPolyline, ThickPolylines};
use crate::CoordF;
use std::collections::{HashMap, HashSet};

/// Edges whose both ends are thicker than `max_width` times this are not
/// part of the thin-feature skeleton.
const MAX_WIDTH_SLACK: CoordF = 1.05;

/// Boundary samples per `max_width`.
const SAMPLES_PER_MAX_WIDTH: CoordF = 8.0;

/// Sampling step used for the Voronoi sites of a region.
pub(crate) fn sampling_step(params: &MedialAxisParams) -> CoordF {
    (params.max_width / SAMPLES_PER_MAX_WIDTH).max(1_000.0)
}

#[derive(Debug, Default)]
struct Node {
    width: CoordF,
    edges: Vec<usize>,
}

/// Undirected skeleton graph keyed by rounded Voronoi vertex.
#[derive(Debug, Default)]
struct Graph {
    nodes: HashMap<Point, Node>,
    edges: Vec<(Point, Point)>,
}

impl Graph {
    fn add_edge(&mut self, a: Point, b: Point) {
        let id = self.edges.len();
        self.edges.push((a, b));
        if let Some(node) = self.nodes.get_mut(&a) {
            node.edges.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.edges.push(id);
        }
    }

    fn other_end(&self, edge: usize, node: Point) -> Point {
        let (a, b) = self.edges[edge];
        if a == node {
            b
        } else {
            a
        }
    }

    fn width(&self, p: &Point) -> CoordF {
        self.nodes.get(p).map_or(0.0, |n| n.width)
    }

    /// Follow single-neighbour nodes from `node`, arriving via `from`.
    /// Returns true when the walk ended on a free terminus.
    fn walk(&self, mut node: Point, mut from: usize, consumed: &mut [bool], out: &mut Vec<Point>) -> bool {
        loop {
            let Some(n) = self.nodes.get(&node) else {
                return true;
            };
            let mut others = n.edges.iter().copied().filter(|&e| e != from);
            let (Some(next), None) = (others.next(), others.next()) else {
                // zero neighbours left is a free end, several is a junction
                return n.edges.iter().all(|&e| e == from);
            };
            if consumed[next] {
                // closed a loop
                return false;
            }
            consumed[next] = true;
            node = self.other_end(next, node);
            out.push(node);
            from = next;
        }
    }

    fn stitch(&self) -> ThickPolylines {
        let mut consumed = vec![false; self.edges.len()];
        let mut out = Vec::new();
        for e in 0..self.edges.len() {
            if consumed[e] {
                continue;
            }
            consumed[e] = true;
            let (a, b) = self.edges[e];

            let mut forward = vec![b];
            let end_free = self.walk(b, e, &mut consumed, &mut forward);
            let mut backward = vec![a];
            let start_free = self.walk(a, e, &mut consumed, &mut backward);

            backward.reverse();
            backward.extend(forward);
            let widths = backward.iter().map(|p| self.width(p)).collect();
            let mut polyline = ThickPolyline::from_parts(backward, widths, (start_free, end_free));
            if polyline.is_loop() {
                polyline.endpoints = (false, false);
            }
            out.push(polyline);
        }
        out
    }
}

/// Build the raw skeleton of `expolygon` from its Voronoi diagram.
pub(crate) fn skeleton(expolygon: &ExPolygon, params: &MedialAxisParams) -> ThickPolylines {
    let step = sampling_step(params);
    let diagram = VoronoiDiagram::build(expolygon, step);
    if diagram.edges.is_empty() {
        log::debug!("medial axis: empty Voronoi diagram");
        return Vec::new();
    }

    // Local thickness at each Voronoi vertex: twice the distance to the
    // nearest generating segment.
    let thickness: Vec<CoordF> = diagram
        .vertices
        .iter()
        .map(|v| {
            let mut d = CoordF::INFINITY;
            for &s in &v.sites {
                for &seg in &diagram.sites[s].segments {
                    if let Some(line) = diagram.lines.get(seg) {
                        d = d.min(v.position.distance_to_segment(&line.a.to_f64(), &line.b.to_f64()));
                    }
                }
            }
            2.0 * d
        })
        .collect();

    let mut graph = Graph::default();
    let mut inside_cache: HashMap<Point, bool> = HashMap::new();
    let mut is_inside = |p: Point| *inside_cache.entry(p).or_insert_with(|| expolygon.contains_b(&p));
    let mut seen = HashSet::new();
    let limit = params.max_width * MAX_WIDTH_SLACK;

    for edge in &diagram.edges {
        let (su, sv) = (&diagram.sites[edge.sites[0]], &diagram.sites[edge.sites[1]]);
        if su.shares_segment(sv) {
            continue;
        }
        let (wa, wb) = (thickness[edge.from], thickness[edge.to]);
        if wa > limit && wb > limit {
            log::trace!("medial axis: edge rejected, too thick ({wa:.0}, {wb:.0})");
            continue;
        }
        let a = Point::from_f64(diagram.vertices[edge.from].position);
        let b = Point::from_f64(diagram.vertices[edge.to].position);
        if a == b {
            // cocircular sites: both vertices become one node
            merge_node(&mut graph, a, wa.min(wb));
            continue;
        }
        if !is_inside(a) || !is_inside(b) || !expolygon.contains_b(&a.interpolate(0.5, &b)) {
            log::trace!("medial axis: edge rejected, outside the polygon");
            continue;
        }
        merge_node(&mut graph, a, wa);
        merge_node(&mut graph, b, wb);
        let key = if a < b { (a, b) } else { (b, a) };
        if seen.insert(key) {
            graph.add_edge(a, b);
        }
    }

    let mut polylines = graph.stitch();
    snap_corner_spurs(&mut polylines, expolygon, step);
    for polyline in &mut polylines {
        polyline.simplify(params.resolution);
    }
    polylines.retain(ThickPolyline::is_valid);
    log::debug!(
        "medial axis: {} skeleton edges stitched into {} polylines",
        graph.edges.len(),
        polylines.len()
    );
    polylines
}

fn merge_node(graph: &mut Graph, p: Point, width: CoordF) {
    graph
        .nodes
        .entry(p)
        .and_modify(|n| n.width = n.width.min(width))
        .or_insert(Node {
            width,
            edges: Vec::new(),
        });
}

/// Convex polygon vertices, i.e. left turns on correctly oriented rings.
fn convex_vertices(expolygon: &ExPolygon) -> Vec<Point> {
    let mut out = Vec::new();
    for ring in std::iter::once(&expolygon.contour).chain(expolygon.holes.iter()) {
        let pts = ring.points();
        let n = pts.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            if orientation(prev, pts[i], next) == Orientation::CounterClockwise {
                out.push(pts[i]);
            }
        }
    }
    out
}

/// Sampled sites stop a corner bisector one sample short of the vertex.
/// Extend such spurs onto the convex vertex with zero width.
fn snap_corner_spurs(polylines: &mut ThickPolylines, expolygon: &ExPolygon, step: CoordF) {
    let corners = convex_vertices(expolygon);
    if corners.is_empty() {
        return;
    }
    let reach = 1.5 * step;
    let snap = |end: Point, width: CoordF| -> Option<Point> {
        if width >= 2.0 * step {
            return None;
        }
        corners
            .iter()
            .copied()
            .filter(|c| c.distance(&end) <= reach)
            .min_by(|a, b| a.distance(&end).total_cmp(&b.distance(&end)))
            .filter(|c| *c != end)
    };
    for polyline in polylines.iter_mut() {
        if polyline.len() < 2 {
            continue;
        }
        if polyline.endpoints.1 {
            if let Some(c) = snap(polyline.last_point(), polyline.width[polyline.len() - 1]) {
                polyline.push(c, 0.0);
            }
        }
        if polyline.endpoints.0 {
            if let Some(c) = snap(polyline.first_point(), polyline.width[0]) {
                polyline.points.insert(0, c);
                polyline.width.insert(0, 0.0);
            }
        }
    }
}
