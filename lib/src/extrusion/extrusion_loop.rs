//! Closed extrusion loops.

use super::multi_path::ExtrusionMultiPath;
use super::{ExtrusionError, ExtrusionLoopRole, ExtrusionPath, ExtrusionRole};
use crate::geometry::{Point, Polygon, Polygons, Polyline, Polylines};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// A closed chain of paths: the last point of the last path is the first
/// point of the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionLoop {
    pub paths: Vec<ExtrusionPath>,
    pub loop_role: ExtrusionLoopRole,
}

impl ExtrusionLoop {
    pub fn new(paths: Vec<ExtrusionPath>, loop_role: ExtrusionLoopRole) -> Self {
        let extrusion_loop = Self { paths, loop_role };
        debug_assert!(extrusion_loop.validate().is_ok(), "open extrusion loop");
        extrusion_loop
    }

    /// A loop made of one path, closed if it was not already.
    pub fn from_path(mut path: ExtrusionPath, loop_role: ExtrusionLoopRole) -> Self {
        if let Some(first) = path.first_point() {
            if path.last_point() != Some(first) {
                path.polyline.points_mut().push(first);
            }
        }
        Self {
            paths: vec![path],
            loop_role,
        }
    }

    /// Continuity between consecutive paths and closure of the whole loop.
    pub fn validate(&self) -> Result<(), ExtrusionError> {
        ExtrusionMultiPath::new(self.paths.clone()).validate()?;
        match (self.first_point(), self.last_point()) {
            (Some(first), Some(last)) if first != last => Err(ExtrusionError::NotClosed { first, last }),
            _ => Ok(()),
        }
    }

    pub fn role(&self) -> ExtrusionRole {
        self.paths
            .iter()
            .fold(ExtrusionRole::None, |acc, p| ExtrusionRole::mixed_of(acc, p.role))
    }

    pub fn first_point(&self) -> Option<Point> {
        self.paths.first().and_then(ExtrusionPath::first_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.paths.last().and_then(ExtrusionPath::last_point)
    }

    pub fn length(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath::length).sum()
    }

    pub fn total_volume(&self) -> CoordF {
        self.paths.iter().map(ExtrusionPath::total_volume).sum()
    }

    /// The loop as a closed polyline (first point repeated at the end).
    pub fn as_polyline(&self) -> Polyline {
        let mut out = Polyline::new();
        for path in &self.paths {
            out.append(&path.polyline);
        }
        out
    }

    /// The loop as a polygon (no repeated point).
    pub fn polygon(&self) -> Polygon {
        let mut points = self.as_polyline().into_points();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Polygon::from_points(points)
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.polygon().is_counter_clockwise()
    }

    fn reverse_direction(&mut self) {
        for path in &mut self.paths {
            path.reverse();
        }
        self.paths.reverse();
    }

    /// Returns true if the loop was reversed.
    pub fn make_counter_clockwise(&mut self) -> bool {
        if self.is_counter_clockwise() {
            false
        } else {
            self.reverse_direction();
            true
        }
    }

    /// Returns true if the loop was reversed.
    pub fn make_clockwise(&mut self) -> bool {
        if self.is_counter_clockwise() {
            self.reverse_direction();
            true
        } else {
            false
        }
    }

    /// Rotate the loop so it starts at `point`, which must be one of its
    /// vertices. Returns false if it is not.
    pub fn split_at_vertex(&mut self, point: &Point) -> bool {
        for i in 0..self.paths.len() {
            let Some(idx) = self.paths[i].polyline.points().iter().position(|p| p == point) else {
                continue;
            };
            let path = &self.paths[i];
            let n = path.len();
            if idx == 0 || idx == n - 1 {
                // already on a path boundary: rotate the path list
                let start = if idx == 0 { i } else { (i + 1) % self.paths.len() };
                self.paths.rotate_left(start);
                return true;
            }
            let (head, tail) = path.polyline.split_at(idx);
            let mut first = path.clone();
            first.polyline = tail;
            let mut last = path.clone();
            last.polyline = head;

            let mut paths = Vec::with_capacity(self.paths.len() + 1);
            paths.push(first);
            paths.extend(self.paths[i + 1..].iter().cloned());
            paths.extend(self.paths[..i].iter().cloned());
            paths.push(last);
            self.paths = paths;
            return true;
        }
        false
    }

    /// Shorten the loop by `distance` (scaled) from its end, dropping
    /// whole paths where needed.
    pub fn clip_end(&mut self, mut distance: CoordF) {
        while distance > 0.0 {
            let Some(last) = self.paths.last_mut() else {
                return;
            };
            let len = last.length();
            if len > distance {
                last.clip_end(distance);
                return;
            }
            distance -= len;
            self.paths.pop();
        }
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.polygons_covered_by_width(out, scaled_epsilon);
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for path in &self.paths {
            path.polygons_covered_by_spacing(out, scaled_epsilon);
        }
    }

    pub fn collect_polylines(&self, out: &mut Polylines) {
        let polyline = self.as_polyline();
        if !polyline.is_empty() {
            out.push(polyline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(i64, i64)]) -> ExtrusionPath {
        ExtrusionPath::new(ExtrusionRole::ThinWall)
            .with_polyline(Polyline::from_points(points.iter().map(|&(x, y)| Point::new(x, y)).collect()))
    }

    fn square_loop() -> ExtrusionLoop {
        ExtrusionLoop::new(
            vec![
                path(&[(0, 0), (100, 0), (100, 100)]),
                path(&[(100, 100), (0, 100), (0, 0)]),
            ],
            ExtrusionLoopRole::ThinWall,
        )
    }

    #[test]
    fn test_loop_is_closed() {
        let l = square_loop();
        assert!(l.validate().is_ok());
        assert_eq!(l.first_point(), l.last_point());
        assert_eq!(l.polygon().len(), 4);
        assert_eq!(l.length(), 400.0);
    }

    #[test]
    fn test_open_loop_fails_validation() {
        let l = ExtrusionLoop {
            paths: vec![path(&[(0, 0), (100, 0), (100, 100)])],
            loop_role: ExtrusionLoopRole::Default,
        };
        assert!(matches!(l.validate(), Err(ExtrusionError::NotClosed { .. })));
        let closed = ExtrusionLoop::from_path(path(&[(0, 0), (100, 0), (100, 100)]), ExtrusionLoopRole::Default);
        assert!(closed.validate().is_ok());
    }

    #[test]
    fn test_orientation() {
        let mut l = square_loop();
        assert!(l.is_counter_clockwise());
        assert!(!l.make_counter_clockwise());
        assert!(l.make_clockwise());
        assert!(!l.is_counter_clockwise());
        assert!(l.validate().is_ok());
    }

    #[test]
    fn test_split_at_vertex() {
        let mut l = square_loop();
        assert!(l.split_at_vertex(&Point::new(0, 100)));
        assert_eq!(l.first_point(), Some(Point::new(0, 100)));
        assert_eq!(l.last_point(), Some(Point::new(0, 100)));
        assert!(l.validate().is_ok());
        assert_eq!(l.length(), 400.0);
        assert!(!l.split_at_vertex(&Point::new(50, 50)));
    }

    #[test]
    fn test_clip_end() {
        let mut l = square_loop();
        l.clip_end(250.0);
        assert_eq!(l.paths.len(), 1);
        assert_eq!(l.last_point(), Some(Point::new(100, 50)));
    }
}
