//! Ordered and unordered groups of extrusion entities.

use super::{ExtrusionEntity, ExtrusionError, ExtrusionRole, PolylineCollector};
use crate::geometry::{Point, Polygons, Polylines};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// A group of entities. With `no_sort` set the children must be printed in
/// stored order; otherwise travel optimisation may reorder and reverse them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionEntityCollection {
    pub entities: Vec<ExtrusionEntity>,
    pub no_sort: bool,
}

impl ExtrusionEntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection whose order must be kept.
    pub fn new_no_sort(entities: Vec<ExtrusionEntity>) -> Self {
        Self {
            entities,
            no_sort: true,
        }
    }

    pub fn append(&mut self, entity: impl Into<ExtrusionEntity>) {
        self.entities.push(entity.into());
    }

    pub fn extend<I, E>(&mut self, entities: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<ExtrusionEntity>,
    {
        self.entities.extend(entities.into_iter().map(Into::into));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of leaf entities, counting through nested collections.
    pub fn items_count(&self) -> usize {
        self.entities
            .iter()
            .map(|e| match e {
                ExtrusionEntity::Collection(c) => c.items_count(),
                _ => 1,
            })
            .sum()
    }

    pub fn role(&self) -> ExtrusionRole {
        self.entities
            .iter()
            .fold(ExtrusionRole::None, |acc, e| ExtrusionRole::mixed_of(acc, e.role()))
    }

    pub fn first_point(&self) -> Option<Point> {
        self.entities.iter().find_map(ExtrusionEntity::first_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.entities.iter().rev().find_map(ExtrusionEntity::last_point)
    }

    pub fn length(&self) -> CoordF {
        self.entities.iter().map(ExtrusionEntity::length).sum()
    }

    pub fn total_volume(&self) -> CoordF {
        self.entities.iter().map(ExtrusionEntity::total_volume).sum()
    }

    pub fn can_reverse(&self) -> bool {
        !self.no_sort && self.entities.iter().all(ExtrusionEntity::can_reverse)
    }

    /// Reverse the order and each child. Ordered collections and
    /// collections holding direction-bound entities refuse.
    pub fn reverse(&mut self) -> Result<(), ExtrusionError> {
        if self.no_sort {
            return Err(ExtrusionError::Irreversible("ordered collection"));
        }
        if !self.can_reverse() {
            return Err(ExtrusionError::Irreversible("collection with direction-bound entities"));
        }
        for entity in &mut self.entities {
            entity.reverse()?;
        }
        self.entities.reverse();
        Ok(())
    }

    fn flatten_into(&self, out: &mut ExtrusionEntityCollection, preserve_order: bool) {
        for entity in &self.entities {
            match entity {
                ExtrusionEntity::Collection(c) if preserve_order && c.no_sort => {
                    let mut group = ExtrusionEntityCollection::new_no_sort(Vec::new());
                    c.flatten_into(&mut group, false);
                    out.append(group);
                }
                ExtrusionEntity::Collection(c) => c.flatten_into(out, preserve_order),
                other => out.entities.push(other.clone()),
            }
        }
    }

    /// Remove nesting. With `preserve_order`, each nested `no_sort`
    /// collection survives as one flat ordered group.
    pub fn flatten(&self, preserve_order: bool) -> ExtrusionEntityCollection {
        let mut out = ExtrusionEntityCollection {
            entities: Vec::with_capacity(self.entities.len()),
            no_sort: self.no_sort,
        };
        self.flatten_into(&mut out, preserve_order);
        out
    }

    /// Greedy nearest-neighbour ordering starting from `start`. Reversible
    /// entities may be flipped when their end is closer. Ordered
    /// collections are returned unchanged.
    pub fn chained_path_from(&self, start: Point) -> ExtrusionEntityCollection {
        if self.no_sort {
            return self.clone();
        }
        let mut remaining: Vec<ExtrusionEntity> = Vec::with_capacity(self.entities.len());
        let mut empty = Vec::new();
        for entity in &self.entities {
            if entity.first_point().is_some() {
                remaining.push(entity.clone());
            } else {
                empty.push(entity.clone());
            }
        }

        let mut out = ExtrusionEntityCollection::new();
        let mut current = start;
        while !remaining.is_empty() {
            let mut best: Option<(usize, bool, i128)> = None;
            for (i, entity) in remaining.iter().enumerate() {
                let candidates = [
                    (entity.first_point(), false),
                    (entity.last_point().filter(|_| entity.can_reverse()), true),
                ];
                for (point, reversed) in candidates {
                    let Some(point) = point else { continue };
                    let d = point.distance_squared(&current);
                    if best.map_or(true, |(_, _, bd)| d < bd) {
                        best = Some((i, reversed, d));
                    }
                }
            }
            let Some((i, reversed, _)) = best else {
                break;
            };
            let mut entity = remaining.swap_remove(i);
            if reversed && entity.reverse().is_err() {
                log::trace!("chaining: entity refused to reverse");
            }
            if let Some(last) = entity.last_point() {
                current = last;
            }
            out.entities.push(entity);
        }
        out.entities.extend(remaining);
        out.entities.extend(empty);
        out
    }

    pub fn polygons_covered_by_width(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for entity in &self.entities {
            entity.polygons_covered_by_width(out, scaled_epsilon);
        }
    }

    pub fn polygons_covered_by_spacing(&self, out: &mut Polygons, scaled_epsilon: CoordF) {
        for entity in &self.entities {
            entity.polygons_covered_by_spacing(out, scaled_epsilon);
        }
    }

    /// Centerlines of every leaf entity, in order.
    pub fn collect_polylines_vec(&self) -> Polylines {
        let mut collector = PolylineCollector::default();
        for entity in &self.entities {
            entity.visit(&mut collector);
        }
        collector.polylines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::{ExtrusionLoop, ExtrusionLoopRole, ExtrusionPath};
    use crate::geometry::Polyline;

    fn path(a: (i64, i64), b: (i64, i64)) -> ExtrusionPath {
        ExtrusionPath::new(ExtrusionRole::GapFill).with_polyline(Polyline::from_points(vec![
            Point::new(a.0, a.1),
            Point::new(b.0, b.1),
        ]))
    }

    #[test]
    fn test_items_count_and_flatten() {
        let mut inner = ExtrusionEntityCollection::new_no_sort(Vec::new());
        inner.append(path((0, 0), (10, 0)));
        inner.append(path((10, 0), (20, 0)));
        let mut nested = ExtrusionEntityCollection::new();
        nested.append(path((100, 0), (110, 0)));
        nested.append(inner);

        let mut top = ExtrusionEntityCollection::new();
        top.append(path((50, 50), (60, 60)));
        top.append(nested);
        assert_eq!(top.len(), 2);
        assert_eq!(top.items_count(), 4);

        let flat = top.flatten(false);
        assert_eq!(flat.len(), 4);
        assert!(!flat.entities.iter().any(ExtrusionEntity::is_collection));

        let grouped = top.flatten(true);
        assert_eq!(grouped.len(), 3);
        let groups: Vec<_> = grouped.entities.iter().filter(|e| e.is_collection()).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].first_point(), Some(Point::new(0, 0)));
        assert_eq!(groups[0].last_point(), Some(Point::new(20, 0)));
    }

    #[test]
    fn test_chained_path_reverses_when_closer() {
        let mut c = ExtrusionEntityCollection::new();
        c.append(path((1000, 0), (2000, 0)));
        c.append(path((500, 0), (0, 0)));
        let chained = c.chained_path_from(Point::new(0, 0));
        assert_eq!(chained.first_point(), Some(Point::new(0, 0)));
        assert_eq!(chained.entities[0].last_point(), Some(Point::new(500, 0)));
        assert_eq!(chained.entities[1].first_point(), Some(Point::new(1000, 0)));
        assert_eq!(chained.last_point(), Some(Point::new(2000, 0)));
    }

    #[test]
    fn test_no_sort_is_kept() {
        let c = ExtrusionEntityCollection::new_no_sort(vec![
            path((1000, 0), (2000, 0)).into(),
            path((0, 0), (10, 0)).into(),
        ]);
        let chained = c.chained_path_from(Point::new(0, 0));
        assert_eq!(chained, c);
        let mut c = c;
        assert!(c.reverse().is_err());
    }

    #[test]
    fn test_loops_are_not_flipped() {
        let l = ExtrusionLoop::from_path(
            ExtrusionPath::new(ExtrusionRole::ThinWall).with_polyline(Polyline::from_points(vec![
                Point::new(0, 0),
                Point::new(100, 0),
                Point::new(100, 100),
            ])),
            ExtrusionLoopRole::ThinWall,
        );
        let mut c = ExtrusionEntityCollection::new();
        c.append(l);
        assert!(!c.can_reverse());
        let chained = c.chained_path_from(Point::new(100, 100));
        assert_eq!(chained.first_point(), Some(Point::new(0, 0)));
    }
}
