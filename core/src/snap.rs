//! Snap points.
//!
//! A snap point attracts the resting position of a view change. Snap points are immutable and
//! may be shared between any number of collections; everything that depends on the collection
//! (alignment against its viewport, the applicable zone, how many equal points were combined) is
//! kept in that collection’s own side table.

use crate::error::{Error, Result};
use crate::request::SnapPointsMode;
use cgmath::Vector2;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Tolerance used when comparing actual snap values.
const EPSILON: f64 = 1e-6;

/// Snap point identifier (a UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapPointId(u32, u16, u16, [u8; 8]);

impl SnapPointId {
    fn new() -> SnapPointId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        SnapPointId(a, b, c, *d)
    }
}

/// Which edge of the viewport a snap point lines up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapPointAlignment {
    Near,
    Center,
    Far,
}

impl SnapPointAlignment {
    fn adjustment(self, viewport_length: f64) -> f64 {
        match self {
            SnapPointAlignment::Near => 0.,
            SnapPointAlignment::Center => -viewport_length / 2.,
            SnapPointAlignment::Far => -viewport_length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapPointAxis {
    Horizontal,
    Vertical,
    Zoom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapPointKind {
    /// A single value.
    Single {
        value: f64,
        /// Maximum distance from which the value attracts; unbounded if absent.
        applicable_range: Option<f64>,
    },
    /// Every `offset + k * interval` within `[start, end]`.
    Repeated {
        offset: f64,
        interval: f64,
        start: f64,
        end: f64,
        applicable_range: Option<f64>,
    },
}

/// A snap point. Create one with the constructors and share the returned `Arc`.
#[derive(Debug, PartialEq)]
pub struct SnapPoint {
    id: SnapPointId,
    kind: SnapPointKind,
    alignment: SnapPointAlignment,
}

impl SnapPoint {
    /// Creates a validated snap point.
    pub fn new(kind: SnapPointKind, alignment: SnapPointAlignment) -> Result<Arc<SnapPoint>> {
        let check_range = |range: Option<f64>| -> Result<()> {
            if let Some(range) = range {
                Error::check_finite("applicable range", range)?;
                if range <= 0. {
                    return Err(Error::NonPositiveApplicableRange(range));
                }
            }
            Ok(())
        };

        match kind {
            SnapPointKind::Single {
                value,
                applicable_range,
            } => {
                Error::check_finite("snap point value", value)?;
                check_range(applicable_range)?;
            }
            SnapPointKind::Repeated {
                offset,
                interval,
                start,
                end,
                applicable_range,
            } => {
                Error::check_finite("snap point offset", offset)?;
                Error::check_finite("snap point interval", interval)?;
                Error::check_finite("snap point start", start)?;
                Error::check_finite("snap point end", end)?;
                if interval <= 0. {
                    return Err(Error::NonPositiveInterval(interval));
                }
                if end <= start {
                    return Err(Error::EmptyRange { start, end });
                }
                if offset < start || offset > end {
                    return Err(Error::OffsetOutOfRange { offset, start, end });
                }
                check_range(applicable_range)?;
            }
        }

        Ok(Arc::new(SnapPoint {
            id: SnapPointId::new(),
            kind,
            alignment,
        }))
    }

    pub fn single(value: f64, alignment: SnapPointAlignment) -> Result<Arc<SnapPoint>> {
        Self::new(
            SnapPointKind::Single {
                value,
                applicable_range: None,
            },
            alignment,
        )
    }

    pub fn repeated(
        offset: f64,
        interval: f64,
        start: f64,
        end: f64,
        alignment: SnapPointAlignment,
    ) -> Result<Arc<SnapPoint>> {
        Self::new(
            SnapPointKind::Repeated {
                offset,
                interval,
                start,
                end,
                applicable_range: None,
            },
            alignment,
        )
    }

    pub fn id(&self) -> SnapPointId {
        self.id
    }

    pub fn kind(&self) -> SnapPointKind {
        self.kind
    }

    pub fn alignment(&self) -> SnapPointAlignment {
        self.alignment
    }

    fn applicable_range(&self) -> f64 {
        match self.kind {
            SnapPointKind::Single {
                applicable_range, ..
            }
            | SnapPointKind::Repeated {
                applicable_range, ..
            } => applicable_range.unwrap_or(f64::INFINITY),
        }
    }

    /// Positions after alignment against a viewport of `viewport_length`.
    fn geometry(&self, viewport_length: f64) -> Geometry {
        let adjustment = self.alignment.adjustment(viewport_length);
        match self.kind {
            SnapPointKind::Single { value, .. } => Geometry::Single {
                value: value + adjustment,
            },
            SnapPointKind::Repeated {
                offset,
                interval,
                start,
                end,
                ..
            } => {
                let first = offset - ((offset - start) / interval).floor() * interval;
                let last = offset + ((end - offset) / interval).floor() * interval;
                Geometry::Repeated {
                    first: first + adjustment,
                    last: last + adjustment,
                    interval,
                    start: start + adjustment,
                    end: end + adjustment,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Geometry {
    Single {
        value: f64,
    },
    Repeated {
        first: f64,
        last: f64,
        interval: f64,
        start: f64,
        end: f64,
    },
}

impl Geometry {
    fn overlaps(&self, other: &Geometry) -> bool {
        match (*self, *other) {
            (Geometry::Single { .. }, Geometry::Single { .. }) => false,
            (Geometry::Single { value }, Geometry::Repeated { start, end, .. })
            | (Geometry::Repeated { start, end, .. }, Geometry::Single { value }) => {
                start < value && value < end
            }
            (
                Geometry::Repeated { start, end, .. },
                Geometry::Repeated {
                    start: other_start,
                    end: other_end,
                    ..
                },
            ) => start < other_end && other_start < end,
        }
    }

    /// Sort key: single values sort before repeated ranges starting at the same position.
    fn sort_key(&self) -> (f64, f64, u8) {
        match *self {
            Geometry::Single { value } => (value, value, 0),
            Geometry::Repeated { start, end, .. } => (start, end, 1),
        }
    }

    /// How far towards `edge` this snap point’s zone extends.
    fn influence(&self, applicable_range: f64, edge: f64) -> f64 {
        match *self {
            Geometry::Single { value } => {
                let midpoint = (value + edge) / 2.;
                if value <= edge {
                    midpoint.min(value + applicable_range)
                } else {
                    midpoint.max(value - applicable_range)
                }
            }
            Geometry::Repeated { start, end, .. } => edge.max(start).min(end),
        }
    }

    fn evaluate(&self, applicable_range: f64, value: f64) -> Option<f64> {
        let snapped = match *self {
            Geometry::Single { value } => value,
            Geometry::Repeated {
                first,
                last,
                interval,
                start,
                end,
            } => {
                if value < start || value > end {
                    return None;
                }
                let last_index = ((last - first) / interval).round();
                let position = (value - first) / interval;
                let mut index = position.floor();
                if position - index > 0.5 {
                    index += 1.;
                }
                first + index.max(0.).min(last_index) * interval
            }
        };
        if (snapped - value).abs() <= applicable_range {
            Some(snapped)
        } else {
            None
        }
    }
}

/// Derived state of a snap point within one collection.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    geometry: Geometry,
    applicable_range: f64,
    zone: (f64, f64),
    combination_count: usize,
}

/// The snap points of one axis, in insertion order.
#[derive(Debug, Clone)]
pub struct SnapPointCollection {
    axis: SnapPointAxis,
    viewport_length: f64,
    points: Vec<Arc<SnapPoint>>,
    placements: HashMap<SnapPointId, Placement>,
}

impl SnapPointCollection {
    pub fn new(axis: SnapPointAxis) -> SnapPointCollection {
        SnapPointCollection {
            axis,
            viewport_length: 0.,
            points: Vec::new(),
            placements: HashMap::new(),
        }
    }

    pub fn axis(&self) -> SnapPointAxis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SnapPoint>> {
        self.points.iter()
    }

    pub fn contains(&self, snap_point: &SnapPoint) -> bool {
        self.placements.contains_key(&snap_point.id)
    }

    /// The applicable zone of a registered snap point in this collection.
    pub fn zone(&self, snap_point: &SnapPoint) -> Option<(f64, f64)> {
        self.placements.get(&snap_point.id).map(|p| p.zone)
    }

    /// Number of registered snap points combined with this one (itself included).
    pub fn combination_count(&self, snap_point: &SnapPoint) -> Option<usize> {
        self.placements
            .get(&snap_point.id)
            .map(|p| p.combination_count)
    }

    fn geometry_of(&self, snap_point: &SnapPoint) -> Geometry {
        match self.axis {
            // zoom snap points are not aligned against the viewport
            SnapPointAxis::Zoom => snap_point.geometry(0.),
            _ => snap_point.geometry(self.viewport_length),
        }
    }

    /// Registers a snap point. The collection is unchanged if this fails.
    pub fn insert(&mut self, snap_point: Arc<SnapPoint>) -> Result<()> {
        if self.contains(&snap_point) {
            return Err(Error::DuplicateSnapPoint);
        }
        let geometry = self.geometry_of(&snap_point);
        if self
            .placements
            .values()
            .any(|placement| placement.geometry.overlaps(&geometry))
        {
            return Err(Error::OverlappingSnapPoint);
        }
        self.points.push(snap_point);
        self.update_placements();
        Ok(())
    }

    /// Unregisters a snap point. Returns false if it was not registered.
    pub fn remove(&mut self, snap_point: &SnapPoint) -> bool {
        match self.points.iter().position(|p| p.id == snap_point.id) {
            Some(index) => {
                self.points.remove(index);
                self.update_placements();
                true
            }
            None => false,
        }
    }

    /// Changes the viewport length used for alignment.
    pub fn set_viewport_length(&mut self, viewport_length: f64) {
        if self.viewport_length != viewport_length {
            self.viewport_length = viewport_length;
            self.update_placements();
        }
    }

    fn update_placements(&mut self) {
        let mut sorted: Vec<(SnapPointId, Geometry, f64)> = self
            .points
            .iter()
            .map(|p| (p.id, self.geometry_of(p), p.applicable_range()))
            .collect();
        // stable, so equal keys stay in insertion order
        sorted.sort_by(|a, b| {
            a.1.sort_key()
                .partial_cmp(&b.1.sort_key())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // equal single values are combined into one group
        let mut groups: Vec<Vec<(SnapPointId, Geometry, f64)>> = Vec::new();
        for entry in sorted {
            let combines = match (groups.last().and_then(|g| g.last()), entry.1) {
                (Some((_, Geometry::Single { value: a }, _)), Geometry::Single { value: b }) => {
                    (a - b).abs() <= EPSILON
                }
                _ => false,
            };
            match groups.last_mut() {
                Some(group) if combines => group.push(entry),
                _ => groups.push(vec![entry]),
            }
        }

        self.placements.clear();
        for (i, group) in groups.iter().enumerate() {
            let count = group.len();
            // a combined group attracts as far as its widest member
            let group_range = group.iter().map(|e| e.2).fold(0., f64::max);
            let previous = i.checked_sub(1).and_then(|i| groups.get(i));
            let next = groups.get(i + 1);
            let neighbor_influence = |neighbor: Option<&Vec<(SnapPointId, Geometry, f64)>>,
                                      edge: f64| {
                neighbor.and_then(|g| g.first()).map(|(_, geometry, _)| {
                    let range = neighbor.map_or(0., |g| g.iter().map(|e| e.2).fold(0., f64::max));
                    geometry.influence(range, edge)
                })
            };

            for &(id, geometry, applicable_range) in group {
                let zone = match geometry {
                    Geometry::Single { value } => {
                        let min = neighbor_influence(previous, value).unwrap_or(f64::NEG_INFINITY);
                        let max = neighbor_influence(next, value).unwrap_or(f64::INFINITY);
                        (min.max(value - group_range), max.min(value + group_range))
                    }
                    Geometry::Repeated { start, end, .. } => (start, end),
                };
                self.placements.insert(
                    id,
                    Placement {
                        geometry,
                        applicable_range,
                        zone,
                        combination_count: count,
                    },
                );
            }
        }
    }

    /// Snaps `value` to the closest applicable snap point, or returns it unchanged.
    pub fn resolve(&self, value: f64) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for point in &self.points {
            let placement = match self.placements.get(&point.id) {
                Some(placement) => placement,
                None => continue,
            };
            let (min, max) = placement.zone;
            if value < min || value > max {
                continue;
            }
            if let Some(snapped) = placement
                .geometry
                .evaluate(placement.applicable_range, value)
            {
                let distance = (snapped - value).abs();
                if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                    best = Some((distance, snapped));
                }
            }
        }
        best.map_or(value, |(_, snapped)| snapped)
    }
}

/// The snap point collections of a scrolling surface.
#[derive(Debug, Clone)]
pub struct SnapPointResolver {
    horizontal: SnapPointCollection,
    vertical: SnapPointCollection,
    zoom: SnapPointCollection,
}

impl Default for SnapPointResolver {
    fn default() -> Self {
        SnapPointResolver::new()
    }
}

impl SnapPointResolver {
    pub fn new() -> SnapPointResolver {
        SnapPointResolver {
            horizontal: SnapPointCollection::new(SnapPointAxis::Horizontal),
            vertical: SnapPointCollection::new(SnapPointAxis::Vertical),
            zoom: SnapPointCollection::new(SnapPointAxis::Zoom),
        }
    }

    pub fn collection(&self, axis: SnapPointAxis) -> &SnapPointCollection {
        match axis {
            SnapPointAxis::Horizontal => &self.horizontal,
            SnapPointAxis::Vertical => &self.vertical,
            SnapPointAxis::Zoom => &self.zoom,
        }
    }

    fn collection_mut(&mut self, axis: SnapPointAxis) -> &mut SnapPointCollection {
        match axis {
            SnapPointAxis::Horizontal => &mut self.horizontal,
            SnapPointAxis::Vertical => &mut self.vertical,
            SnapPointAxis::Zoom => &mut self.zoom,
        }
    }

    pub fn add(&mut self, axis: SnapPointAxis, snap_point: Arc<SnapPoint>) -> Result<()> {
        self.collection_mut(axis).insert(snap_point)
    }

    pub fn remove(&mut self, axis: SnapPointAxis, snap_point: &SnapPoint) -> bool {
        self.collection_mut(axis).remove(snap_point)
    }

    pub fn len(&self, axis: SnapPointAxis) -> usize {
        self.collection(axis).len()
    }

    pub fn set_viewport(&mut self, viewport: Vector2<f64>) {
        self.horizontal.set_viewport_length(viewport.x);
        self.vertical.set_viewport_length(viewport.y);
    }

    pub fn resolve(&self, axis: SnapPointAxis, value: f64, mode: SnapPointsMode) -> f64 {
        match mode {
            SnapPointsMode::Ignore => value,
            SnapPointsMode::Default => self.collection(axis).resolve(value),
        }
    }
}
