//! Static wall obstacles and their spatial lookup.
//!
//! # Spatial index
//!
//! Obstacles never move, so they go into an R-tree (via `rstar`) once at
//! insertion.  Tree entries measure exact point-to-segment distance, so a
//! `locate_within_distance` query returns precisely the walls within the
//! force threshold of an agent.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ped_core::{CoreError, ObstacleId, Segment, Vector3};

use crate::SpatialResult;

// ── Obstacle ──────────────────────────────────────────────────────────────────

/// A wall of infinite height between two ground-plane points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    segment: Segment,
}

impl Obstacle {
    /// Wall from `(x1, y1)` to `(x2, y2)`.  Coordinates must be finite.
    ///
    /// Identical endpoints are allowed and behave as a point obstacle.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> SpatialResult<Self> {
        for v in [x1, y1, x2, y2] {
            CoreError::check_finite("obstacle coordinate", v)?;
        }
        Ok(Self { segment: Segment::from_coords(x1, y1, x2, y2) })
    }

    #[inline]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    #[inline]
    pub fn start(&self) -> Vector3 {
        self.segment.start
    }

    #[inline]
    pub fn end(&self) -> Vector3 {
        self.segment.end
    }

    /// Nearest point of the wall to `p`.
    #[inline]
    pub fn closest_point(&self, p: Vector3) -> Vector3 {
        self.segment.closest_point(p)
    }

    /// Horizontal distance from `p` to the wall.
    #[inline]
    pub fn distance_to(&self, p: Vector3) -> f64 {
        self.segment.distance_to(p)
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// One obstacle's segment, keyed by its handle.
#[derive(Clone, Debug, PartialEq)]
struct ObstacleEntry {
    id: ObstacleId,
    segment: Segment,
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        let (min, max) = self.segment.bounds();
        AABB::from_corners(min, max)
    }
}

impl PointDistance for ObstacleEntry {
    /// Squared distance from the query point to the nearest point of the wall.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d = self.segment.distance_to(Vector3::planar(point[0], point[1]));
        d * d
    }
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// Owning arena of obstacles addressed by [`ObstacleId`].
///
/// Handles are never reused: removing an obstacle leaves an empty slot.
#[derive(Default)]
pub struct ObstacleSet {
    slots: Vec<Option<Obstacle>>,
    tree: RTree<ObstacleEntry>,
    live: usize,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle and return its handle.
    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = ObstacleId::from_slot(self.slots.len());
        self.tree.insert(ObstacleEntry { id, segment: *obstacle.segment() });
        self.slots.push(Some(obstacle));
        self.live += 1;
        id
    }

    /// Remove and return an obstacle.  `None` if the handle is unknown or
    /// already removed.
    pub fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let obstacle = self.slots.get_mut(id.index())?.take()?;
        self.tree.remove(&ObstacleEntry { id, segment: *obstacle.segment() });
        self.live -= 1;
        Some(obstacle)
    }

    /// Remove every obstacle, returning them in ascending handle order.
    pub fn drain(&mut self) -> Vec<(ObstacleId, Obstacle)> {
        let drained = self
            .slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.take().map(|o| (ObstacleId::from_slot(i), o)))
            .collect();
        self.tree = RTree::new();
        self.live = 0;
        drained
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// All live obstacles in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (ObstacleId::from_slot(i), o)))
    }

    /// Obstacles whose horizontal distance to `p` is at most `radius`.
    pub fn near(&self, p: Vector3, radius: f64) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.tree
            .locate_within_distance([p.x, p.y], radius * radius)
            .filter_map(move |e| self.get(e.id).map(|o| (e.id, o)))
    }

    /// The lowest-handle obstacle that blocks the straight move `from → to`
    /// (see [`Segment::blocks`]).
    pub fn first_crossing(&self, from: Vector3, to: Vector3) -> Option<(ObstacleId, &Obstacle)> {
        let step = Segment::new(from, to);
        // Anything touching the step lies within half its length of the midpoint.
        let mid = (step.start + step.end) * 0.5;
        let reach = step.length() * 0.5 + 1e-9;
        self.tree
            .locate_within_distance([mid.x, mid.y], reach * reach)
            .filter(|e| e.segment.blocks(from, to))
            .filter_map(|e| self.get(e.id).map(|o| (e.id, o)))
            .min_by_key(|(id, _)| *id)
    }
}
