//! Neighbour queries over moving agents.
//!
//! The scene rebuilds its index once per tick from the pre-tick positions,
//! then every agent's force computation queries it read-only.  Rebuilding is
//! simpler than incremental maintenance and cheap: agents move only a
//! bounded distance per step and bulk loading is `O(n log n)`.
//!
//! Results come back unordered.  The force model sums contributions, so the
//! order never affects the outcome.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ped_core::{AgentId, Vector3};

/// Point-in-radius queries over a per-tick snapshot of agent positions.
///
/// `Send + Sync` so a scene can be moved across threads and the index shared
/// by the parallel force phase.
pub trait NeighborIndex: Send + Sync {
    /// Replace the contents with `points`.  The set may differ arbitrarily
    /// from the previous call (agents added or removed between ticks).
    fn rebuild(&mut self, points: &[(AgentId, Vector3)]);

    /// Append to `out` every agent whose horizontal distance to `center` is
    /// at most `radius`.  `out` is not cleared first.
    fn within(&self, center: Vector3, radius: f64, out: &mut Vec<AgentId>);

    /// Number of indexed agents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// A 2-D `[x, y]` point with the associated agent.
#[derive(Clone, Debug, PartialEq)]
struct AgentPoint {
    point: [f64; 2],
    id: AgentId,
}

impl RTreeObject for AgentPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── TreeIndex ─────────────────────────────────────────────────────────────────

/// R-tree backed index (via `rstar`), bulk-loaded every rebuild.
///
/// The default index: no tuning parameter, and query cost does not depend on
/// how the interaction radius compares to crowd density.
#[derive(Default)]
pub struct TreeIndex {
    tree: RTree<AgentPoint>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NeighborIndex for TreeIndex {
    fn rebuild(&mut self, points: &[(AgentId, Vector3)]) {
        let entries = points
            .iter()
            .map(|&(id, p)| AgentPoint { point: [p.x, p.y], id })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    fn within(&self, center: Vector3, radius: f64, out: &mut Vec<AgentId>) {
        out.extend(
            self.tree
                .locate_within_distance([center.x, center.y], radius * radius)
                .map(|e| e.id),
        );
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}
