//! Nearest-node spatial index over geographic node positions.
//!
//! An R-tree (via `rstar`) over `[lat, lon]` pairs.  Distances are planar
//! Euclidean in degree space, not geodesic; see [`GeoPoint::distance_deg`].
//! Bulk loading is O(N log N) and nearest-neighbour queries are O(log N) on
//! average, which keeps snapping cheap for networks of several hundred
//! thousand nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use er_core::{GeoPoint, NodeId};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[lat, lon]` point with its `NodeId`.
#[derive(Clone)]
struct IndexEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexEntry {
    /// Squared Euclidean distance in lat/lon space.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Read-only nearest-neighbour structure, built once per network.
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
}

impl SpatialIndex {
    /// Index `points`; the point at position `i` is reported as `NodeId(i)`.
    ///
    /// Non-finite points are skipped: they can never be the nearest node.
    pub fn build(points: &[GeoPoint]) -> Self {
        let entries: Vec<IndexEntry> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .map(|(i, p)| IndexEntry {
                point: [p.lat, p.lon],
                id: NodeId(i as u32),
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The closest indexed node to `pos` and its degree-space distance.
    ///
    /// Returns `None` only if the index is empty or `pos` is not finite.
    pub fn nearest(&self, pos: GeoPoint) -> Option<(NodeId, f64)> {
        if !pos.is_finite() {
            return None;
        }
        let query = [pos.lat, pos.lon];
        self.tree
            .nearest_neighbor(&query)
            .map(|e| (e.id, e.distance_2(&query).sqrt()))
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<(NodeId, f64)> {
        if !pos.is_finite() {
            return Vec::new();
        }
        let query = [pos.lat, pos.lon];
        self.tree
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|e| (e.id, e.distance_2(&query).sqrt()))
            .collect()
    }

    /// All nodes within `radius` (degrees) of `pos`, in no particular order.
    pub fn within(&self, pos: GeoPoint, radius: f64) -> Vec<NodeId> {
        if !pos.is_finite() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        self.tree
            .locate_within_distance([pos.lat, pos.lon], radius * radius)
            .map(|e| e.id)
            .collect()
    }
}
