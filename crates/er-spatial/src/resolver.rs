//! Snapping free-form query coordinates onto network nodes.
//!
//! Query points arrive as raw `(lat, lon)` pairs from geocoding or map
//! clicks.  The resolver accepts the nearest node only if it lies within a
//! degree-space tolerance; anything farther is reported as off-network so
//! the caller can ask for a different point.

use er_core::{DEFAULT_MAX_SNAP_DISTANCE_DEG, GeoPoint, NodeId, RoutingConfig};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

/// A successful snap: the node, its position, and how far the query was.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snap {
    pub node: NodeId,
    /// Geographic position of `node` (the marker a UI should display).
    pub node_pos: GeoPoint,
    /// Degree-space distance from the query point to `node_pos`.
    pub distance_deg: f64,
}

/// Maps query coordinates to nodes of one network.
#[derive(Copy, Clone)]
pub struct NodeResolver<'a> {
    network: &'a RoadNetwork,
    max_distance: f64,
}

impl<'a> NodeResolver<'a> {
    pub const DEFAULT_MAX_DISTANCE: f64 = DEFAULT_MAX_SNAP_DISTANCE_DEG;

    /// `max_distance` is in degrees; a query exactly at the tolerance is
    /// still accepted.
    pub fn new(network: &'a RoadNetwork, max_distance: f64) -> Self {
        Self { network, max_distance }
    }

    pub fn from_config(network: &'a RoadNetwork, config: &RoutingConfig) -> Self {
        Self::new(network, config.max_snap_distance_deg)
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Nearest node within tolerance, with snap details.
    pub fn snap(&self, pos: GeoPoint) -> Option<Snap> {
        let (node, distance_deg) = self.network.spatial_index().nearest(pos)?;
        self.accepts(distance_deg)
            .then(|| Snap { node, node_pos: self.network.node_pos(node), distance_deg })
    }

    /// Nearest node within tolerance.
    pub fn resolve(&self, pos: GeoPoint) -> Option<NodeId> {
        self.snap(pos).map(|s| s.node)
    }

    /// Like [`resolve`](Self::resolve) but reports why a point was rejected.
    pub fn resolve_or_err(&self, pos: GeoPoint) -> SpatialResult<NodeId> {
        match self.network.spatial_index().nearest(pos) {
            Some((node, d)) if self.accepts(d) => Ok(node),
            Some((node, distance)) => {
                let metres = pos.distance_m(self.network.node_pos(node));
                log::debug!(
                    "rejecting query {pos}: nearest node {node} is {distance:.5} deg (~{metres:.0} m) away"
                );
                Err(SpatialError::TooFarFromNetwork { pos, distance, max: self.max_distance })
            }
            None => {
                log::debug!("rejecting query {pos}: network has no nodes");
                Err(SpatialError::TooFarFromNetwork {
                    pos,
                    distance: f64::INFINITY,
                    max: self.max_distance,
                })
            }
        }
    }

    /// A NaN tolerance accepts nothing.
    #[inline]
    fn accepts(&self, distance_deg: f64) -> bool {
        distance_deg <= self.max_distance
    }
}
