//! Spatial-subsystem error type.

use thiserror::Error;

use er_core::{GeoPoint, NodeId};

/// Errors produced by `er-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The graph source is malformed or inconsistent.  Fatal at startup; no
    /// partial network is ever returned alongside it.
    #[error("graph load error: {0}")]
    Load(String),

    /// No node lies within the resolution tolerance of `pos`.  `distance`
    /// is infinite when the network has no nodes.
    #[error("point {pos} is too far from the road network (nearest node {distance:.5} deg away, tolerance {max:.5} deg)")]
    TooFarFromNetwork { pos: GeoPoint, distance: f64, max: f64 },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpatialError {
    /// `true` for errors raised while loading a graph source.
    pub fn is_load_error(&self) -> bool {
        matches!(self, SpatialError::Load(_) | SpatialError::Io(_))
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
