//! Routing error type.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use er_core::{GeoPoint, NodeId};
use er_spatial::SpatialError;

/// Which end of a request a resolution failure refers to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Endpoint {
    Origin,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Origin => "origin",
            Endpoint::Destination => "destination",
        })
    }
}

/// Errors produced by `er-routing`.
///
/// `NoPath` and `ResolutionFailure` are ordinary outcomes of bad or
/// unlucky input; callers are expected to re-prompt rather than abort.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no feasible route from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("{which} {pos} is too far from the road network (nearest node {distance:.5} deg away)")]
    ResolutionFailure { which: Endpoint, pos: GeoPoint, distance: f64 },

    #[error("route search exceeded its {budget:?} budget")]
    Timeout { budget: Duration },

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
