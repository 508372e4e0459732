//! Routing service configuration.

use std::time::Duration;

use crate::{CoreError, CoreResult};

/// Default node-snapping tolerance in degrees (roughly 1 km at Taipei's
/// latitude).  Intentionally coarse.
pub const DEFAULT_MAX_SNAP_DISTANCE_DEG: f64 = 0.01;

/// Knobs shared by every routing request served from one loaded network.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the resolver and comparator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Query points farther than this (degree-space Euclidean) from every
    /// node are rejected rather than snapped.
    pub max_snap_distance_deg: f64,

    /// Wall-clock budget in milliseconds for one whole request, shared by
    /// both searches.  `None` disables the deadline.
    pub deadline_ms: Option<u64>,

    /// Run the length-optimal and exposure-optimal searches concurrently.
    /// Has no effect unless `er-routing` is built with `parallel`.
    pub parallel: bool,
}

impl RoutingConfig {
    /// The per-request budget as a `Duration`, if one is set.
    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Reject settings no request could be served with.
    pub fn validate(&self) -> CoreResult<()> {
        let tol = self.max_snap_distance_deg;
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(CoreError::Config(format!(
                "max_snap_distance_deg must be a finite non-negative number, got {tol}"
            )));
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_snap_distance_deg: DEFAULT_MAX_SNAP_DISTANCE_DEG,
            deadline_ms: None,
            parallel: false,
        }
    }
}
