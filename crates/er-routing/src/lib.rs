//! `er-routing` — cost model, shortest-path search, and route comparison.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`cost`]    | `ExposureWeights`, `CostWeights`, `CostModel`                     |
//! | [`router`]  | `Router` trait, `DijkstraRouter`, `PathResult`, `ExposureTotals`  |
//! | [`compare`] | `RouteComparator`, request and result types                       |
//! | [`error`]   | `RoutingError`, `RoutingResult<T>`                                |
//!
//! # Concurrency
//!
//! Nothing here holds mutable state between calls.  A `RouteComparator`
//! borrows an immutable [`RoadNetwork`](er_spatial::RoadNetwork) and can be
//! shared across threads; every search allocates its own labels and heap.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Runs the two searches of a comparison with `rayon::join`    |
//! |            | when `RoutingConfig::parallel` is set.                      |

pub mod compare;
pub mod cost;
pub mod error;
pub mod router;

#[cfg(test)]
mod tests;

pub use compare::{
    ComparisonRequest, Improvement, PointRequest, RouteComparator, RouteComparison, RouteStats,
    RouteSummary,
};
pub use cost::{CostModel, CostWeights, ExposureWeights};
pub use error::{Endpoint, RoutingError, RoutingResult};
pub use router::{Deadline, DijkstraRouter, ExposureTotals, PathResult, Router};
