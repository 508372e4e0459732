//! `er-core` — foundational types for exposure-aware routing.
//!
//! This crate is a dependency of every other `er-*` crate.  It intentionally
//! has no `er-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                    |
//! | [`geo`]         | `GeoPoint`, `ProjectedPoint`, `ProjectedKey`          |
//! | [`projection`]  | `TransverseMercator`, `TWD97_TM2`                     |
//! | [`transport`]   | `TransportMode` and its travel speeds                 |
//! | [`config`]      | `RoutingConfig`                                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public value types.      |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod projection;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DEFAULT_MAX_SNAP_DISTANCE_DEG, RoutingConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, ProjectedKey, ProjectedPoint};
pub use ids::{EdgeId, NodeId};
pub use projection::{Ellipsoid, GRS80, TWD97_TM2, TmParams, TransverseMercator};
pub use transport::TransportMode;
