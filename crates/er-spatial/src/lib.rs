//! `er-spatial` — road network store, spatial indexing, and node resolution.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`network`]  | `RoadNetwork` (CSR multigraph), `RoadNetworkBuilder`, `EdgeAttrs` |
//! | [`index`]    | `SpatialIndex` (R-tree over node lat/lon)                 |
//! | [`resolver`] | `NodeResolver`, `Snap`                                    |
//! | [`loader`]   | CSV and JSON graph sources with load-time validation      |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod index;
pub mod loader;
pub mod network;
pub mod resolver;


pub use error::{SpatialError, SpatialResult};
pub use index::SpatialIndex;
pub use loader::{load_csv, load_csv_readers, load_json, load_json_reader, load_path};
pub use network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
pub use resolver::{NodeResolver, Snap};
