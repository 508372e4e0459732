//! `er-output` — export of route comparisons for a presentation layer.
//!
//! | File             | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | `comparison.csv` | Statistics table: one row per metric, both routes, change |
//! | `routes.csv`     | Both route polylines as ordered `(lat, lon)` vertices     |
//!
//! Rows are plain data ([`ComparisonRow`], [`RoutePointRow`]) built from a
//! `RouteComparison`; any [`OutputWriter`] backend can persist them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use er_output::{CsvWriter, OutputWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./out"))?;
//! writer.write_report(&comparison, &network)?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{ComparisonRow, Metric, RouteKind, RoutePointRow};
pub use writer::OutputWriter;
