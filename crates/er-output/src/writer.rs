//! The `OutputWriter` trait implemented by backend writers.

use er_routing::RouteComparison;
use er_spatial::RoadNetwork;

use crate::{ComparisonRow, OutputResult, RoutePointRow};

/// A sink for comparison reports.
pub trait OutputWriter {
    /// Write statistics rows.
    fn write_comparison(&mut self, rows: &[ComparisonRow]) -> OutputResult<()>;

    /// Write polyline vertices.
    fn write_routes(&mut self, rows: &[RoutePointRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;

    /// Write the statistics table and both polylines of one comparison.
    fn write_report(&mut self, cmp: &RouteComparison, network: &RoadNetwork) -> OutputResult<()> {
        self.write_comparison(&ComparisonRow::table(cmp))?;
        self.write_routes(&RoutePointRow::for_comparison(cmp, network))
    }
}
