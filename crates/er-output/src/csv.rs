//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `comparison.csv`
//! - `routes.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{ComparisonRow, OutputResult, RoutePointRow};

/// Writes comparison reports to two CSV files.
pub struct CsvWriter {
    comparison: Writer<File>,
    routes:     Writer<File>,
    rows:       usize,
    finished:   bool,
}

impl CsvWriter {
    /// Create (or truncate) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut comparison = Writer::from_path(dir.join("comparison.csv"))?;
        comparison.write_record(["metric", "shortest", "low_exposure", "change"])?;

        let mut routes = Writer::from_path(dir.join("routes.csv"))?;
        routes.write_record(["route", "seq", "lat", "lon"])?;

        Ok(Self {
            comparison,
            routes,
            rows: 0,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_comparison(&mut self, rows: &[ComparisonRow]) -> OutputResult<()> {
        for row in rows {
            self.comparison.write_record(&[
                row.metric.to_string(),
                format!("{:.2}", row.shortest),
                format!("{:.2}", row.low_exposure),
                row.change_label(),
            ])?;
        }
        self.rows += rows.len();
        Ok(())
    }

    fn write_routes(&mut self, rows: &[RoutePointRow]) -> OutputResult<()> {
        for row in rows {
            self.routes.write_record(&[
                row.route.to_string(),
                row.seq.to_string(),
                row.lat.to_string(),
                row.lon.to_string(),
            ])?;
        }
        self.rows += rows.len();
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.comparison.flush()?;
        self.routes.flush()?;
        log::debug!("csv output flushed ({} rows)", self.rows);
        Ok(())
    }
}
