//! Plain data row types written by output backends.

use std::fmt;

use er_core::GeoPoint;
use er_routing::RouteComparison;
use er_spatial::RoadNetwork;

/// One line of the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Travel time, minutes.
    TravelTime,
    /// PM2.5 exposure per metre.
    Pm25,
    /// NO2 exposure per metre.
    No2,
    /// WBGT per metre.
    Wbgt,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::TravelTime, Metric::Pm25, Metric::No2, Metric::Wbgt];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::TravelTime => "time_min",
            Metric::Pm25 => "pm25_rate",
            Metric::No2 => "no2_rate",
            Metric::Wbgt => "wbgt_rate",
        }
    }

    /// Suffix of the `change` column: relative for the first three,
    /// absolute degrees for WBGT.
    pub fn change_unit(self) -> &'static str {
        match self {
            Metric::Wbgt => "°C",
            _ => "%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a comparison a polyline belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Shortest,
    LowExposure,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Shortest => "shortest",
            RouteKind::LowExposure => "low_exposure",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics of both routes for one metric, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    pub metric:       Metric,
    pub shortest:     f64,
    pub low_exposure: f64,
    /// Percent change, or °C difference for [`Metric::Wbgt`].
    pub change:       f64,
}

impl ComparisonRow {
    /// The four rows of the statistics table, in display order.
    pub fn table(cmp: &RouteComparison) -> [ComparisonRow; 4] {
        let (a, b, imp) = (&cmp.shortest.stats, &cmp.low_exposure.stats, &cmp.improvement);
        Metric::ALL.map(|metric| {
            let (shortest, low_exposure, change) = match metric {
                Metric::TravelTime => (a.travel_time_min, b.travel_time_min, imp.time_pct),
                Metric::Pm25 => (a.pm25_rate, b.pm25_rate, imp.pm25_pct),
                Metric::No2 => (a.no2_rate, b.no2_rate, imp.no2_pct),
                Metric::Wbgt => (a.wbgt_rate, b.wbgt_rate, imp.wbgt_delta),
            };
            ComparisonRow {
                metric,
                shortest: round2(shortest),
                low_exposure: round2(low_exposure),
                change: round2(change),
            }
        })
    }

    /// `change` with its unit, e.g. `-12.5%` or `0.03°C`.
    pub fn change_label(&self) -> String {
        format!("{:.2}{}", self.change, self.metric.change_unit())
    }
}

/// One polyline vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePointRow {
    pub route: RouteKind,
    /// Position along the polyline, from 0.
    pub seq:   u32,
    pub lat:   f64,
    pub lon:   f64,
}

impl RoutePointRow {
    pub fn polyline(route: RouteKind, line: &[GeoPoint]) -> Vec<RoutePointRow> {
        line.iter()
            .zip(0u32..)
            .map(|(p, seq)| RoutePointRow { route, seq, lat: p.lat, lon: p.lon })
            .collect()
    }

    /// Both polylines of `cmp`, shortest first.
    pub fn for_comparison(cmp: &RouteComparison, network: &RoadNetwork) -> Vec<RoutePointRow> {
        let mut rows = Self::polyline(RouteKind::Shortest, &cmp.shortest.path.geometry(network));
        rows.extend(Self::polyline(RouteKind::LowExposure, &cmp.low_exposure.path.geometry(network)));
        rows
    }
}

/// Round half away from zero to two decimals; never yields `-0.0`.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0 + 0.0
}
