//! Graph source loaders.
//!
//! Two serialized forms are accepted.  Both describe nodes by projected
//! (TWD97 / TM2) coordinate and edges by the projected coordinates of their
//! endpoints.
//!
//! # CSV (a directory holding `nodes.csv` and `edges.csv`)
//!
//! ```csv
//! x,y
//! 302000.0,2770000.0
//! 302120.0,2770000.0
//! ```
//!
//! ```csv
//! u_x,u_y,v_x,v_y,length,pm25_expo,no2_expo,wbgt_expo,oneway,geometry
//! 302000.0,2770000.0,302120.0,2770000.0,120.0,2.4,3.1,3500.0,false,121.5201 25.0372;121.5213 25.0372
//! ```
//!
//! Only `u_x,u_y,v_x,v_y` are required.  Blank or absent attribute columns
//! read as `0`; `oneway` defaults to `false` (the segment is traversable in
//! both directions).  `geometry` is a `;`-separated list of `lon lat` pairs.
//!
//! # JSON
//!
//! ```json
//! {
//!   "nodes": [[302000.0, 2770000.0], [302120.0, 2770000.0]],
//!   "edges": [
//!     { "u": [302000.0, 2770000.0], "v": [302120.0, 2770000.0],
//!       "length": 120.0, "pm25_expo": 2.4, "oneway": false,
//!       "geometry": [[121.5201, 25.0372], [121.5213, 25.0372]] }
//!   ]
//! }
//! ```
//!
//! # Validation
//!
//! Loading is all-or-nothing.  Any of the following aborts with
//! [`SpatialError::Load`]: a non-finite coordinate or attribute, a
//! duplicated node, an edge endpoint that is not a listed node, a negative
//! exposure, or a malformed geometry.  Negative lengths are accepted; the
//! cost model clamps them.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use er_core::{GeoPoint, ProjectedPoint, TransverseMercator};

use crate::network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct CsvEdgeRecord {
    u_x: f64,
    u_y: f64,
    v_x: f64,
    v_y: f64,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    pm25_expo: Option<f64>,
    #[serde(default)]
    no2_expo: Option<f64>,
    #[serde(default)]
    wbgt_expo: Option<f64>,
    #[serde(default)]
    oneway: Option<String>,
    #[serde(default)]
    geometry: Option<String>,
}

#[derive(Deserialize)]
struct JsonGraph {
    nodes: Vec<[f64; 2]>,
    #[serde(default)]
    edges: Vec<JsonEdgeRecord>,
}

#[derive(Deserialize)]
struct JsonEdgeRecord {
    u: [f64; 2],
    v: [f64; 2],
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    pm25_expo: Option<f64>,
    #[serde(default)]
    no2_expo: Option<f64>,
    #[serde(default)]
    wbgt_expo: Option<f64>,
    #[serde(default)]
    oneway: bool,
    #[serde(default)]
    geometry: Option<Vec<[f64; 2]>>,
}

/// Format-independent edge description, validated by [`assemble`].
struct SourceEdge {
    u: ProjectedPoint,
    v: ProjectedPoint,
    attrs: EdgeAttrs,
    oneway: bool,
    geometry: Vec<GeoPoint>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a network from `path`.
///
/// A directory is read as the CSV pair `nodes.csv` / `edges.csv`; a file
/// with a `.json` extension as the JSON form.
pub fn load_path(path: &Path) -> SpatialResult<RoadNetwork> {
    if path.is_dir() {
        return load_csv(&path.join("nodes.csv"), &path.join("edges.csv"));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => Err(SpatialError::Load(format!(
            "unrecognised graph source {}: expected a directory with nodes.csv/edges.csv or a .json file",
            path.display()
        ))),
    }
}

/// Load a network from a `nodes.csv` / `edges.csv` pair.
pub fn load_csv(nodes_path: &Path, edges_path: &Path) -> SpatialResult<RoadNetwork> {
    let nodes = File::open(nodes_path)?;
    let edges = File::open(edges_path)?;
    load_csv_readers(nodes, edges)
}

/// Like [`load_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_csv_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut node_reader = csv::Reader::from_reader(nodes);
    let node_points = node_reader
        .deserialize::<NodeRecord>()
        .enumerate()
        .map(|(i, row)| {
            row.map(|r| ProjectedPoint::new(r.x, r.y))
                .map_err(|e| SpatialError::Load(format!("nodes row {}: {e}", i + 1)))
        })
        .collect::<SpatialResult<Vec<_>>>()?;

    let mut edge_reader = csv::Reader::from_reader(edges);
    let source_edges = edge_reader
        .deserialize::<CsvEdgeRecord>()
        .enumerate()
        .map(|(i, row)| {
            let ctx = |msg: String| SpatialError::Load(format!("edges row {}: {msg}", i + 1));
            let r = row.map_err(|e| ctx(e.to_string()))?;
            Ok(SourceEdge {
                u: ProjectedPoint::new(r.u_x, r.u_y),
                v: ProjectedPoint::new(r.v_x, r.v_y),
                attrs: attrs_or_zero(r.length, r.pm25_expo, r.no2_expo, r.wbgt_expo),
                oneway: parse_flag(r.oneway.as_deref()).map_err(ctx)?,
                geometry: parse_geometry(r.geometry.as_deref()).map_err(ctx)?,
            })
        })
        .collect::<SpatialResult<Vec<_>>>()?;

    assemble(node_points, source_edges, TransverseMercator::twd97_tm2())
}

/// Load a network from a JSON document.
pub fn load_json(path: &Path) -> SpatialResult<RoadNetwork> {
    load_json_reader(BufReader::new(File::open(path)?))
}

/// Like [`load_json`] but accepts any `Read` source.
pub fn load_json_reader<R: Read>(reader: R) -> SpatialResult<RoadNetwork> {
    let doc: JsonGraph = serde_json::from_reader(reader)
        .map_err(|e| SpatialError::Load(format!("invalid JSON graph: {e}")))?;

    let node_points = doc.nodes.iter().map(|&[x, y]| ProjectedPoint::new(x, y)).collect();
    let source_edges = doc
        .edges
        .into_iter()
        .map(|r| SourceEdge {
            u: ProjectedPoint::new(r.u[0], r.u[1]),
            v: ProjectedPoint::new(r.v[0], r.v[1]),
            attrs: attrs_or_zero(r.length, r.pm25_expo, r.no2_expo, r.wbgt_expo),
            oneway: r.oneway,
            geometry: r
                .geometry
                .unwrap_or_default()
                .into_iter()
                .map(|[lon, lat]| GeoPoint::new(lat, lon))
                .collect(),
        })
        .collect();

    assemble(node_points, source_edges, TransverseMercator::twd97_tm2())
}

// ── Validation + construction ─────────────────────────────────────────────────

fn assemble(
    nodes: Vec<ProjectedPoint>,
    edges: Vec<SourceEdge>,
    projection: TransverseMercator,
) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::with_projection(projection);
    builder.reserve(nodes.len(), edges.len() * 2);

    let mut seen = FxHashSet::default();
    for (i, p) in nodes.into_iter().enumerate() {
        if !p.is_finite() {
            return Err(SpatialError::Load(format!("node {i}: non-finite coordinate {p}")));
        }
        if !seen.insert(p.key()) {
            return Err(SpatialError::Load(format!("node {i}: duplicate coordinate {p}")));
        }
        builder.add_node(p);
    }

    for (i, e) in edges.into_iter().enumerate() {
        let endpoint = |p: ProjectedPoint| {
            builder.node_id(p).ok_or_else(|| {
                SpatialError::Load(format!("edge {i}: endpoint {p} is not a listed node"))
            })
        };
        let from = endpoint(e.u)?;
        let to = endpoint(e.v)?;
        validate_attrs(&e.attrs).map_err(|msg| SpatialError::Load(format!("edge {i}: {msg}")))?;
        if let Some(bad) = e.geometry.iter().find(|p| !p.is_finite()) {
            return Err(SpatialError::Load(format!("edge {i}: non-finite geometry vertex {bad}")));
        }

        if e.oneway {
            builder.add_directed_edge_with_geometry(from, to, e.attrs, e.geometry);
        } else {
            builder.add_road_with_geometry(from, to, e.attrs, e.geometry);
        }
    }

    let network = builder.build();
    log::info!(
        "loaded road network: {} nodes, {} directed edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

fn attrs_or_zero(
    length: Option<f64>,
    pm25: Option<f64>,
    no2: Option<f64>,
    wbgt: Option<f64>,
) -> EdgeAttrs {
    EdgeAttrs::new(
        length.unwrap_or(0.0),
        pm25.unwrap_or(0.0),
        no2.unwrap_or(0.0),
        wbgt.unwrap_or(0.0),
    )
}

fn validate_attrs(a: &EdgeAttrs) -> Result<(), String> {
    let fields = [
        ("length", a.length_m),
        ("pm25_expo", a.pm25_expo),
        ("no2_expo", a.no2_expo),
        ("wbgt_expo", a.wbgt_expo),
    ];
    for (name, v) in fields {
        if !v.is_finite() {
            return Err(format!("{name} is not finite ({v})"));
        }
    }
    for (name, v) in &fields[1..] {
        if *v < 0.0 {
            return Err(format!("{name} is negative ({v})"));
        }
    }
    Ok(())
}

// ── Field parsers ─────────────────────────────────────────────────────────────

fn parse_flag(s: Option<&str>) -> Result<bool, String> {
    match s.map(str::trim).unwrap_or("") {
        "" => Ok(false),
        v if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v == "1" => Ok(true),
        v if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") || v == "0" => Ok(false),
        v => Err(format!("invalid oneway flag {v:?}")),
    }
}

/// Parse `lon lat;lon lat;...` into geographic points.
fn parse_geometry(s: Option<&str>) -> Result<Vec<GeoPoint>, String> {
    let s = s.map(str::trim).unwrap_or("");
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .map(|pair| {
            let mut parts = pair.split_whitespace().map(str::parse::<f64>);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(lon)), Some(Ok(lat)), None) if lon.is_finite() && lat.is_finite() => {
                    Ok(GeoPoint::new(lat, lon))
                }
                _ => Err(format!("invalid geometry vertex {pair:?}: expected \"lon lat\"")),
            }
        })
        .collect()
}
