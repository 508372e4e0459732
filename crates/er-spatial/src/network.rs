//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_attrs`, geometry) are
//! sorted by source node and indexed by `EdgeId`.  Within one source node,
//! edges keep their insertion order, so a given source file always yields
//! the same `EdgeId`s.
//!
//! # Multigraph
//!
//! Parallel edges between the same node pair are kept as distinct `EdgeId`s
//! with their own attribute records.  The router treats each one as a
//! separate candidate; [`RoadNetwork::edges_between`] lists them.
//!
//! # Node identity
//!
//! A node is identified by its projected coordinate.  Its geographic
//! position is computed once, when the node is added, by the builder's
//! [`TransverseMercator`] handle.

use std::fmt;

use rustc_hash::FxHashMap;

use er_core::{EdgeId, GeoPoint, NodeId, ProjectedKey, ProjectedPoint, TransverseMercator};

use crate::index::SpatialIndex;

// ── Edge attributes ───────────────────────────────────────────────────────────

/// Physical and environmental attributes of one directed edge.
///
/// Every field defaults to zero; a missing attribute in the source never
/// becomes a NaN in routing arithmetic.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeAttrs {
    /// Length in metres.
    pub length_m: f64,
    /// Accumulated PM2.5 exposure for traversing the edge.
    pub pm25_expo: f64,
    /// Accumulated NO2 exposure for traversing the edge.
    pub no2_expo: f64,
    /// Accumulated WBGT (heat) exposure for traversing the edge.
    pub wbgt_expo: f64,
}

impl EdgeAttrs {
    /// An edge with only a length.
    pub fn with_length(length_m: f64) -> Self {
        Self { length_m, ..Self::default() }
    }

    pub fn new(length_m: f64, pm25_expo: f64, no2_expo: f64, wbgt_expo: f64) -> Self {
        Self { length_m, pm25_expo, no2_expo, wbgt_expo }
    }

    /// `true` if every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.length_m, self.pm25_expo, self.no2_expo, self.wbgt_expo]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Copy with every NaN or infinite field replaced by zero.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            length_m: finite_or_zero(self.length_m),
            pm25_expo: finite_or_zero(self.pm25_expo),
            no2_expo: finite_or_zero(self.no2_expo),
            wbgt_expo: finite_or_zero(self.wbgt_expo),
        }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Road graph in CSR format plus a spatial index for node snapping.
///
/// The builder replaces non-finite edge attributes with zero, so every
/// stored attribute is a finite number.  Immutable once built, and
/// `Send + Sync`: one instance can serve any number of concurrent requests.
/// Do not construct directly; use [`RoadNetworkBuilder`] or the
/// [`loader`](crate::loader) functions.
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Projected (source CRS) position of each node.  Indexed by `NodeId`.
    pub node_proj: Vec<ProjectedPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// route reconstruction (trace `prev_edge` back to source).
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Attribute record of each edge.
    pub edge_attrs: Vec<EdgeAttrs>,

    /// Display shape of each edge, source to destination.  Empty when the
    /// source carried no geometry.
    edge_geometry: Vec<Box<[GeoPoint]>>,

    node_lookup: FxHashMap<ProjectedKey, NodeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: SpatialIndex,
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    ///
    /// Any routing request against an empty network fails, and every query
    /// point fails to resolve.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// `true` if `node` indexes a node of this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node data ─────────────────────────────────────────────────────────

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn node_projected(&self, node: NodeId) -> ProjectedPoint {
        self.node_proj[node.index()]
    }

    /// Look a node up by its projected coordinate (bit-exact).
    pub fn node_by_key(&self, key: ProjectedKey) -> Option<NodeId> {
        self.node_lookup.get(&key).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; does not allocate.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All directed edges from `from` to `to`, parallel edges included.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    #[inline]
    pub fn edge_attrs(&self, edge: EdgeId) -> &EdgeAttrs {
        &self.edge_attrs[edge.index()]
    }

    /// Display shape of `edge`; empty if the source had none.
    #[inline]
    pub fn edge_geometry(&self, edge: EdgeId) -> &[GeoPoint] {
        &self.edge_geometry[edge.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_idx
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// sorts edges by source node, constructs the CSR arrays, and bulk-loads the
/// spatial index.
///
/// # Example
///
/// ```
/// use er_core::ProjectedPoint;
/// use er_spatial::{EdgeAttrs, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(ProjectedPoint::new(302_000.0, 2_770_000.0));
/// let c = b.add_node(ProjectedPoint::new(302_120.0, 2_770_000.0));
/// b.add_road(a, c, EdgeAttrs::new(120.0, 2.4, 3.1, 3_500.0));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    projection: TransverseMercator,
    nodes_proj: Vec<ProjectedPoint>,
    nodes_geo:  Vec<GeoPoint>,
    lookup:     FxHashMap<ProjectedKey, NodeId>,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    attrs:    EdgeAttrs,
    geometry: Box<[GeoPoint]>,
}

impl RoadNetworkBuilder {
    /// A builder projecting from TWD97 / TM2.
    pub fn new() -> Self {
        Self::with_projection(TransverseMercator::twd97_tm2())
    }

    pub fn with_projection(projection: TransverseMercator) -> Self {
        Self {
            projection,
            nodes_proj: Vec::new(),
            nodes_geo:  Vec::new(),
            lookup:     FxHashMap::default(),
            raw_edges:  Vec::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut b = Self::new();
        b.reserve(nodes, edges);
        b
    }

    pub fn reserve(&mut self, nodes: usize, edges: usize) {
        self.nodes_proj.reserve(nodes);
        self.nodes_geo.reserve(nodes);
        self.lookup.reserve(nodes);
        self.raw_edges.reserve(edges);
    }

    /// Add a node at projected position `pos` and return its `NodeId`.
    ///
    /// Ids are sequential from 0.  Adding a coordinate that is already
    /// present returns the existing id.
    pub fn add_node(&mut self, pos: ProjectedPoint) -> NodeId {
        let key = pos.key();
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes_proj.len() as u32);
        self.nodes_proj.push(pos);
        self.nodes_geo.push(self.projection.inverse(pos));
        self.lookup.insert(key, id);
        id
    }

    /// Add a node given in geographic coordinates.
    ///
    /// The position is projected forward first, so the stored geographic
    /// coordinate is still derived from the projected key.
    pub fn add_geo_node(&mut self, pos: GeoPoint) -> NodeId {
        let projected = self.projection.forward(pos);
        self.add_node(projected)
    }

    /// Id of a node added earlier at exactly `pos`.
    pub fn node_id(&self, pos: ProjectedPoint) -> Option<NodeId> {
        self.lookup.get(&pos.key()).copied()
    }

    /// Geographic position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes_geo[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes_proj.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) {
        self.add_directed_edge_with_geometry(from, to, attrs, Vec::new());
    }

    /// Add a **directed** edge carrying a display shape (source to
    /// destination order).
    pub fn add_directed_edge_with_geometry(
        &mut self,
        from: NodeId,
        to: NodeId,
        attrs: EdgeAttrs,
        geometry: Vec<GeoPoint>,
    ) {
        let attrs = if attrs.is_finite() {
            attrs
        } else {
            log::warn!("edge {from} -> {to}: non-finite attributes {attrs:?} replaced by zero");
            attrs.sanitized()
        };
        self.raw_edges.push(RawEdge { from, to, attrs, geometry: geometry.into_boxed_slice() });
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment.  Both directions share the same attributes.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) {
        self.add_directed_edge(a, b, attrs);
        self.add_directed_edge(b, a, attrs);
    }

    /// Like [`add_road`](Self::add_road); the reverse edge gets the shape
    /// reversed.
    pub fn add_road_with_geometry(
        &mut self,
        a: NodeId,
        b: NodeId,
        attrs: EdgeAttrs,
        geometry: Vec<GeoPoint>,
    ) {
        let mut reversed = geometry.clone();
        reversed.reverse();
        self.add_directed_edge_with_geometry(a, b, attrs, geometry);
        self.add_directed_edge_with_geometry(b, a, attrs, reversed);
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for the index
    /// bulk load, where N = nodes, E = edges.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes_proj.len();
        let edge_count = self.raw_edges.len();

        // Stable sort: parallel edges keep their insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:  Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:    Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_attrs: Vec<EdgeAttrs> = raw.iter().map(|e| e.attrs).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let edge_geometry: Vec<Box<[GeoPoint]>> = raw.into_iter().map(|e| e.geometry).collect();

        let spatial_idx = SpatialIndex::build(&self.nodes_geo);

        RoadNetwork {
            node_pos: self.nodes_geo,
            node_proj: self.nodes_proj,
            node_out_start,
            edge_from,
            edge_to,
            edge_attrs,
            edge_geometry,
            node_lookup: self.lookup,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
