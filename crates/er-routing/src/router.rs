//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The comparator calls routing via the [`Router`] trait, so applications
//! can swap in custom implementations (A*, contraction hierarchies) without
//! touching the comparison logic.
//!
//! # Cost vs. totals
//!
//! The search minimizes whatever [`CostModel`] it is given.  Once a path is
//! found, [`ExposureTotals`] re-walks the exact edges the search chose and
//! sums the raw attributes, never the weighted cost.  A length-optimal and
//! an exposure-optimal path are therefore directly comparable.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use ordered_float::OrderedFloat;

use er_core::{EdgeId, GeoPoint, NodeId};
use er_spatial::{EdgeAttrs, RoadNetwork, SpatialError};

use crate::cost::CostModel;
use crate::{RoutingError, RoutingResult};

/// How many heap pops between deadline checks.
const DEADLINE_CHECK_INTERVAL: u32 = 1_024;

// ── ExposureTotals ────────────────────────────────────────────────────────────

/// Raw attribute sums along a path.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ExposureTotals {
    pub length_m: f64,
    pub pm25: f64,
    pub no2: f64,
    pub wbgt: f64,
}

impl ExposureTotals {
    /// Sum the attributes of `edges` in order.
    pub fn along(network: &RoadNetwork, edges: &[EdgeId]) -> Self {
        edges.iter().fold(Self::default(), |mut acc, &e| {
            acc.add(network.edge_attrs(e));
            acc
        })
    }

    #[inline]
    pub fn add(&mut self, attrs: &EdgeAttrs) {
        self.length_m += attrs.length_m;
        self.pm25 += attrs.pm25_expo;
        self.no2 += attrs.no2_expo;
        self.wbgt += attrs.wbgt_expo;
    }
}

// ── PathResult ────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Visited nodes in order, origin first.  Never empty.
    pub nodes: Vec<NodeId>,
    /// Edges traversed in order; `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Total cost under the model that produced the path.
    pub cost: f64,
    /// Raw attribute sums along `edges`.
    pub totals: ExposureTotals,
}

impl PathResult {
    /// `true` if the origin and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn origin(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Build a path from a realized node sequence.
    ///
    /// Where several parallel edges join two consecutive nodes, the one
    /// cheapest under `cost` is used, with the same tie-breaking as the
    /// search and finally the lowest `EdgeId`.  Returns
    /// `None` if `nodes` is empty or two consecutive nodes are not joined.
    pub fn from_nodes(network: &RoadNetwork, nodes: &[NodeId], cost: &CostModel) -> Option<Self> {
        if nodes.is_empty() || !nodes.iter().all(|&n| network.contains(n)) {
            return None;
        }
        let mut edges = Vec::with_capacity(nodes.len() - 1);
        let mut total_cost = 0.0;
        for pair in nodes.windows(2) {
            let (edge, c) = network
                .edges_between(pair[0], pair[1])
                .map(|e| {
                    let attrs = network.edge_attrs(e);
                    (e, cost.edge_cost(attrs), cost.tie_break_cost(attrs))
                })
                .min_by(|a, b| {
                    a.1.total_cmp(&b.1)
                        .then(a.2.total_cmp(&b.2))
                        .then(a.0.cmp(&b.0))
                })
                .map(|(e, c, _)| (e, c))?;
            edges.push(edge);
            total_cost += c;
        }
        let totals = ExposureTotals::along(network, &edges);
        Some(Self { nodes: nodes.to_vec(), edges, cost: total_cost, totals })
    }

    /// Polyline for display.
    ///
    /// Uses each edge's own shape where the source provided one and a
    /// straight segment between node positions otherwise.  Shared vertices
    /// between consecutive edges appear once.
    pub fn geometry(&self, network: &RoadNetwork) -> Vec<GeoPoint> {
        let mut line: Vec<GeoPoint> = Vec::with_capacity(self.nodes.len());
        line.push(network.node_pos(self.origin()));
        for &e in &self.edges {
            let shape = network.edge_geometry(e);
            let straight = [
                network.node_pos(network.edge_from[e.index()]),
                network.node_pos(network.edge_to[e.index()]),
            ];
            let points = if shape.is_empty() { &straight[..] } else { shape };
            for &p in points {
                if line.last() != Some(&p) {
                    line.push(p);
                }
            }
        }
        line
    }
}

// ── Deadline ──────────────────────────────────────────────────────────────────

/// A wall-clock cutoff shared by every search of one request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self { at: Instant::now() + budget, budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[inline]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// The sooner of two optional deadlines.
    pub fn earliest(a: Option<Deadline>, b: Option<Deadline>) -> Option<Deadline> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.at < a.at { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn timeout(&self) -> RoutingError {
        RoutingError::Timeout { budget: self.budget() }
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve concurrent
/// requests.  All per-search state lives on the stack of `route_until`.
pub trait Router: Send + Sync {
    /// Compute the cheapest path from `from` to `to` under `cost`, giving
    /// up with [`RoutingError::Timeout`] once `deadline` has passed.
    ///
    /// `from == to` yields a single-node path with zero totals.  Returns
    /// [`RoutingError::NoPath`] if `to` is unreachable.
    fn route_until(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &CostModel,
        deadline: Option<Deadline>,
    ) -> RoutingResult<PathResult>;

    /// [`route_until`](Self::route_until) with no request deadline.
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &CostModel,
    ) -> RoutingResult<PathResult> {
        self.route_until(network, from, to, cost, None)
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph.
///
/// Labels are compared by primary cost, then by the cost model's tie-break
/// cost, then by `NodeId`.  A label is only replaced by a strictly better
/// one, so results are deterministic for a given network.  The search
/// chooses among parallel edges itself and records the one it used.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter {
    budget: Option<Duration>,
}

impl DijkstraRouter {
    pub fn new() -> Self {
        Self { budget: None }
    }

    /// Abort any single search that runs longer than `budget`, on top of
    /// whatever request deadline the caller passes.
    pub fn with_deadline(budget: Duration) -> Self {
        Self { budget: Some(budget) }
    }
}

impl Router for DijkstraRouter {
    fn route_until(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        cost: &CostModel,
        deadline: Option<Deadline>,
    ) -> RoutingResult<PathResult> {
        for node in [from, to] {
            if !network.contains(node) {
                return Err(SpatialError::NodeNotFound(node).into());
            }
        }
        let deadline = Deadline::earliest(deadline, self.budget.map(Deadline::after));
        dijkstra(network, from, to, cost, deadline)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    cost: &CostModel,
    deadline: Option<Deadline>,
) -> RoutingResult<PathResult> {
    if let Some(d) = deadline {
        if d.expired() {
            return Err(d.timeout());
        }
    }
    if from == to {
        return Ok(PathResult {
            nodes: vec![from],
            edges: vec![],
            cost: 0.0,
            totals: ExposureTotals::default(),
        });
    }

    let n = network.node_count();
    // dist[v] = best known (cost, tie-break) label to reach v.
    let mut dist = vec![Label::UNREACHED; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = Label::ZERO;

    // Min-heap: (label, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Label, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Label::ZERO, from)));

    let mut pops: u32 = 0;

    while let Some(Reverse((label, node))) = heap.pop() {
        if node == to {
            log::debug!("dijkstra {from} -> {to}: settled after {pops} pops, cost {:.3}", label.cost());
            return Ok(reconstruct(network, &prev_edge, from, to, label.cost()));
        }

        // Skip stale heap entries.
        if label > dist[node.index()] {
            continue;
        }

        pops += 1;
        if let Some(d) = deadline {
            if pops % DEADLINE_CHECK_INTERVAL == 0 && d.expired() {
                return Err(d.timeout());
            }
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_label = label.extend(cost, network.edge_attrs(edge));

            if new_label < dist[neighbor.index()] {
                dist[neighbor.index()] = new_label;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_label, neighbor)));
            }
        }
    }

    Err(RoutingError::NoPath { from, to })
}

/// Lexicographic search label: primary cost, then tie-break cost.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Label(OrderedFloat<f64>, OrderedFloat<f64>);

impl Label {
    const ZERO: Label = Label(OrderedFloat(0.0), OrderedFloat(0.0));
    const UNREACHED: Label = Label(OrderedFloat(f64::INFINITY), OrderedFloat(f64::INFINITY));

    #[inline]
    fn extend(self, cost: &CostModel, attrs: &EdgeAttrs) -> Label {
        Label(
            OrderedFloat(self.0.0 + cost.edge_cost(attrs)),
            OrderedFloat(self.1.0 + cost.tie_break_cost(attrs)),
        )
    }

    #[inline]
    fn cost(self) -> f64 {
        self.0.0
    }
}

fn reconstruct(
    network: &RoadNetwork,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_cost: f64,
) -> PathResult {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));

    let totals = ExposureTotals::along(network, &edges);
    PathResult { nodes, edges, cost: total_cost, totals }
}
