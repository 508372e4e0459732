//! Length-optimal vs. exposure-optimal route comparison.
//!
//! For one origin/destination pair the comparator runs two searches, one
//! minimizing distance and one minimizing the weighted exposure cost, and
//! derives per-route statistics plus the change of the low-exposure route
//! relative to the shortest one.
//!
//! # Statistics
//!
//! | Field              | Definition                                          |
//! |--------------------|-----------------------------------------------------|
//! | `travel_time_min`  | `distance_m / speed` for the request's mode         |
//! | `*_rate`           | accumulated exposure ÷ `distance_m` (0 if length 0) |
//! | `time_pct`         | % change in travel time                             |
//! | `pm25_pct`/`no2_pct` | % change in accumulated exposure                  |
//! | `wbgt_delta`       | difference in per-metre WBGT, in °C                 |
//!
//! Every change is 0 when its baseline is 0; for `wbgt_delta` the baseline
//! is the shortest route's accumulated WBGT.

use er_core::{GeoPoint, NodeId, RoutingConfig, TransportMode};
use er_spatial::{NodeResolver, RoadNetwork, SpatialError};

use crate::cost::{CostModel, CostWeights};
use crate::router::{Deadline, DijkstraRouter, ExposureTotals, PathResult, Router};
use crate::{Endpoint, RoutingError, RoutingResult};

// ── Requests ──────────────────────────────────────────────────────────────────

/// A comparison between two already-resolved nodes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComparisonRequest {
    pub origin: NodeId,
    pub destination: NodeId,
    pub weights: CostWeights,
    pub mode: TransportMode,
}

/// A comparison between two raw query coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub weights: CostWeights,
    pub mode: TransportMode,
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Derived statistics of one route.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RouteStats {
    pub distance_m: f64,
    pub travel_time_min: f64,
    pub pm25_rate: f64,
    pub no2_rate: f64,
    pub wbgt_rate: f64,
}

impl RouteStats {
    pub fn from_totals(totals: &ExposureTotals, mode: TransportMode) -> Self {
        let per_metre = |acc: f64| if totals.length_m > 0.0 { acc / totals.length_m } else { 0.0 };
        Self {
            distance_m: totals.length_m,
            travel_time_min: mode.travel_time_min(totals.length_m),
            pm25_rate: per_metre(totals.pm25),
            no2_rate: per_metre(totals.no2),
            wbgt_rate: per_metre(totals.wbgt),
        }
    }
}

/// One side of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary {
    pub path: PathResult,
    pub stats: RouteStats,
}

impl RouteSummary {
    fn new(path: PathResult, mode: TransportMode) -> Self {
        let stats = RouteStats::from_totals(&path.totals, mode);
        Self { path, stats }
    }
}

/// Change of the low-exposure route relative to the shortest route.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Improvement {
    pub time_pct: f64,
    pub pm25_pct: f64,
    pub no2_pct: f64,
    /// Absolute difference in per-metre WBGT, °C.
    pub wbgt_delta: f64,
}

impl Improvement {
    pub fn between(base: &RouteSummary, alt: &RouteSummary) -> Self {
        Self {
            time_pct: pct_change(base.stats.travel_time_min, alt.stats.travel_time_min),
            pm25_pct: pct_change(base.path.totals.pm25, alt.path.totals.pm25),
            no2_pct: pct_change(base.path.totals.no2, alt.path.totals.no2),
            wbgt_delta: if base.path.totals.wbgt != 0.0 {
                alt.stats.wbgt_rate - base.stats.wbgt_rate
            } else {
                0.0
            },
        }
    }
}

#[inline]
fn pct_change(base: f64, alt: f64) -> f64 {
    if base != 0.0 { (alt - base) / base * 100.0 } else { 0.0 }
}

/// Full comparison result, ready for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteComparison {
    pub mode: TransportMode,
    pub weights: CostWeights,
    /// Length-optimal route.
    pub shortest: RouteSummary,
    /// Exposure-optimal route.
    pub low_exposure: RouteSummary,
    pub improvement: Improvement,
}

// ── RouteComparator ───────────────────────────────────────────────────────────

/// Runs paired searches over one network.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (default [`DijkstraRouter`]).  Swap it at
/// compile time for a different algorithm with no runtime overhead.
pub struct RouteComparator<'a, R: Router = DijkstraRouter> {
    network: &'a RoadNetwork,
    router: R,
    config: RoutingConfig,
}

impl<'a> RouteComparator<'a> {
    /// Dijkstra comparator.
    pub fn new(network: &'a RoadNetwork, config: RoutingConfig) -> Self {
        Self { network, router: DijkstraRouter::new(), config }
    }
}

impl<'a, R: Router> RouteComparator<'a, R> {
    pub fn with_router(network: &'a RoadNetwork, router: R, config: RoutingConfig) -> Self {
        Self { network, router, config }
    }

    pub fn network(&self) -> &'a RoadNetwork {
        self.network
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Resolver using this comparator's snapping tolerance.
    pub fn resolver(&self) -> NodeResolver<'a> {
        NodeResolver::from_config(self.network, &self.config)
    }

    /// Compare the two routes between resolved nodes.
    ///
    /// `config.deadline_ms` bounds the whole comparison: both searches share
    /// one deadline taken when this call starts.  Fails as a whole if either
    /// search fails.
    pub fn compare(&self, req: &ComparisonRequest) -> RoutingResult<RouteComparison> {
        let deadline = self.config.deadline().map(Deadline::after);
        let length = CostModel::length();
        let exposure = CostModel::new(req.weights);

        let (shortest, low_exposure) =
            self.search_pair(req.origin, req.destination, &length, &exposure, deadline);
        let shortest = RouteSummary::new(shortest?, req.mode);
        let low_exposure = RouteSummary::new(low_exposure?, req.mode);
        let improvement = Improvement::between(&shortest, &low_exposure);

        log::debug!(
            "compared {} -> {}: shortest {:.0} m, low-exposure {:.0} m",
            req.origin,
            req.destination,
            shortest.stats.distance_m,
            low_exposure.stats.distance_m
        );

        Ok(RouteComparison {
            mode: req.mode,
            weights: exposure.weights(),
            shortest,
            low_exposure,
            improvement,
        })
    }

    /// Resolve raw coordinates, then [`compare`](Self::compare).
    pub fn compare_points(&self, req: &PointRequest) -> RoutingResult<RouteComparison> {
        let resolver = self.resolver();
        let origin = resolve(&resolver, req.origin, Endpoint::Origin)?;
        let destination = resolve(&resolver, req.destination, Endpoint::Destination)?;
        self.compare(&ComparisonRequest {
            origin,
            destination,
            weights: req.weights,
            mode: req.mode,
        })
    }

    #[cfg(feature = "parallel")]
    fn search_pair(
        &self,
        from: NodeId,
        to: NodeId,
        length: &CostModel,
        exposure: &CostModel,
        deadline: Option<Deadline>,
    ) -> (RoutingResult<PathResult>, RoutingResult<PathResult>) {
        if self.config.parallel {
            rayon::join(
                || self.router.route_until(self.network, from, to, length, deadline),
                || self.router.route_until(self.network, from, to, exposure, deadline),
            )
        } else {
            (
                self.router.route_until(self.network, from, to, length, deadline),
                self.router.route_until(self.network, from, to, exposure, deadline),
            )
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn search_pair(
        &self,
        from: NodeId,
        to: NodeId,
        length: &CostModel,
        exposure: &CostModel,
        deadline: Option<Deadline>,
    ) -> (RoutingResult<PathResult>, RoutingResult<PathResult>) {
        (
            self.router.route_until(self.network, from, to, length, deadline),
            self.router.route_until(self.network, from, to, exposure, deadline),
        )
    }
}

fn resolve(resolver: &NodeResolver<'_>, pos: GeoPoint, which: Endpoint) -> RoutingResult<NodeId> {
    match resolver.resolve_or_err(pos) {
        Ok(node) => Ok(node),
        Err(SpatialError::TooFarFromNetwork { pos, distance, .. }) => {
            Err(RoutingError::ResolutionFailure { which, pos, distance })
        }
        Err(e) => Err(e.into()),
    }
}
