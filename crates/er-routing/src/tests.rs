//! Unit tests for er-routing.

#[cfg(test)]
mod helpers {
    use er_core::{GeoPoint, NodeId, ProjectedPoint};
    use er_spatial::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};

    /// Four nodes A, B, C, D with two directed branches A→B→D and A→C→D.
    ///
    /// Both branches are 150 m long; A→B→D carries far less exposure.
    pub fn diamond() -> (RoadNetwork, [NodeId; 4]) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.040, 121.510));
        let bb = b.add_geo_node(GeoPoint::new(25.041, 121.511));
        let c = b.add_geo_node(GeoPoint::new(25.039, 121.511));
        let d = b.add_geo_node(GeoPoint::new(25.040, 121.512));

        b.add_directed_edge(a, bb, EdgeAttrs::new(100.0, 1.0, 1.0, 0.0));
        b.add_directed_edge(a, c, EdgeAttrs::new(50.0, 10.0, 10.0, 0.0));
        b.add_directed_edge(bb, d, EdgeAttrs::new(50.0, 1.0, 1.0, 0.0));
        b.add_directed_edge(c, d, EdgeAttrs::new(100.0, 1.0, 1.0, 0.0));

        (b.build(), [a, bb, c, d])
    }

    /// Short polluted branch A→B→D (200 m) vs. long clean branch A→C→D (300 m).
    pub fn detour() -> (RoadNetwork, [NodeId; 4]) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.040, 121.510));
        let bb = b.add_geo_node(GeoPoint::new(25.041, 121.511));
        let c = b.add_geo_node(GeoPoint::new(25.039, 121.511));
        let d = b.add_geo_node(GeoPoint::new(25.040, 121.512));

        b.add_road(a, bb, EdgeAttrs::new(100.0, 10.0, 0.0, 3_000.0));
        b.add_road(bb, d, EdgeAttrs::new(100.0, 10.0, 0.0, 3_000.0));
        b.add_road(a, c, EdgeAttrs::new(150.0, 1.0, 0.0, 4_200.0));
        b.add_road(c, d, EdgeAttrs::new(150.0, 1.0, 0.0, 4_200.0));

        (b.build(), [a, bb, c, d])
    }

    /// `side × side` lattice of 100 m bidirectional roads.
    pub fn lattice(side: u32) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let node = |b: &mut RoadNetworkBuilder, i: u32, j: u32| {
            b.add_node(ProjectedPoint::new(
                300_000.0 + f64::from(i) * 100.0,
                2_770_000.0 + f64::from(j) * 100.0,
            ))
        };
        for i in 0..side {
            for j in 0..side {
                let here = node(&mut b, i, j);
                if i + 1 < side {
                    let east = node(&mut b, i + 1, j);
                    b.add_road(here, east, EdgeAttrs::new(100.0, 1.0, 1.0, 30.0));
                }
                if j + 1 < side {
                    let north = node(&mut b, i, j + 1);
                    b.add_road(here, north, EdgeAttrs::new(100.0, 1.0, 1.0, 30.0));
                }
            }
        }
        b.build()
    }
}

// ── Cost model ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cost {
    use er_spatial::EdgeAttrs;

    use crate::{CostModel, CostWeights, ExposureWeights};

    #[test]
    fn normalization_sums_to_one() {
        let w = ExposureWeights::new(50.0, 30.0, 20.0).normalized().unwrap();
        assert!((w.pm25 - 0.5).abs() < 1e-12);
        assert!((w.no2 - 0.3).abs() < 1e-12);
        assert!((w.wbgt - 0.2).abs() < 1e-12);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = ExposureWeights::new(7.0, 3.0, 11.0).normalized().unwrap();
        let twice = once.normalized().unwrap();
        assert!((once.pm25 - twice.pm25).abs() < 1e-12);
        assert!((once.no2 - twice.no2).abs() < 1e-12);
        assert!((once.wbgt - twice.wbgt).abs() < 1e-12);
    }

    #[test]
    fn zero_sliders_fall_back_to_length() {
        assert_eq!(ExposureWeights::from_sliders(0.0, 0.0, 0.0), CostWeights::Length);
        assert!(CostModel::new(CostWeights::Exposure(ExposureWeights::new(0.0, 0.0, 0.0)))
            .weights()
            .is_length());
    }

    #[test]
    fn negative_and_nan_weights_count_as_zero() {
        let w = ExposureWeights::new(-5.0, f64::NAN, 10.0).normalized().unwrap();
        assert_eq!(w.pm25, 0.0);
        assert_eq!(w.no2, 0.0);
        assert_eq!(w.wbgt, 1.0);
        assert!(ExposureWeights::new(-1.0, -2.0, 0.0).normalized().is_none());
    }

    #[test]
    fn model_renormalizes_raw_weights() {
        let model = CostModel::new(CostWeights::Exposure(ExposureWeights::new(2.0, 2.0, 0.0)));
        let attrs = EdgeAttrs::new(100.0, 10.0, 20.0, 99.0);
        assert!((model.edge_cost(&attrs) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn length_cost_clamps_negative_length() {
        let model = CostModel::length();
        assert_eq!(model.edge_cost(&EdgeAttrs::with_length(-3.0)), 0.0);
        assert_eq!(model.edge_cost(&EdgeAttrs::with_length(42.0)), 42.0);
    }

    #[test]
    fn tie_break_uses_the_other_quantity() {
        let attrs = EdgeAttrs::new(100.0, 1.0, 2.0, 3.0);
        assert_eq!(CostModel::length().tie_break_cost(&attrs), 6.0);
        let exposure = CostModel::from(ExposureWeights::from_sliders(1.0, 0.0, 0.0));
        assert_eq!(exposure.tie_break_cost(&attrs), 100.0);
    }

    #[test]
    fn weighted_sum_is_monotone_in_each_weight() {
        let attrs = EdgeAttrs::new(80.0, 12.0, 30.0, 2_400.0);
        let base = ExposureWeights::new(0.2, 0.3, 0.5);
        for step in [0.0, 0.1, 0.5, 2.0] {
            let more = [
                ExposureWeights { pm25: base.pm25 + step, ..base },
                ExposureWeights { no2: base.no2 + step, ..base },
                ExposureWeights { wbgt: base.wbgt + step, ..base },
            ];
            for w in more {
                assert!(w.weighted_sum(&attrs) >= base.weighted_sum(&attrs));
            }
        }
    }

    #[test]
    fn default_model_is_length() {
        assert!(CostModel::default().weights().is_length());
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use std::time::Duration;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use er_core::{GeoPoint, NodeId};
    use er_spatial::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder, SpatialError};

    use crate::{
        CostModel, Deadline, DijkstraRouter, ExposureTotals, ExposureWeights, PathResult, Router,
        RoutingError,
    };

    fn pm25_only() -> CostModel {
        CostModel::from(ExposureWeights::from_sliders(1.0, 0.0, 0.0))
    }

    fn assert_well_formed(net: &RoadNetwork, path: &PathResult, from: NodeId, to: NodeId) {
        assert_eq!(path.origin(), from);
        assert_eq!(path.destination(), to);
        assert_eq!(path.edges.len() + 1, path.nodes.len());
        for (i, &e) in path.edges.iter().enumerate() {
            assert_eq!(net.edge_from[e.index()], path.nodes[i]);
            assert_eq!(net.edge_to[e.index()], path.nodes[i + 1]);
        }
        assert_eq!(path.totals, ExposureTotals::along(net, &path.edges));
    }

    #[test]
    fn equal_length_tie_prefers_cleaner_branch() {
        let (net, [a, b, _, d]) = super::helpers::diamond();
        let path = DijkstraRouter::new().route(&net, a, d, &CostModel::length()).unwrap();
        assert_eq!(path.nodes, vec![a, b, d]);
        assert_eq!(path.cost, 150.0);
        assert_eq!(path.totals.length_m, 150.0);
        assert_eq!(path.totals.pm25, 2.0);
        assert_well_formed(&net, &path, a, d);
    }

    #[test]
    fn exposure_route_minimizes_pm25() {
        let (net, [a, b, _, d]) = super::helpers::diamond();
        let path = DijkstraRouter::new().route(&net, a, d, &pm25_only()).unwrap();
        assert_eq!(path.nodes, vec![a, b, d]);
        assert_eq!(path.totals.pm25, 2.0);
        assert_eq!(path.totals.length_m, 150.0);
    }

    #[test]
    fn length_and_exposure_routes_can_differ() {
        let (net, [a, b, c, d]) = super::helpers::detour();
        let router = DijkstraRouter::new();

        let short = router.route(&net, a, d, &CostModel::length()).unwrap();
        assert_eq!(short.nodes, vec![a, b, d]);
        assert_eq!(short.totals.length_m, 200.0);

        let clean = router.route(&net, a, d, &pm25_only()).unwrap();
        assert_eq!(clean.nodes, vec![a, c, d]);
        assert_eq!(clean.totals.pm25, 2.0);
        assert_eq!(clean.totals.length_m, 300.0);
    }

    #[test]
    fn same_node_is_trivial() {
        let (net, [a, ..]) = super::helpers::diamond();
        let path = DijkstraRouter::new().route(&net, a, a, &CostModel::length()).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.nodes, vec![a]);
        assert_eq!(path.cost, 0.0);
        assert_eq!(path.totals, ExposureTotals::default());
    }

    #[test]
    fn unreachable_is_no_path() {
        let (net, [a, _, _, d]) = super::helpers::diamond();
        // Edges are one-way A→…→D.
        match DijkstraRouter::new().route(&net, d, a, &CostModel::length()) {
            Err(RoutingError::NoPath { from, to }) => {
                assert_eq!(from, d);
                assert_eq!(to, a);
            }
            other => panic!("expected NoPath, got {other:?}"),
        }
    }

    #[test]
    fn disconnected_components() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.0, 121.50));
        let c = b.add_geo_node(GeoPoint::new(25.0, 121.51));
        let x = b.add_geo_node(GeoPoint::new(25.1, 121.50));
        let y = b.add_geo_node(GeoPoint::new(25.1, 121.51));
        b.add_road(a, c, EdgeAttrs::with_length(100.0));
        b.add_road(x, y, EdgeAttrs::with_length(100.0));
        let net = b.build();

        let err = DijkstraRouter::new().route(&net, a, y, &pm25_only()).unwrap_err();
        assert!(matches!(err, RoutingError::NoPath { .. }));
    }

    #[test]
    fn unknown_node_is_rejected() {
        let (net, [a, ..]) = super::helpers::diamond();
        let err = DijkstraRouter::new()
            .route(&net, a, NodeId(99), &CostModel::length())
            .unwrap_err();
        assert!(matches!(err, RoutingError::Spatial(SpatialError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn parallel_edges_use_the_chosen_one() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.0, 121.50));
        let c = b.add_geo_node(GeoPoint::new(25.0, 121.51));
        b.add_directed_edge(a, c, EdgeAttrs::new(100.0, 5.0, 0.0, 0.0));
        b.add_directed_edge(a, c, EdgeAttrs::new(120.0, 1.0, 0.0, 0.0));
        let net = b.build();
        let router = DijkstraRouter::new();

        let short = router.route(&net, a, c, &CostModel::length()).unwrap();
        assert_eq!(short.totals.length_m, 100.0);
        assert_eq!(short.totals.pm25, 5.0);

        let clean = router.route(&net, a, c, &pm25_only()).unwrap();
        assert_eq!(clean.totals.length_m, 120.0);
        assert_eq!(clean.totals.pm25, 1.0);

        // Rebuilding from the node sequence picks the same edges.
        let rebuilt = PathResult::from_nodes(&net, &clean.nodes, &pm25_only()).unwrap();
        assert_eq!(rebuilt.edges, clean.edges);
    }

    #[test]
    fn from_nodes_rejects_gaps() {
        let (net, [a, _, _, d]) = super::helpers::diamond();
        assert!(PathResult::from_nodes(&net, &[a, d], &CostModel::length()).is_none());
        assert!(PathResult::from_nodes(&net, &[], &CostModel::length()).is_none());
        let single = PathResult::from_nodes(&net, &[a], &CostModel::length()).unwrap();
        assert!(single.is_trivial());
    }

    #[test]
    fn geometry_falls_back_to_straight_segments() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.000, 121.500));
        let c = b.add_geo_node(GeoPoint::new(25.000, 121.510));
        let e = b.add_geo_node(GeoPoint::new(25.010, 121.510));
        let bend = GeoPoint::new(25.002, 121.505);
        let shape = vec![b.node_pos(a), bend, b.node_pos(c)];
        b.add_road_with_geometry(a, c, EdgeAttrs::with_length(1_000.0), shape);
        b.add_road(c, e, EdgeAttrs::with_length(1_100.0));
        let net = b.build();

        let path = DijkstraRouter::new().route(&net, a, e, &CostModel::length()).unwrap();
        let line = path.geometry(&net);
        assert_eq!(
            line,
            vec![net.node_pos(a), bend, net.node_pos(c), net.node_pos(e)]
        );
    }

    #[test]
    fn zero_budget_times_out() {
        let net = super::helpers::lattice(60);
        let from = NodeId(0);
        let to = NodeId((net.node_count() - 1) as u32);
        let err = DijkstraRouter::with_deadline(Duration::ZERO)
            .route(&net, from, to, &CostModel::length())
            .unwrap_err();
        assert!(matches!(err, RoutingError::Timeout { .. }));

        // Without a budget the same query succeeds.
        let path = DijkstraRouter::new().route(&net, from, to, &CostModel::length()).unwrap();
        assert!((path.totals.length_m - 11_800.0).abs() < 1e-6);
    }

    #[test]
    fn expired_request_deadline_stops_even_small_searches() {
        let (net, [a, _, _, d]) = super::helpers::diamond();
        let spent = Deadline::after(Duration::ZERO);
        let err = DijkstraRouter::new()
            .route_until(&net, a, d, &CostModel::length(), Some(spent))
            .unwrap_err();
        assert!(matches!(err, RoutingError::Timeout { budget } if budget == Duration::ZERO));

        let roomy = Deadline::after(Duration::from_secs(60));
        assert!(DijkstraRouter::new()
            .route_until(&net, a, d, &CostModel::length(), Some(roomy))
            .is_ok());
    }

    #[test]
    fn earliest_deadline_wins() {
        let soon = Deadline::after(Duration::from_millis(1));
        let late = Deadline::after(Duration::from_secs(60));
        assert_eq!(Deadline::earliest(Some(late), Some(soon)), Some(soon));
        assert_eq!(Deadline::earliest(Some(soon), Some(late)), Some(soon));
        assert_eq!(Deadline::earliest(None, Some(late)), Some(late));
        assert_eq!(Deadline::earliest(None, None), None);

        // A router budget still applies when the request deadline is later.
        let net = super::helpers::lattice(60);
        let to = NodeId((net.node_count() - 1) as u32);
        let err = DijkstraRouter::with_deadline(Duration::ZERO)
            .route_until(&net, NodeId(0), to, &CostModel::length(), Some(late))
            .unwrap_err();
        assert!(matches!(err, RoutingError::Timeout { .. }));
    }

    #[test]
    fn nan_attributes_never_reach_totals() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_geo_node(GeoPoint::new(25.0, 121.50));
        let c = b.add_geo_node(GeoPoint::new(25.0, 121.51));
        b.add_directed_edge(a, c, EdgeAttrs::new(f64::NAN, f64::NAN, 0.0, 0.0));
        b.add_directed_edge(a, c, EdgeAttrs::new(100.0, 1.0, 0.0, 0.0));
        let net = b.build();

        for model in [CostModel::length(), pm25_only()] {
            let path = DijkstraRouter::new().route(&net, a, c, &model).unwrap();
            assert!(path.cost.is_finite());
            assert!(path.totals.length_m.is_finite());
            assert!(path.totals.pm25.is_finite());
            assert_eq!(path.totals.length_m, net.edge_attrs(path.edges[0]).length_m);
        }
    }

    // ── Optimality against exhaustive enumeration ──────────────────────────

    fn random_network(rng: &mut SmallRng, n: usize, edges: usize) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<NodeId> = (0..n)
            .map(|i| b.add_geo_node(GeoPoint::new(25.0 + i as f64 * 0.001, 121.5)))
            .collect();
        for _ in 0..edges {
            let u = nodes[rng.gen_range(0..n)];
            let v = nodes[rng.gen_range(0..n)];
            if u == v {
                continue;
            }
            b.add_directed_edge(
                u,
                v,
                EdgeAttrs::new(
                    rng.gen_range(10.0..500.0),
                    rng.gen_range(0.0..50.0),
                    rng.gen_range(0.0..80.0),
                    rng.gen_range(0.0..15_000.0),
                ),
            );
        }
        b.build()
    }

    /// Cheapest simple-path cost by depth-first enumeration.
    fn brute_force(net: &RoadNetwork, from: NodeId, to: NodeId, cost: &CostModel) -> Option<f64> {
        fn dfs(
            net: &RoadNetwork,
            at: NodeId,
            to: NodeId,
            cost: &CostModel,
            seen: &mut Vec<bool>,
            acc: f64,
            best: &mut Option<f64>,
        ) {
            if at == to {
                *best = Some(best.map_or(acc, |b| b.min(acc)));
                return;
            }
            seen[at.index()] = true;
            for e in net.out_edges(at) {
                let next = net.edge_to[e.index()];
                if !seen[next.index()] {
                    dfs(net, next, to, cost, seen, acc + cost.edge_cost(net.edge_attrs(e)), best);
                }
            }
            seen[at.index()] = false;
        }

        let mut best = None;
        let mut seen = vec![false; net.node_count()];
        dfs(net, from, to, cost, &mut seen, 0.0, &mut best);
        best
    }

    #[test]
    fn matches_exhaustive_search() {
        let mut rng = SmallRng::seed_from_u64(7);
        let router = DijkstraRouter::new();
        let models = [
            CostModel::length(),
            pm25_only(),
            CostModel::from(ExposureWeights::from_sliders(30.0, 50.0, 20.0)),
        ];

        for _ in 0..40 {
            let net = random_network(&mut rng, 7, 18);
            let from = NodeId(rng.gen_range(0..7));
            let to = NodeId(rng.gen_range(0..7));
            for model in &models {
                let expected = brute_force(&net, from, to, model);
                match router.route(&net, from, to, model) {
                    Ok(path) => {
                        let best = expected.expect("router found a path brute force missed");
                        assert!((path.cost - best).abs() < 1e-6, "{} vs {}", path.cost, best);
                        assert_well_formed(&net, &path, from, to);
                        let recomputed: f64 =
                            path.edges.iter().map(|&e| model.edge_cost(net.edge_attrs(e))).sum();
                        assert!((recomputed - path.cost).abs() < 1e-6);
                    }
                    Err(RoutingError::NoPath { .. }) => assert!(expected.is_none()),
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }

    #[test]
    fn more_pm25_weight_never_raises_pm25() {
        let mut rng = SmallRng::seed_from_u64(42);
        let router = DijkstraRouter::new();

        for _ in 0..40 {
            let net = random_network(&mut rng, 9, 30);
            let from = NodeId(0);
            let to = NodeId(8);
            let light = CostModel::from(ExposureWeights::from_sliders(10.0, 50.0, 40.0));
            let heavy = CostModel::from(ExposureWeights::from_sliders(80.0, 50.0, 40.0));
            let (Ok(p_light), Ok(p_heavy)) =
                (router.route(&net, from, to, &light), router.route(&net, from, to, &heavy))
            else {
                continue;
            };
            assert!(p_heavy.totals.pm25 <= p_light.totals.pm25 + 1e-9);
        }
    }
}

// ── Comparator ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod compare {
    use er_core::{GeoPoint, NodeId, RoutingConfig, TransportMode};

    use std::time::Duration;

    use er_spatial::RoadNetwork;

    use crate::{
        ComparisonRequest, CostModel, CostWeights, Deadline, DijkstraRouter, Endpoint,
        ExposureTotals, ExposureWeights, Improvement, PathResult, PointRequest, RouteComparator,
        RouteStats, RouteSummary, Router, RoutingError, RoutingResult,
    };

    /// Dijkstra preceded by a fixed pause, so every search costs at least
    /// `pause` of wall-clock time.
    struct PausingRouter {
        pause: Duration,
    }

    impl Router for PausingRouter {
        fn route_until(
            &self,
            network: &RoadNetwork,
            from: NodeId,
            to: NodeId,
            cost: &CostModel,
            deadline: Option<Deadline>,
        ) -> RoutingResult<PathResult> {
            std::thread::sleep(self.pause);
            DijkstraRouter::new().route_until(network, from, to, cost, deadline)
        }
    }

    fn summary(totals: ExposureTotals, mode: TransportMode) -> RouteSummary {
        RouteSummary {
            path: PathResult { nodes: vec![NodeId(0)], edges: vec![], cost: 0.0, totals },
            stats: RouteStats::from_totals(&totals, mode),
        }
    }

    #[test]
    fn stats_are_rates_per_metre() {
        let totals = ExposureTotals { length_m: 1_500.0, pm25: 30.0, no2: 45.0, wbgt: 45_000.0 };
        let stats = RouteStats::from_totals(&totals, TransportMode::MotorScooter);
        assert_eq!(stats.distance_m, 1_500.0);
        assert!((stats.travel_time_min - 2.0).abs() < 1e-9);
        assert!((stats.pm25_rate - 0.02).abs() < 1e-12);
        assert!((stats.no2_rate - 0.03).abs() < 1e-12);
        assert!((stats.wbgt_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_has_zero_rates() {
        let stats = RouteStats::from_totals(&ExposureTotals::default(), TransportMode::Walk);
        assert_eq!(stats, RouteStats::default());
    }

    #[test]
    fn improvement_formulas() {
        let base = summary(
            ExposureTotals { length_m: 200.0, pm25: 20.0, no2: 10.0, wbgt: 6_000.0 },
            TransportMode::Bicycle,
        );
        let alt = summary(
            ExposureTotals { length_m: 300.0, pm25: 2.0, no2: 12.0, wbgt: 8_400.0 },
            TransportMode::Bicycle,
        );
        let imp = Improvement::between(&base, &alt);
        assert!((imp.time_pct - 50.0).abs() < 1e-9);
        assert!((imp.pm25_pct + 90.0).abs() < 1e-9);
        assert!((imp.no2_pct - 20.0).abs() < 1e-9);
        assert!((imp.wbgt_delta + 2.0).abs() < 1e-9);
    }

    #[test]
    fn improvement_with_zero_baseline_is_zero() {
        let zero = summary(ExposureTotals::default(), TransportMode::Walk);
        let alt = summary(
            ExposureTotals { length_m: 10.0, pm25: 1.0, no2: 1.0, wbgt: 300.0 },
            TransportMode::Walk,
        );
        let imp = Improvement::between(&zero, &alt);
        assert_eq!(imp.time_pct, 0.0);
        assert_eq!(imp.pm25_pct, 0.0);
        assert_eq!(imp.no2_pct, 0.0);
        assert_eq!(imp.wbgt_delta, 0.0);
    }

    #[test]
    fn heat_delta_needs_heat_on_shortest_route() {
        let cool = summary(
            ExposureTotals { length_m: 100.0, pm25: 1.0, no2: 1.0, wbgt: 0.0 },
            TransportMode::Walk,
        );
        let warm = summary(
            ExposureTotals { length_m: 100.0, pm25: 1.0, no2: 1.0, wbgt: 2_900.0 },
            TransportMode::Walk,
        );
        assert_eq!(Improvement::between(&cool, &warm).wbgt_delta, 0.0);
        assert!((Improvement::between(&warm, &cool).wbgt_delta + 29.0).abs() < 1e-9);
    }

    #[test]
    fn compare_detour() {
        let (net, [a, b, c, d]) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let result = cmp
            .compare(&ComparisonRequest {
                origin: a,
                destination: d,
                weights: ExposureWeights::from_sliders(100.0, 0.0, 0.0),
                mode: TransportMode::Walk,
            })
            .unwrap();

        assert_eq!(result.shortest.path.nodes, vec![a, b, d]);
        assert_eq!(result.low_exposure.path.nodes, vec![a, c, d]);
        assert!((result.improvement.time_pct - 50.0).abs() < 1e-9);
        assert!((result.improvement.pm25_pct + 90.0).abs() < 1e-9);
        assert_eq!(result.improvement.no2_pct, 0.0);
        // 30 → 28 per metre.
        assert!((result.improvement.wbgt_delta + 2.0).abs() < 1e-9);
        assert_eq!(result.mode, TransportMode::Walk);
        assert!(!result.weights.is_length());
    }

    #[test]
    fn zero_weights_compare_length_with_itself() {
        let (net, [a, _, _, d]) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let result = cmp
            .compare(&ComparisonRequest {
                origin: a,
                destination: d,
                weights: ExposureWeights::from_sliders(0.0, 0.0, 0.0),
                mode: TransportMode::MotorScooter,
            })
            .unwrap();
        assert_eq!(result.weights, CostWeights::Length);
        assert_eq!(result.shortest, result.low_exposure);
        assert_eq!(result.improvement, Improvement::default());
    }

    #[test]
    fn same_origin_and_destination() {
        let (net, [a, ..]) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let result = cmp
            .compare(&ComparisonRequest {
                origin: a,
                destination: a,
                weights: ExposureWeights::from_sliders(1.0, 1.0, 1.0),
                mode: TransportMode::Bicycle,
            })
            .unwrap();
        assert_eq!(result.shortest.stats, RouteStats::default());
        assert_eq!(result.improvement, Improvement::default());
    }

    #[test]
    fn failed_search_fails_the_comparison() {
        let (net, [a, _, _, d]) = super::helpers::diamond();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let err = cmp
            .compare(&ComparisonRequest {
                origin: d,
                destination: a,
                weights: CostWeights::Length,
                mode: TransportMode::Walk,
            })
            .unwrap_err();
        assert!(matches!(err, RoutingError::NoPath { .. }));
    }

    #[test]
    fn compare_points_snaps_to_nodes() {
        let (net, [a, _, _, d]) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let result = cmp
            .compare_points(&PointRequest {
                origin: GeoPoint::new(25.0401, 121.5101),
                destination: GeoPoint::new(25.0399, 121.5119),
                weights: ExposureWeights::from_sliders(1.0, 0.0, 0.0),
                mode: TransportMode::Walk,
            })
            .unwrap();
        assert_eq!(result.shortest.path.origin(), a);
        assert_eq!(result.shortest.path.destination(), d);
    }

    #[test]
    fn compare_points_reports_which_endpoint_failed() {
        let (net, _) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let near = GeoPoint::new(25.040, 121.510);
        let far = GeoPoint::new(24.0, 120.0);

        let req = |origin, destination| PointRequest {
            origin,
            destination,
            weights: CostWeights::Length,
            mode: TransportMode::Walk,
        };

        match cmp.compare_points(&req(far, near)) {
            Err(RoutingError::ResolutionFailure { which, pos, distance }) => {
                assert_eq!(which, Endpoint::Origin);
                assert_eq!(pos, far);
                assert!(distance > 0.01);
            }
            other => panic!("expected origin failure, got {other:?}"),
        }
        match cmp.compare_points(&req(near, far)) {
            Err(RoutingError::ResolutionFailure { which, .. }) => {
                assert_eq!(which, Endpoint::Destination)
            }
            other => panic!("expected destination failure, got {other:?}"),
        }
    }

    #[test]
    fn config_tolerance_is_honoured() {
        let (net, _) = super::helpers::detour();
        let config = RoutingConfig { max_snap_distance_deg: 2.0, ..RoutingConfig::default() };
        let cmp = RouteComparator::new(&net, config);
        assert_eq!(cmp.resolver().max_distance(), 2.0);
        assert!(cmp.resolver().resolve(GeoPoint::new(24.0, 120.5)).is_some());
    }

    #[test]
    fn config_deadline_applies_to_searches() {
        let net = super::helpers::lattice(60);
        let config = RoutingConfig { deadline_ms: Some(0), ..RoutingConfig::default() };
        let cmp = RouteComparator::new(&net, config);
        let err = cmp
            .compare(&ComparisonRequest {
                origin: NodeId(0),
                destination: NodeId((net.node_count() - 1) as u32),
                weights: CostWeights::Length,
                mode: TransportMode::Walk,
            })
            .unwrap_err();
        assert!(matches!(err, RoutingError::Timeout { .. }));
    }

    #[test]
    fn deadline_covers_both_searches() {
        let (net, [a, _, _, d]) = super::helpers::detour();
        let req = ComparisonRequest {
            origin: a,
            destination: d,
            weights: ExposureWeights::from_sliders(1.0, 0.0, 0.0),
            mode: TransportMode::Walk,
        };
        let router = || PausingRouter { pause: Duration::from_millis(150) };

        // One search fits the budget on its own.
        let single = Deadline::after(Duration::from_millis(250));
        assert!(router()
            .route_until(&net, a, d, &CostModel::length(), Some(single))
            .is_ok());

        // Run back to back, the pair does not.
        let config = RoutingConfig {
            deadline_ms: Some(250),
            parallel: false,
            ..RoutingConfig::default()
        };
        let err = RouteComparator::with_router(&net, router(), config).compare(&req).unwrap_err();
        assert!(matches!(err, RoutingError::Timeout { budget } if budget == Duration::from_millis(250)));

        // Without a deadline the same comparison succeeds.
        let relaxed = RoutingConfig { parallel: false, ..RoutingConfig::default() };
        assert!(RouteComparator::with_router(&net, router(), relaxed).compare(&req).is_ok());
    }

    #[test]
    fn comparator_is_shareable_across_threads() {
        let (net, [a, _, _, d]) = super::helpers::detour();
        let cmp = RouteComparator::new(&net, RoutingConfig::default());
        let req = ComparisonRequest {
            origin: a,
            destination: d,
            weights: ExposureWeights::from_sliders(1.0, 0.0, 0.0),
            mode: TransportMode::Walk,
        };
        let expected = cmp.compare(&req).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| cmp.compare(&req).unwrap())).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
