//! Synthetic road network around Taipei Main Station.
//!
//! An 8 × 8 lattice of 250 m blocks laid out in TWD97 / TM2 metres.  Row 3
//! is a busy arterial with high PM2.5 and NO2; column 0 is a riverside road
//! that is cleaner and cooler.  Every other street has background levels.
//! Exposure attributes are accumulated along the edge (level × length).

use er_core::{NodeId, ProjectedPoint};
use er_spatial::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};

const SIDE: u32 = 8;
const BLOCK_M: f64 = 250.0;
const ORIGIN_X: f64 = 301_000.0;
const ORIGIN_Y: f64 = 2_770_000.0;

const ARTERIAL_ROW: u32 = 3;
const RIVERSIDE_COL: u32 = 0;

/// Per-metre levels: (PM2.5 µg/m³, NO2 ppb, WBGT °C).
const BACKGROUND: (f64, f64, f64) = (20.0, 25.0, 31.0);
const ARTERIAL: (f64, f64, f64) = (38.0, 45.0, 32.5);
const RIVERSIDE: (f64, f64, f64) = (9.0, 11.0, 29.5);

fn attrs(level: (f64, f64, f64)) -> EdgeAttrs {
    let (pm25, no2, wbgt) = level;
    EdgeAttrs::new(BLOCK_M, pm25 * BLOCK_M, no2 * BLOCK_M, wbgt * BLOCK_M)
}

/// Build the lattice.
///
/// Returns `(network, [south_west, north_east])`, the two corner nodes.
pub fn build_network() -> (RoadNetwork, [NodeId; 2]) {
    let mut b = RoadNetworkBuilder::with_capacity((SIDE * SIDE) as usize, (4 * SIDE * SIDE) as usize);

    let node = |b: &mut RoadNetworkBuilder, i: u32, j: u32| {
        b.add_node(ProjectedPoint::new(
            ORIGIN_X + f64::from(i) * BLOCK_M,
            ORIGIN_Y + f64::from(j) * BLOCK_M,
        ))
    };

    for i in 0..SIDE {
        for j in 0..SIDE {
            let here = node(&mut b, i, j);

            // East-west street along row j.
            if i + 1 < SIDE {
                let east = node(&mut b, i + 1, j);
                let level = if j == ARTERIAL_ROW { ARTERIAL } else { BACKGROUND };
                b.add_road(here, east, attrs(level));
            }
            // North-south street along column i.
            if j + 1 < SIDE {
                let north = node(&mut b, i, j + 1);
                let level = if i == RIVERSIDE_COL { RIVERSIDE } else { BACKGROUND };
                b.add_road(here, north, attrs(level));
            }
        }
    }

    let south_west = node(&mut b, 0, 0);
    let north_east = node(&mut b, SIDE - 1, SIDE - 1);
    (b.build(), [south_west, north_east])
}
