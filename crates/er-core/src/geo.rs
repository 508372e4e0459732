//! Geographic and projected coordinate types.
//!
//! Two coordinate spaces coexist in the workspace:
//!
//! - [`ProjectedPoint`]: planar `(x, y)` metres in the network's source CRS
//!   (TWD97 / TM2 for the bundled data).  A node's projected coordinate is
//!   its identity.
//! - [`GeoPoint`]: WGS-84-compatible `(lat, lon)` degrees, derived once per
//!   node at load time via [`crate::TransverseMercator::inverse`].
//!
//! Both use `f64`.  Projected keys must survive a round trip through the
//! graph source bit-for-bit, and single precision cannot hold a 2.7 M metre
//! northing to the centimetre.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A geographic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar Euclidean distance in degree space.
    ///
    /// This is the metric used by the spatial index and the node resolver.
    /// It ignores meridian convergence; at a 0.01° tolerance the error is
    /// irrelevant for snapping.
    #[inline]
    pub fn distance_deg(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// `true` if both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Parses `"lat,lon"` (whitespace around either number is ignored).
impl FromStr for GeoPoint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoreError::Parse(format!("expected \"lat,lon\", got {s:?}"));
        let (lat, lon) = s.split_once(',').ok_or_else(bad)?;
        let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
        let lon: f64 = lon.trim().parse().map_err(|_| bad())?;
        let p = GeoPoint::new(lat, lon);
        if !p.is_finite() {
            return Err(bad());
        }
        Ok(p)
    }
}

// ── ProjectedPoint ────────────────────────────────────────────────────────────

/// A planar coordinate in metres (easting `x`, northing `y`).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Bit-exact hashable identity of this coordinate.
    ///
    /// `-0.0` is folded into `0.0` so the two spellings of zero name the
    /// same node.
    #[inline]
    pub fn key(self) -> ProjectedKey {
        ProjectedKey(canonical_bits(self.x), canonical_bits(self.y))
    }

    /// Planar distance in metres.
    #[inline]
    pub fn distance(self, other: ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for ProjectedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

#[inline]
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

/// Hashable node identity derived from a [`ProjectedPoint`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ProjectedKey(u64, u64);

impl ProjectedKey {
    /// Recover the coordinate this key was built from.
    #[inline]
    pub fn point(self) -> ProjectedPoint {
        ProjectedPoint::new(f64::from_bits(self.0), f64::from_bits(self.1))
    }
}

impl fmt::Display for ProjectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.point().fmt(f)
    }
}
