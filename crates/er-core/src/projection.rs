//! Transverse Mercator projection between planar metres and lat/lon degrees.
//!
//! # Method
//!
//! Krüger's series to sixth order in the third flattening `n`, following
//! Karney (2011), "Transverse Mercator with an accuracy of a few nanometers".
//! Within a few thousand kilometres of the central meridian the round-trip
//! error is below a micrometre, far tighter than any road-network source.
//!
//! # Reference systems
//!
//! | Constant        | EPSG | Ellipsoid | λ0     | k0     | FE (m)  | FN (m) |
//! |-----------------|------|-----------|--------|--------|---------|--------|
//! | [`TWD97_TM2`]   | 3826 | GRS80     | 121° E | 0.9999 | 250 000 | 0      |
//!
//! A [`TransverseMercator`] holds only precomputed series coefficients.  It
//! is `Copy` and has no interior state, so one handle can be shared by any
//! number of threads.

use crate::{GeoPoint, ProjectedPoint};

// ── Parameters ────────────────────────────────────────────────────────────────

/// Reference ellipsoid: semi-major axis and inverse flattening.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub inv_f: f64,
}

pub const GRS80: Ellipsoid = Ellipsoid { a: 6_378_137.0, inv_f: 298.257_222_101 };

/// Defining parameters of a Transverse Mercator grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TmParams {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in degrees.
    pub lon0_deg: f64,
    /// Scale factor on the central meridian.
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

/// TWD97 / TM2 zone 121 (EPSG:3826), the grid of the Taipei network data.
pub const TWD97_TM2: TmParams = TmParams {
    ellipsoid: GRS80,
    lon0_deg: 121.0,
    k0: 0.9999,
    false_easting: 250_000.0,
    false_northing: 0.0,
};

const SERIES_ORDER: usize = 6;
const MAX_NEWTON_ITER: usize = 10;

// ── TransverseMercator ────────────────────────────────────────────────────────

/// Immutable projection handle with precomputed Krüger coefficients.
#[derive(Copy, Clone, Debug)]
pub struct TransverseMercator {
    params: TmParams,
    /// Eccentricity.
    e: f64,
    /// `k0 * A`, A being the rectifying radius.
    k0_a: f64,
    alpha: [f64; SERIES_ORDER],
    beta: [f64; SERIES_ORDER],
}

impl TransverseMercator {
    pub fn new(params: TmParams) -> Self {
        let f = 1.0 / params.ellipsoid.inv_f;
        let n = f / (2.0 - f);
        let e = (f * (2.0 - f)).sqrt();

        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying = params.ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        Self { params, e, k0_a: params.k0 * rectifying, alpha, beta }
    }

    /// The TWD97 / TM2 grid.
    pub fn twd97_tm2() -> Self {
        Self::new(TWD97_TM2)
    }

    /// Geographic → projected.
    pub fn forward(&self, pos: GeoPoint) -> ProjectedPoint {
        let tau = pos.lat.to_radians().tan();
        let lam = (pos.lon - self.params.lon0_deg).to_radians();
        let (slam, clam) = lam.sin_cos();

        let taup = taup_of(tau, self.e);
        let xip = taup.atan2(clam);
        let etap = (slam / taup.hypot(clam)).asinh();

        let mut xi = xip;
        let mut eta = etap;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xip).sin() * (k * etap).cosh();
            eta += a * (k * xip).cos() * (k * etap).sinh();
        }

        ProjectedPoint::new(
            self.params.false_easting + self.k0_a * eta,
            self.params.false_northing + self.k0_a * xi,
        )
    }

    /// Projected → geographic.
    pub fn inverse(&self, p: ProjectedPoint) -> GeoPoint {
        let xi = (p.y - self.params.false_northing) / self.k0_a;
        let eta = (p.x - self.params.false_easting) / self.k0_a;

        let mut xip = xi;
        let mut etap = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xip -= b * (k * xi).sin() * (k * eta).cosh();
            etap -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let (sxip, cxip) = xip.sin_cos();
        let shetap = etap.sinh();
        let taup = sxip / shetap.hypot(cxip);
        let lam = shetap.atan2(cxip);
        let tau = tau_of(taup, self.e);

        GeoPoint::new(tau.atan().to_degrees(), self.params.lon0_deg + lam.to_degrees())
    }
}

impl Default for TransverseMercator {
    fn default() -> Self {
        Self::twd97_tm2()
    }
}

// ── Conformal latitude helpers ────────────────────────────────────────────────

/// tan(conformal latitude) from tan(geodetic latitude).
#[inline]
fn taup_of(tau: f64, e: f64) -> f64 {
    let tau1 = 1.0f64.hypot(tau);
    let sig = (e * (e * tau / tau1).atanh()).sinh();
    1.0f64.hypot(sig) * tau - sig * tau1
}

/// Inverse of [`taup_of`] by Newton's method; converges in 2–3 steps.
fn tau_of(taup: f64, e: f64) -> f64 {
    let e2m = 1.0 - e * e;
    let mut tau = taup / e2m;
    for _ in 0..MAX_NEWTON_ITER {
        let taupa = taup_of(tau, e);
        let dtau = (taup - taupa) / 1.0f64.hypot(taupa) * (1.0 + e2m * tau * tau)
            / (e2m * 1.0f64.hypot(tau));
        tau += dtau;
        if dtau.abs() < 1e-14 * tau.abs().max(1.0) {
            break;
        }
    }
    tau
}
