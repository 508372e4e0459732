//! Edge cost model.
//!
//! Two modes:
//!
//! | Weights                  | Edge cost                                        |
//! |--------------------------|--------------------------------------------------|
//! | `CostWeights::Length`    | `max(0, length_m)`                               |
//! | `CostWeights::Exposure`  | `w_pm25·pm25 + w_no2·no2 + w_wbgt·wbgt`          |
//!
//! Exposure weights are normalized to sum to 1 before use.  A weight set
//! that sums to zero selects pure-length routing instead of being rejected.
//!
//! # Ties
//!
//! Each mode also defines a secondary cost that only decides between paths
//! of exactly equal primary cost: total exposure for length routing, length
//! for exposure routing.  Among equally short routes the cleaner one wins,
//! and among equally clean routes the shorter one.

use er_spatial::EdgeAttrs;

// ── ExposureWeights ───────────────────────────────────────────────────────────

/// Relative importance of each exposure attribute.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExposureWeights {
    pub pm25: f64,
    pub no2: f64,
    pub wbgt: f64,
}

impl ExposureWeights {
    /// Raw, possibly unnormalized weights.
    pub fn new(pm25: f64, no2: f64, wbgt: f64) -> Self {
        Self { pm25, no2, wbgt }
    }

    pub fn sum(&self) -> f64 {
        self.pm25 + self.no2 + self.wbgt
    }

    /// Divide each weight by the sum of all three.
    ///
    /// Negative and NaN components count as zero.  Returns `None` when
    /// nothing positive remains.  Normalizing an already-normalized set
    /// returns it unchanged up to rounding.
    pub fn normalized(&self) -> Option<ExposureWeights> {
        let clean = |w: f64| if w > 0.0 && w.is_finite() { w } else { 0.0 };
        let (pm25, no2, wbgt) = (clean(self.pm25), clean(self.no2), clean(self.wbgt));
        let total = pm25 + no2 + wbgt;
        if total <= 0.0 {
            return None;
        }
        Some(ExposureWeights { pm25: pm25 / total, no2: no2 / total, wbgt: wbgt / total })
    }

    /// `pm25·pm25_expo + no2·no2_expo + wbgt·wbgt_expo`, without
    /// normalizing.
    #[inline]
    pub fn weighted_sum(&self, attrs: &EdgeAttrs) -> f64 {
        self.pm25 * attrs.pm25_expo + self.no2 * attrs.no2_expo + self.wbgt * attrs.wbgt_expo
    }

    /// Turn three UI sliders (conventionally 0–100) into cost weights.
    pub fn from_sliders(pm25: f64, no2: f64, wbgt: f64) -> CostWeights {
        CostWeights::from(ExposureWeights::new(pm25, no2, wbgt))
    }
}

// ── CostWeights ───────────────────────────────────────────────────────────────

/// Which quantity a search minimizes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CostWeights {
    /// Physical distance.
    Length,
    /// Normalized linear combination of exposures.
    Exposure(ExposureWeights),
}

impl CostWeights {
    #[inline]
    pub fn is_length(&self) -> bool {
        matches!(self, CostWeights::Length)
    }
}

impl From<ExposureWeights> for CostWeights {
    fn from(w: ExposureWeights) -> Self {
        match w.normalized() {
            Some(n) => CostWeights::Exposure(n),
            None => CostWeights::Length,
        }
    }
}

// ── CostModel ─────────────────────────────────────────────────────────────────

/// Maps an edge's attributes to a non-negative traversal cost.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CostModel {
    weights: CostWeights,
}

impl CostModel {
    /// Exposure weights are (re)normalized here, so a hand-built
    /// `CostWeights::Exposure` with arbitrary magnitudes is still valid.
    pub fn new(weights: CostWeights) -> Self {
        let weights = match weights {
            CostWeights::Length => CostWeights::Length,
            CostWeights::Exposure(w) => CostWeights::from(w),
        };
        Self { weights }
    }

    /// Pure-length routing.
    pub fn length() -> Self {
        Self { weights: CostWeights::Length }
    }

    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    /// Traversal cost of one edge.  Never negative, never NaN.
    #[inline]
    pub fn edge_cost(&self, attrs: &EdgeAttrs) -> f64 {
        match self.weights {
            CostWeights::Length => attrs.length_m.max(0.0),
            CostWeights::Exposure(w) => {
                // Loaded networks guarantee non-negative exposures; the clamp
                // only matters for builder-made graphs.
                w.weighted_sum(attrs).max(0.0)
            }
        }
    }

    /// Secondary cost used only to break exact ties in the primary cost.
    #[inline]
    pub fn tie_break_cost(&self, attrs: &EdgeAttrs) -> f64 {
        match self.weights {
            CostWeights::Length => (attrs.pm25_expo + attrs.no2_expo + attrs.wbgt_expo).max(0.0),
            CostWeights::Exposure(_) => attrs.length_m.max(0.0),
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::length()
    }
}

impl From<CostWeights> for CostModel {
    fn from(weights: CostWeights) -> Self {
        Self::new(weights)
    }
}
