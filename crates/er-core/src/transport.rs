//! Transport mode selection.
//!
//! The mode only drives travel-time estimation.  Routing cost never depends
//! on it: all three modes share the same road graph.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// How the traveller moves along the chosen route.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TransportMode {
    /// Motor scooter, the dominant urban mode in Taipei.
    #[default]
    MotorScooter,
    /// Bicycle.
    Bicycle,
    /// On foot.
    Walk,
}

impl TransportMode {
    pub const ALL: [TransportMode; 3] =
        [TransportMode::MotorScooter, TransportMode::Bicycle, TransportMode::Walk];

    /// Assumed average speed in km/h.
    ///
    /// | Mode          | Speed   |
    /// |---------------|---------|
    /// | Motor scooter | 45 km/h |
    /// | Bicycle       | 18 km/h |
    /// | Walk          |  5 km/h |
    #[inline]
    pub fn speed_kmh(self) -> f64 {
        match self {
            TransportMode::MotorScooter => 45.0,
            TransportMode::Bicycle      => 18.0,
            TransportMode::Walk         => 5.0,
        }
    }

    /// Minutes needed to cover `distance_m` at this mode's speed.
    #[inline]
    pub fn travel_time_min(self, distance_m: f64) -> f64 {
        distance_m / 1_000.0 / self.speed_kmh() * 60.0
    }

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::MotorScooter => "motor-scooter",
            TransportMode::Bicycle      => "bicycle",
            TransportMode::Walk         => "walk",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scooter" | "motor-scooter" | "motorscooter" => Ok(TransportMode::MotorScooter),
            "bicycle" | "bike"                         => Ok(TransportMode::Bicycle),
            "walk" | "walking"                         => Ok(TransportMode::Walk),
            other => Err(CoreError::Parse(format!(
                "unknown transport mode {other:?}: expected \"motor-scooter\", \"bicycle\", or \"walk\""
            ))),
        }
    }
}
