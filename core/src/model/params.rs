use serde::{Deserialize, Serialize};
use std::fmt;

use super::geo::{GroundLocation, SatellitePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Uplink,
    Downlink,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Uplink => "uplink",
            Direction::Downlink => "downlink",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pairwise carrier-to-interference ratios for one direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterferenceDescriptor {
    pub adjacent_sat_ci_db: Option<f64>,
    pub cross_polar_ci_db: Option<f64>,
    pub other_carrier_ci_db: Option<f64>,
    /// Forces the "applied" flag even when no ratio is supplied.
    pub applied: bool,
}

impl InterferenceDescriptor {
    pub fn ratios(&self) -> [Option<f64>; 3] {
        [
            self.adjacent_sat_ci_db,
            self.cross_polar_ci_db,
            self.other_carrier_ci_db,
        ]
    }
}

/// Transponder back-off and carrier loading used by the C/IM estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntermodulationDescriptor {
    pub input_backoff_db: Option<f64>,
    pub output_backoff_db: Option<f64>,
    pub composite_carriers: Option<u32>,
}

/// Fully resolved inputs for one link direction. Immutable per calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDirectionParameters {
    pub frequency_hz: f64,
    pub bandwidth_hz: f64,
    pub elevation_deg: f64,
    pub rain_rate_mm_per_hr: f64,
    pub temperature_k: f64,
    pub ground: GroundLocation,
    pub pressure_hpa: Option<f64>,
    pub water_vapor_density: Option<f64>,
    pub interference: Option<InterferenceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeParameters {
    pub satellite: SatellitePosition,
    /// Roll-off (DVB-S2X) or OFDM overhead fraction (5G NR).
    pub rolloff: Option<f64>,
    pub uplink: LinkDirectionParameters,
    pub downlink: LinkDirectionParameters,
    pub intermodulation: Option<IntermodulationDescriptor>,
}

impl RuntimeParameters {
    pub fn direction(&self, direction: Direction) -> &LinkDirectionParameters {
        match direction {
            Direction::Uplink => &self.uplink,
            Direction::Downlink => &self.downlink,
        }
    }
}
