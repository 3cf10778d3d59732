use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::{OrbitType, TwoLineElements};
use super::modcod::ModcodTableInput;
use super::params::{InterferenceDescriptor, IntermodulationDescriptor};
use super::strategy::{TransponderType, WaveformFamily};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteAsset {
    pub id: Option<String>,
    pub name: Option<String>,
    pub orbit_type: OrbitType,
    pub longitude_deg: Option<f64>,
    pub altitude_km: Option<f64>,
    pub inclination_deg: Option<f64>,
    pub tle_line1: Option<String>,
    pub tle_line2: Option<String>,
    pub eirp_dbw: Option<f64>,
    pub gt_db_per_k: Option<f64>,
    pub frequency_band: Option<String>,
}

impl SatelliteAsset {
    pub fn two_line_elements(&self) -> Option<TwoLineElements> {
        match (&self.tle_line1, &self.tle_line2) {
            (Some(line1), Some(line2)) => Some(TwoLineElements {
                name: self.name.clone().unwrap_or_else(|| "SAT".to_string()),
                line1: line1.clone(),
                line2: line2.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthStationAsset {
    pub id: Option<String>,
    pub name: Option<String>,
    pub antenna_diameter_m: Option<f64>,
    pub antenna_gain_tx_db: Option<f64>,
    pub antenna_gain_rx_db: Option<f64>,
    pub noise_temperature_k: Option<f64>,
    pub eirp_dbw: Option<f64>,
    pub tx_power_dbw: Option<f64>,
    pub gt_db_per_k: Option<f64>,
    pub polarization: Option<String>,
}

/// Explicit EIRP / G/T values that win over anything stored on an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalOverride {
    pub eirp_dbw: Option<f64>,
    pub gt_db_per_k: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub satellite: Option<TerminalOverride>,
    pub earth_station_tx: Option<TerminalOverride>,
    pub earth_station_rx: Option<TerminalOverride>,
}

/// Per-direction runtime block as submitted; resolved into
/// `LinkDirectionParameters` by the combiner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionInput {
    pub frequency_hz: Option<f64>,
    pub bandwidth_hz: Option<f64>,
    pub elevation_deg: Option<f64>,
    pub rain_rate_mm_per_hr: Option<f64>,
    pub temperature_k: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub water_vapor_density: Option<f64>,
    pub ground_lat_deg: Option<f64>,
    pub ground_lon_deg: Option<f64>,
    pub ground_alt_m: Option<f64>,
    pub interference: Option<InterferenceDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeInput {
    pub sat_longitude_deg: Option<f64>,
    pub sat_latitude_deg: Option<f64>,
    pub sat_altitude_km: Option<f64>,
    pub computation_datetime: Option<DateTime<Utc>>,
    /// Shared bandwidth; transparent transponders only.
    pub bandwidth_hz: Option<f64>,
    pub rolloff: Option<f64>,
    pub uplink: DirectionInput,
    pub downlink: DirectionInput,
    pub intermodulation: Option<IntermodulationDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationRequest {
    pub waveform_strategy: WaveformFamily,
    pub transponder_type: TransponderType,
    pub satellite: Option<SatelliteAsset>,
    pub earth_station_tx: Option<EarthStationAsset>,
    pub earth_station_rx: Option<EarthStationAsset>,
    /// Shared table; required for transparent transponders.
    pub modcod_table: Option<ModcodTableInput>,
    pub uplink_modcod_table: Option<ModcodTableInput>,
    pub downlink_modcod_table: Option<ModcodTableInput>,
    pub runtime: RuntimeInput,
    pub overrides: Overrides,
    pub include_snapshot: bool,
}
