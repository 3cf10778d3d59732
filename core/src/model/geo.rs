use serde::{Deserialize, Serialize};

/// Ground terminal position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundLocation {
    pub lat_deg: f64,
    pub lon_deg: f64,
    #[serde(default)]
    pub alt_m: f64,
}

impl GroundLocation {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }
}

/// Sub-satellite point and altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatellitePosition {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_km: f64,
}

impl SatellitePosition {
    pub fn geostationary(longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg: 0.0,
            altitude_km,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrbitType {
    #[default]
    Geo,
    Meo,
    Leo,
    Haps,
}

/// Raw two-line element set as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoLineElements {
    pub name: String,
    pub line1: String,
    pub line2: String,
}
