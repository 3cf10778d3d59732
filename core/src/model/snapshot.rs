use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::CommunicationContext;
use super::modcod::RawModcodEntry;
use super::request::{EarthStationAsset, Overrides, SatelliteAsset};
use super::response::RuntimeEcho;
use super::strategy::{StrategySnapshot, WaveformFamily};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModcodTableSnapshot {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub waveform: WaveformFamily,
    pub entries: Vec<RawModcodEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSnapshot {
    pub modcod_table: Option<ModcodTableSnapshot>,
    pub uplink_modcod_table: Option<ModcodTableSnapshot>,
    pub downlink_modcod_table: Option<ModcodTableSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub satellite: Option<SatelliteAsset>,
    pub earth_station_tx: Option<EarthStationAsset>,
    pub earth_station_rx: Option<EarthStationAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub schema_version: String,
    pub computed_at: DateTime<Utc>,
    pub context: CommunicationContext,
}

/// Everything needed to replay a calculation later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSnapshot {
    #[serde(rename = "static")]
    pub static_data: StaticSnapshot,
    pub entity: EntitySnapshot,
    pub runtime: RuntimeEcho,
    pub strategy: StrategySnapshot,
    pub overrides: Overrides,
    pub metadata: SnapshotMetadata,
}
