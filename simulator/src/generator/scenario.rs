use linkcore::model::{
    CalculationRequest, DirectionInput, EarthStationAsset, LooseValue, ModcodTableInput,
    RawModcodEntry, RuntimeInput, SatelliteAsset, TransponderType, WaveformFamily,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Knobs for the built-in Ku-band GEO scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub satellite_longitude_deg: f64,
    pub ground_lat_deg: f64,
    pub ground_lon_deg: f64,
    pub uplink_frequency_hz: f64,
    pub downlink_frequency_hz: f64,
    pub bandwidth_hz: f64,
    pub rain_rate_mm_per_hr: f64,
    /// Rain on each hop is drawn from `[rate, rate + spread]` when positive.
    pub rain_spread_mm_per_hr: f64,
    pub seed: u64,
    pub waveform: WaveformFamily,
    pub transponder: TransponderType,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            satellite_longitude_deg: 19.2,
            ground_lat_deg: 40.4,
            ground_lon_deg: -3.7,
            uplink_frequency_hz: 14.25e9,
            downlink_frequency_hz: 11.7e9,
            bandwidth_hz: 36e6,
            rain_rate_mm_per_hr: 0.0,
            rain_spread_mm_per_hr: 0.0,
            seed: 0,
            waveform: WaveformFamily::DvbS2x,
            transponder: TransponderType::Transparent,
        }
    }
}

fn entry(id: &str, modulation: &str, code_rate: &str, ebno_db: f64) -> RawModcodEntry {
    RawModcodEntry {
        id: id.to_string(),
        modulation: Some(modulation.to_string()),
        code_rate: Some(LooseValue::Text(code_rate.to_string())),
        required_ebno_db: Some(LooseValue::Number(ebno_db)),
        ..Default::default()
    }
}

/// Eb/N0 thresholds of a typical DVB-S2X receiver; bits per symbol are
/// inferred from modulation and code rate.
pub fn demo_modcod_table() -> ModcodTableInput {
    ModcodTableInput {
        id: Some("demo-dvbs2x".into()),
        name: Some("Demo DVB-S2X".into()),
        version: Some("1".into()),
        waveform: None,
        entries: vec![
            entry("qpsk-1/4", "QPSK", "1/4", 0.75),
            entry("qpsk-1/2", "QPSK", "1/2", 1.0),
            entry("qpsk-3/4", "QPSK", "3/4", 2.24),
            entry("8psk-2/3", "8PSK", "2/3", 3.1),
            entry("8psk-3/4", "8PSK", "3/4", 4.03),
            entry("16apsk-3/4", "16APSK", "3/4", 5.18),
            entry("32apsk-4/5", "32APSK", "4/5", 6.84),
        ],
    }
}

fn rain_rates(config: &GeneratorConfig) -> (f64, f64) {
    if config.rain_spread_mm_per_hr <= 0.0 {
        return (config.rain_rate_mm_per_hr, config.rain_rate_mm_per_hr);
    }
    let mut rng = StdRng::seed_from_u64(config.seed);
    let low = config.rain_rate_mm_per_hr.max(0.0);
    let high = low + config.rain_spread_mm_per_hr;
    (rng.gen_range(low..high), rng.gen_range(low..high))
}

fn direction(config: &GeneratorConfig, frequency_hz: f64, rain: f64) -> DirectionInput {
    DirectionInput {
        frequency_hz: Some(frequency_hz),
        rain_rate_mm_per_hr: Some(rain),
        ground_lat_deg: Some(config.ground_lat_deg),
        ground_lon_deg: Some(config.ground_lon_deg),
        ground_alt_m: Some(650.0),
        ..Default::default()
    }
}

pub fn build_demo_request(config: &GeneratorConfig) -> CalculationRequest {
    let (uplink_rain, downlink_rain) = rain_rates(config);
    let mut runtime = RuntimeInput {
        sat_longitude_deg: Some(config.satellite_longitude_deg),
        uplink: direction(config, config.uplink_frequency_hz, uplink_rain),
        downlink: direction(config, config.downlink_frequency_hz, downlink_rain),
        ..Default::default()
    };
    let (modcod_table, uplink_modcod_table, downlink_modcod_table) = match config.transponder {
        TransponderType::Transparent => {
            runtime.bandwidth_hz = Some(config.bandwidth_hz);
            (Some(demo_modcod_table()), None, None)
        }
        TransponderType::Regenerative => {
            runtime.uplink.bandwidth_hz = Some(config.bandwidth_hz);
            runtime.downlink.bandwidth_hz = Some(config.bandwidth_hz);
            (None, Some(demo_modcod_table()), Some(demo_modcod_table()))
        }
    };

    CalculationRequest {
        waveform_strategy: config.waveform,
        transponder_type: config.transponder,
        satellite: Some(SatelliteAsset {
            name: Some("DEMO-KU".into()),
            longitude_deg: Some(config.satellite_longitude_deg),
            eirp_dbw: Some(52.0),
            gt_db_per_k: Some(5.0),
            frequency_band: Some("Ku".into()),
            ..Default::default()
        }),
        earth_station_tx: Some(EarthStationAsset {
            name: Some("Hub 9m".into()),
            antenna_diameter_m: Some(9.0),
            tx_power_dbw: Some(10.0),
            antenna_gain_tx_db: Some(55.0),
            ..Default::default()
        }),
        earth_station_rx: Some(EarthStationAsset {
            name: Some("VSAT 1.2m".into()),
            antenna_diameter_m: Some(1.2),
            antenna_gain_rx_db: Some(42.0),
            noise_temperature_k: Some(150.0),
            ..Default::default()
        }),
        modcod_table,
        uplink_modcod_table,
        downlink_modcod_table,
        runtime,
        ..Default::default()
    }
}
