//! EIRP and G/T resolution from assets and overrides.
//!
//! Precedence for every figure: explicit override, then a value derived from
//! terminal components, then the value stored on the asset. A figure that
//! none of these provide is a validation error naming where to supply it.

use crate::math::hz_to_db;
use crate::model::{
    CalculationRequest, CommunicationContext, EarthStationAsset, ResolvedValue, ValueSource,
};
use crate::prelude::{LinkError, LinkResult};

fn pick(
    override_value: Option<f64>,
    derived: Option<f64>,
    stored: Option<f64>,
) -> Option<ResolvedValue> {
    let resolved = |value, source| ResolvedValue { value, source };
    override_value
        .map(|value| resolved(value, ValueSource::Override))
        .or_else(|| derived.map(|value| resolved(value, ValueSource::Derived)))
        .or_else(|| stored.map(|value| resolved(value, ValueSource::Stored)))
}

fn require(value: Option<ResolvedValue>, label: &str, hint: &str) -> LinkResult<ResolvedValue> {
    value.ok_or_else(|| LinkError::validation(format!("missing {}: set {}", label, hint)))
}

/// Transmit power plus transmit antenna gain; a bare transmit power counts
/// as the EIRP of an isotropic feed.
fn derived_eirp(station: &EarthStationAsset) -> Option<f64> {
    Some(station.tx_power_dbw? + station.antenna_gain_tx_db.unwrap_or(0.0))
}

/// Receive antenna gain over system noise temperature.
fn derived_gt(station: &EarthStationAsset) -> Option<f64> {
    let temperature = station.noise_temperature_k.filter(|t| *t > 0.0)?;
    Some(station.antenna_gain_rx_db? - hz_to_db(temperature))
}

pub fn resolve_context(request: &CalculationRequest) -> LinkResult<CommunicationContext> {
    let overrides = &request.overrides;
    let sat_override = overrides.satellite.clone().unwrap_or_default();
    let tx_override = overrides.earth_station_tx.clone().unwrap_or_default();
    let rx_override = overrides.earth_station_rx.clone().unwrap_or_default();
    let satellite = request.satellite.as_ref();
    let tx_station = request.earth_station_tx.as_ref();
    let rx_station = request.earth_station_rx.as_ref();

    let uplink_tx_eirp_dbw = require(
        pick(
            tx_override.eirp_dbw,
            tx_station.and_then(derived_eirp),
            tx_station.and_then(|s| s.eirp_dbw),
        ),
        "uplink transmit EIRP",
        "earth_station_tx.eirp_dbw or overrides.earth_station_tx.eirp_dbw",
    )?;
    let uplink_rx_gt_db_per_k = require(
        pick(
            sat_override.gt_db_per_k,
            None,
            satellite.and_then(|s| s.gt_db_per_k),
        ),
        "uplink receive G/T",
        "satellite.gt_db_per_k or overrides.satellite.gt_db_per_k",
    )?;
    let downlink_tx_eirp_dbw = require(
        pick(sat_override.eirp_dbw, None, satellite.and_then(|s| s.eirp_dbw)),
        "downlink transmit EIRP",
        "satellite.eirp_dbw or overrides.satellite.eirp_dbw",
    )?;
    let downlink_rx_gt_db_per_k = require(
        pick(
            rx_override.gt_db_per_k,
            rx_station.and_then(derived_gt),
            rx_station.and_then(|s| s.gt_db_per_k),
        ),
        "downlink receive G/T",
        "earth_station_rx.gt_db_per_k or overrides.earth_station_rx.gt_db_per_k",
    )?;

    Ok(CommunicationContext {
        uplink_tx_eirp_dbw,
        uplink_rx_gt_db_per_k,
        downlink_tx_eirp_dbw,
        downlink_rx_gt_db_per_k,
    })
}
