//! Request-level orchestration: geometry, parameters, context, per-direction
//! budgets, impairments and combination.

use std::sync::Arc;

use chrono::Utc;

use super::combine::Combiner;
use super::snapshot::build_snapshot;
use crate::impairments::{apply_impairments, compute_interference, estimate_intermodulation};
use crate::model::{
    CalculationRequest, CalculationResponse, Direction, DirectionInput, DirectionResults,
    GroundLocation, LinkDirectionParameters, ModcodTableInput, OrbitType, RuntimeEcho,
    RuntimeParameters, SatellitePosition, StrategySnapshot, TransponderType, SCHEMA_VERSION,
};
use crate::prelude::{EngineConfig, LinkError, LinkResult};
use crate::providers::{
    AnalyticPropagation, GeometryProvider, PropagationProvider, SphericalGeometry,
};
use crate::telemetry::LogManager;
use crate::transponder::{resolve_context, CommunicationStrategy};
use crate::waveform::WaveformStrategy;

/// Waveform strategies resolved for one request.
#[derive(Debug, Clone)]
pub enum ModcodTables {
    Shared(WaveformStrategy),
    PerDirection {
        uplink: WaveformStrategy,
        downlink: WaveformStrategy,
    },
}

/// Link combiner. Holds only the injected collaborators and constants, so a
/// fresh instance per request or sweep point is cheap.
#[derive(Clone)]
pub struct CalculationService {
    propagation: Arc<dyn PropagationProvider>,
    geometry: Arc<dyn GeometryProvider>,
    config: EngineConfig,
    logger: LogManager,
}

impl CalculationService {
    pub fn new(
        propagation: Arc<dyn PropagationProvider>,
        geometry: Arc<dyn GeometryProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            propagation,
            geometry,
            config,
            logger: LogManager::new("calculation"),
        }
    }

    /// Analytic propagation, spherical geometry and default constants.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(AnalyticPropagation::new()),
            Arc::new(SphericalGeometry::new()),
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn propagation(&self) -> Arc<dyn PropagationProvider> {
        Arc::clone(&self.propagation)
    }

    pub fn geometry(&self) -> Arc<dyn GeometryProvider> {
        Arc::clone(&self.geometry)
    }

    pub fn calculate(&self, request: &CalculationRequest) -> LinkResult<CalculationResponse> {
        let transponder = request.transponder_type;
        let tables = self.resolve_tables(request)?;
        let shared_bandwidth = self.resolve_bandwidth(request)?;
        let satellite = self.resolve_satellite(request)?;
        self.logger.trace_step(&format!(
            "satellite at lon {:.3} lat {:.3} alt {:.1} km",
            satellite.longitude_deg, satellite.latitude_deg, satellite.altitude_km
        ));

        let input = &request.runtime;
        let runtime = RuntimeParameters {
            satellite,
            rolloff: input.rolloff,
            uplink: self.build_direction(
                &input.uplink,
                Direction::Uplink,
                &satellite,
                shared_bandwidth,
            )?,
            downlink: self.build_direction(
                &input.downlink,
                Direction::Downlink,
                &satellite,
                shared_bandwidth,
            )?,
            intermodulation: input.intermodulation.clone(),
        };

        let context = resolve_context(request)?;
        let strategy = CommunicationStrategy::new(
            transponder,
            context,
            self.propagation.as_ref(),
            self.geometry.as_ref(),
            &self.config,
        );
        let uplink_clean = strategy.calculate(&runtime, Direction::Uplink)?;
        let downlink_clean = strategy.calculate(&runtime, Direction::Downlink)?;

        let uplink_interference = compute_interference(runtime.uplink.interference.as_ref());
        let downlink_interference = compute_interference(runtime.downlink.interference.as_ref());
        let intermodulation = estimate_intermodulation(runtime.intermodulation.as_ref());
        let uplink = apply_impairments(uplink_clean, &uplink_interference, None);
        let downlink =
            apply_impairments(downlink_clean, &downlink_interference, Some(&intermodulation));

        let combiner = match (&tables, shared_bandwidth) {
            (ModcodTables::Shared(waveform), Some(bandwidth_hz)) => Combiner::Transparent {
                strategy: waveform,
                bandwidth_hz,
            },
            (
                ModcodTables::PerDirection {
                    uplink: uplink_table,
                    downlink: downlink_table,
                },
                _,
            ) => Combiner::Regenerative {
                uplink: uplink_table,
                downlink: downlink_table,
            },
            (ModcodTables::Shared(_), None) => {
                return Err(LinkError::Computation(
                    "shared bandwidth missing for a transparent combination".into(),
                ))
            }
        };
        let outcome = combiner.combine(uplink, downlink, runtime.rolloff)?;

        let strategy_echo = StrategySnapshot {
            waveform_strategy: request.waveform_strategy,
            transponder_type: transponder,
        };
        let runtime_echo = RuntimeEcho {
            runtime,
            bandwidth_hz: shared_bandwidth,
        };
        let payload_snapshot = request.include_snapshot.then(|| {
            build_snapshot(
                request,
                &tables,
                &runtime_echo,
                strategy.context(),
                Utc::now(),
            )
        });

        self.logger.record(&format!(
            "{:?}/{} margin {} (uplink C/N {:.2} dB, downlink C/N {:.2} dB)",
            transponder,
            request.waveform_strategy.label(),
            outcome
                .system_link_margin_db
                .map_or_else(|| "n/a".to_string(), |m| format!("{:.2} dB", m)),
            outcome.uplink.cn_db,
            outcome.downlink.cn_db
        ));

        let combined_cn_db = outcome.combined.as_ref().map(|c| c.cn_db);
        let combined_cn0_dbhz = outcome.combined.as_ref().map(|c| c.cn0_dbhz);
        Ok(CalculationResponse {
            schema_version: SCHEMA_VERSION.to_string(),
            strategy: strategy_echo,
            results: DirectionResults {
                uplink: outcome.uplink,
                downlink: outcome.downlink,
                combined: outcome.combined,
            },
            combined_link_margin_db: outcome.combined_link_margin_db,
            system_link_margin_db: outcome.system_link_margin_db,
            combined_cn_db,
            combined_cn0_dbhz,
            modcod_selected: outcome.modcod_selected,
            runtime_echo,
            payload_snapshot,
        })
    }

    fn waveform_for(
        &self,
        request: &CalculationRequest,
        table: &ModcodTableInput,
    ) -> LinkResult<WaveformStrategy> {
        let family = table.waveform.unwrap_or(request.waveform_strategy);
        WaveformStrategy::from_raw(family, &table.entries, &self.config)
    }

    /// Transparent needs the shared table. Regenerative takes a
    /// per-direction table, then the shared one, then the built-in DVB-S2X
    /// table.
    fn resolve_tables(&self, request: &CalculationRequest) -> LinkResult<ModcodTables> {
        match request.transponder_type {
            TransponderType::Transparent => {
                let table = request.modcod_table.as_ref().ok_or_else(|| {
                    LinkError::validation("modcod_table is required for transparent transponders")
                })?;
                Ok(ModcodTables::Shared(self.waveform_for(request, table)?))
            }
            TransponderType::Regenerative => {
                let pick = |table: Option<&ModcodTableInput>| match table
                    .or(request.modcod_table.as_ref())
                {
                    Some(table) => self.waveform_for(request, table),
                    None => Ok(WaveformStrategy::default_dvbs2x(&self.config)),
                };
                Ok(ModcodTables::PerDirection {
                    uplink: pick(request.uplink_modcod_table.as_ref())?,
                    downlink: pick(request.downlink_modcod_table.as_ref())?,
                })
            }
        }
    }

    /// Shared bandwidth for transparent transponders; `None` for
    /// regenerative ones, which must not carry it.
    fn resolve_bandwidth(&self, request: &CalculationRequest) -> LinkResult<Option<f64>> {
        let runtime = &request.runtime;
        match request.transponder_type {
            TransponderType::Transparent => {
                let shared = runtime
                    .bandwidth_hz
                    .or(runtime.uplink.bandwidth_hz)
                    .or(runtime.downlink.bandwidth_hz)
                    .ok_or_else(|| {
                        LinkError::validation("bandwidth_hz is required for transparent transponders")
                    })?;
                for (direction, input) in [
                    (Direction::Uplink, &runtime.uplink),
                    (Direction::Downlink, &runtime.downlink),
                ] {
                    if let Some(bandwidth) = input.bandwidth_hz.filter(|bw| *bw != shared) {
                        return Err(LinkError::validation(format!(
                            "transparent transponders use a common bandwidth_hz for uplink and \
                             downlink ({} bandwidth {} Hz differs from {} Hz)",
                            direction, bandwidth, shared
                        )));
                    }
                }
                Ok(Some(shared))
            }
            TransponderType::Regenerative => match runtime.bandwidth_hz {
                Some(_) => Err(LinkError::validation(
                    "regenerative transponders require per-link bandwidth_hz values, not a shared one",
                )),
                None => Ok(None),
            },
        }
    }

    fn resolve_satellite(&self, request: &CalculationRequest) -> LinkResult<SatellitePosition> {
        let asset = request.satellite.clone().unwrap_or_default();
        let runtime = &request.runtime;

        if asset.orbit_type != OrbitType::Geo {
            if let Some(elements) = asset.two_line_elements() {
                let time = runtime.computation_datetime.unwrap_or_else(Utc::now);
                return Ok(self.geometry.propagate_orbit(&elements, time)?);
            }
        }

        let longitude_deg = runtime
            .sat_longitude_deg
            .or(asset.longitude_deg)
            .ok_or_else(|| {
                LinkError::validation(
                    "satellite longitude is required (set runtime.sat_longitude_deg or satellite.longitude_deg)",
                )
            })?;
        let altitude_km = runtime.sat_altitude_km.or(asset.altitude_km);

        if asset.orbit_type == OrbitType::Geo {
            return Ok(SatellitePosition::geostationary(
                longitude_deg,
                altitude_km.unwrap_or(self.config.geo_altitude_km),
            ));
        }
        let latitude_deg = runtime.sat_latitude_deg.ok_or_else(|| {
            LinkError::validation(format!(
                "runtime.sat_latitude_deg is required for {:?} orbits without TLE",
                asset.orbit_type
            ))
        })?;
        let altitude_km = altitude_km.ok_or_else(|| {
            LinkError::validation(format!(
                "satellite altitude (runtime.sat_altitude_km or satellite.altitude_km) is required for {:?} orbits",
                asset.orbit_type
            ))
        })?;
        Ok(SatellitePosition {
            longitude_deg,
            latitude_deg,
            altitude_km,
        })
    }

    fn build_direction(
        &self,
        input: &DirectionInput,
        direction: Direction,
        satellite: &SatellitePosition,
        shared_bandwidth: Option<f64>,
    ) -> LinkResult<LinkDirectionParameters> {
        let bandwidth = shared_bandwidth.or(input.bandwidth_hz);
        let missing: Vec<&str> = [
            ("frequency_hz", input.frequency_hz.is_none()),
            ("bandwidth_hz", bandwidth.is_none()),
            ("ground_lat_deg", input.ground_lat_deg.is_none()),
            ("ground_lon_deg", input.ground_lon_deg.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        let (Some(frequency_hz), Some(bandwidth_hz), Some(lat), Some(lon)) = (
            input.frequency_hz,
            bandwidth,
            input.ground_lat_deg,
            input.ground_lon_deg,
        ) else {
            return Err(LinkError::validation(format!(
                "{} requires {} in runtime",
                direction,
                missing.join(", ")
            )));
        };
        for (name, value) in [("frequency_hz", frequency_hz), ("bandwidth_hz", bandwidth_hz)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(LinkError::validation(format!(
                    "{} {} must be positive (got {})",
                    direction, name, value
                )));
            }
        }

        let ground = GroundLocation::new(lat, lon, input.ground_alt_m.unwrap_or(0.0));
        let elevation_deg = match input.elevation_deg {
            Some(elevation) if elevation < 0.0 => {
                return Err(LinkError::validation(format!(
                    "Elevation for {} is below horizon ({:.2} deg)",
                    direction, elevation
                )))
            }
            Some(elevation) => elevation,
            None => {
                let elevation = self.geometry.elevation(satellite, &ground)?;
                if elevation < 0.0 {
                    return Err(LinkError::validation(format!(
                        "Computed elevation for {} is below horizon ({:.2} deg); check ground coordinates and satellite position",
                        direction, elevation
                    )));
                }
                elevation
            }
        };

        let default_temperature = match direction {
            Direction::Uplink => self.config.default_uplink_temperature_k,
            Direction::Downlink => self.config.default_downlink_temperature_k,
        };
        Ok(LinkDirectionParameters {
            frequency_hz,
            bandwidth_hz,
            elevation_deg,
            rain_rate_mm_per_hr: input
                .rain_rate_mm_per_hr
                .unwrap_or(self.config.default_rain_rate_mm_per_hr),
            temperature_k: input
                .temperature_k
                .filter(|t| *t > 0.0)
                .unwrap_or(default_temperature),
            ground,
            pressure_hpa: input.pressure_hpa,
            water_vapor_density: input.water_vapor_density,
            interference: input.interference.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        EarthStationAsset, InterferenceDescriptor, IntermodulationDescriptor, LooseValue,
        ModcodSelection, RawModcodEntry, RuntimeInput, SatelliteAsset, TwoLineElements,
        WaveformFamily,
    };
    use crate::providers::FixedPropagation;
    use crate::waveform::table::default_dvbs2x_entries;
    use chrono::TimeZone;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    pub(crate) fn fixed_service() -> CalculationService {
        CalculationService::new(
            Arc::new(FixedPropagation::default()),
            Arc::new(SphericalGeometry::new()),
            EngineConfig::default(),
        )
    }

    fn direction(frequency_hz: f64, bandwidth_hz: Option<f64>) -> DirectionInput {
        DirectionInput {
            frequency_hz: Some(frequency_hz),
            bandwidth_hz,
            elevation_deg: Some(35.0),
            ground_lat_deg: Some(40.4),
            ground_lon_deg: Some(-3.7),
            ..Default::default()
        }
    }

    fn table() -> ModcodTableInput {
        ModcodTableInput {
            name: Some("reference".into()),
            entries: default_dvbs2x_entries()
                .iter()
                .map(RawModcodEntry::from)
                .collect(),
            ..Default::default()
        }
    }

    /// Ku-band GEO bent pipe with every figure given explicitly.
    pub(crate) fn transparent_request() -> CalculationRequest {
        CalculationRequest {
            waveform_strategy: WaveformFamily::DvbS2x,
            transponder_type: TransponderType::Transparent,
            satellite: Some(SatelliteAsset {
                name: Some("GEO-19E".into()),
                longitude_deg: Some(19.2),
                eirp_dbw: Some(52.0),
                gt_db_per_k: Some(5.0),
                ..Default::default()
            }),
            earth_station_tx: Some(EarthStationAsset {
                eirp_dbw: Some(70.0),
                ..Default::default()
            }),
            earth_station_rx: Some(EarthStationAsset {
                gt_db_per_k: Some(20.0),
                ..Default::default()
            }),
            modcod_table: Some(table()),
            runtime: RuntimeInput {
                bandwidth_hz: Some(36e6),
                uplink: direction(14.25e9, None),
                downlink: direction(11.7e9, None),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub(crate) fn regenerative_request() -> CalculationRequest {
        let mut request = transparent_request();
        request.transponder_type = TransponderType::Regenerative;
        request.modcod_table = None;
        request.runtime.bandwidth_hz = None;
        request.runtime.uplink.bandwidth_hz = Some(20e6);
        request.runtime.downlink.bandwidth_hz = Some(36e6);
        request
    }

    #[test]
    fn transparent_reports_one_shared_modcod() {
        let response = fixed_service().calculate(&transparent_request()).unwrap();
        assert_eq!(response.schema_version, SCHEMA_VERSION);
        assert!(matches!(
            response.modcod_selected,
            Some(ModcodSelection::Shared(_))
        ));
        let combined = response.results.combined.as_ref().unwrap();
        assert_eq!(response.combined_link_margin_db, combined.link_margin_db);
        assert_eq!(response.combined_cn_db, Some(combined.cn_db));
        assert_eq!(
            response.results.uplink.modcod_selected,
            response.results.downlink.modcod_selected
        );
        assert_eq!(response.runtime_echo.bandwidth_hz, Some(36e6));
        assert!(response.payload_snapshot.is_none());
    }

    #[test]
    fn regenerative_reports_no_combined_margin() {
        let response = fixed_service().calculate(&regenerative_request()).unwrap();
        assert!(response.combined_link_margin_db.is_none());
        assert!(response.results.combined.is_none());
        assert!(response.runtime_echo.bandwidth_hz.is_none());
        let ul = response.results.uplink.link_margin_db.unwrap();
        let dl = response.results.downlink.link_margin_db.unwrap();
        assert_eq!(response.system_link_margin_db, Some(ul.min(dl)));
        assert!(matches!(
            response.modcod_selected,
            Some(ModcodSelection::PerDirection { .. })
        ));
    }

    #[test]
    fn rain_never_improves_combined_margin() {
        let service = fixed_service();
        let mut last = f64::INFINITY;
        for rain in [0.0, 5.0, 10.0, 20.0, 40.0, 80.0] {
            let mut request = transparent_request();
            request.runtime.uplink.rain_rate_mm_per_hr = Some(rain);
            let margin = service
                .calculate(&request)
                .unwrap()
                .combined_link_margin_db
                .unwrap();
            assert!(margin <= last + 1e-12, "margin {} after {}", margin, last);
            last = margin;
        }
    }

    #[test]
    fn mismatched_transparent_bandwidths_are_rejected() {
        let mut request = transparent_request();
        request.runtime.bandwidth_hz = None;
        request.runtime.uplink.bandwidth_hz = Some(36e6);
        request.runtime.downlink.bandwidth_hz = Some(54e6);
        let err = fixed_service().calculate(&request).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("common bandwidth_hz"));
    }

    #[test]
    fn shared_bandwidth_is_rejected_for_regenerative() {
        let mut request = regenerative_request();
        request.runtime.bandwidth_hz = Some(36e6);
        let err = fixed_service().calculate(&request).unwrap_err();
        assert!(matches!(err, LinkError::Validation(_)));
    }

    #[test]
    fn transparent_requires_a_table() {
        let mut request = transparent_request();
        request.modcod_table = None;
        let err = fixed_service().calculate(&request).unwrap_err();
        assert!(err.to_string().contains("modcod_table"));
    }

    #[test]
    fn computed_sub_horizon_elevation_is_rejected() {
        let mut request = transparent_request();
        request.runtime.downlink.elevation_deg = None;
        request.runtime.downlink.ground_lon_deg = Some(-170.0);
        let err = fixed_service().calculate(&request).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err
            .to_string()
            .contains("Computed elevation for downlink is below horizon"));
    }

    #[test]
    fn elevation_is_computed_when_absent() {
        let mut request = transparent_request();
        request.runtime.uplink.elevation_deg = None;
        let response = fixed_service().calculate(&request).unwrap();
        let elevation = response.results.uplink.elevation_deg;
        assert!(elevation > 30.0 && elevation < 50.0, "elevation {}", elevation);
    }

    #[test]
    fn missing_coordinates_are_named() {
        let mut request = transparent_request();
        request.runtime.uplink.ground_lat_deg = None;
        let err = fixed_service().calculate(&request).unwrap_err();
        assert!(err.to_string().contains("ground_lat_deg"));
    }

    #[test]
    fn non_geo_without_tle_needs_latitude() {
        let mut request = transparent_request();
        if let Some(satellite) = request.satellite.as_mut() {
            satellite.orbit_type = OrbitType::Leo;
            satellite.altitude_km = Some(550.0);
        }
        let err = fixed_service().calculate(&request).unwrap_err();
        assert!(err.to_string().contains("sat_latitude_deg"));

        request.runtime.sat_latitude_deg = Some(40.0);
        request.runtime.sat_longitude_deg = Some(-3.0);
        let response = fixed_service().calculate(&request).unwrap();
        assert_eq!(response.runtime_echo.runtime.satellite.altitude_km, 550.0);
    }

    #[test]
    fn tle_satellite_is_propagated_at_computation_time() {
        let time = Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap();
        let elements = TwoLineElements {
            name: "ISS (ZARYA)".into(),
            line1: ISS_LINE1.into(),
            line2: ISS_LINE2.into(),
        };
        let position = SphericalGeometry::new()
            .propagate_orbit(&elements, time)
            .unwrap();

        let mut request = transparent_request();
        if let Some(satellite) = request.satellite.as_mut() {
            satellite.name = Some("ISS (ZARYA)".into());
            satellite.orbit_type = OrbitType::Leo;
            satellite.longitude_deg = None;
            satellite.tle_line1 = Some(ISS_LINE1.into());
            satellite.tle_line2 = Some(ISS_LINE2.into());
        }
        request.runtime.computation_datetime = Some(time);
        for input in [&mut request.runtime.uplink, &mut request.runtime.downlink] {
            input.elevation_deg = None;
            input.ground_lat_deg = Some(position.latitude_deg);
            input.ground_lon_deg = Some(position.longitude_deg);
        }
        request.include_snapshot = true;

        let response = CalculationService::with_defaults().calculate(&request).unwrap();
        let uplink = &response.results.uplink;
        assert!(uplink.elevation_deg > 89.0, "elevation {}", uplink.elevation_deg);
        // A few hundred km of slant range instead of GEO distance.
        assert!(uplink.fspl_db > 160.0 && uplink.fspl_db < 175.0, "fspl {}", uplink.fspl_db);
        assert_eq!(response.runtime_echo.runtime.satellite, position);
        let snapshot = response.payload_snapshot.unwrap();
        assert_eq!(snapshot.runtime.runtime.satellite, position);
    }

    #[test]
    fn tle_satellite_out_of_view_is_rejected() {
        let time = Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap();
        let elements = TwoLineElements {
            name: "ISS (ZARYA)".into(),
            line1: ISS_LINE1.into(),
            line2: ISS_LINE2.into(),
        };
        let position = SphericalGeometry::new()
            .propagate_orbit(&elements, time)
            .unwrap();

        let mut request = transparent_request();
        if let Some(satellite) = request.satellite.as_mut() {
            satellite.orbit_type = OrbitType::Leo;
            satellite.tle_line1 = Some(ISS_LINE1.into());
            satellite.tle_line2 = Some(ISS_LINE2.into());
        }
        request.runtime.computation_datetime = Some(time);
        request.runtime.uplink.elevation_deg = None;
        request.runtime.uplink.ground_lat_deg = Some(-position.latitude_deg);
        request.runtime.uplink.ground_lon_deg = Some(position.longitude_deg + 180.0);

        let err = fixed_service().calculate(&request).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err
            .to_string()
            .contains("Computed elevation for uplink is below horizon"));
    }

    #[test]
    fn meo_with_tle_is_propagated_too() {
        let time = Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap();
        let mut request = transparent_request();
        if let Some(satellite) = request.satellite.as_mut() {
            satellite.orbit_type = OrbitType::Meo;
            satellite.tle_line1 = Some(ISS_LINE1.into());
            satellite.tle_line2 = Some(ISS_LINE2.into());
        }
        request.runtime.computation_datetime = Some(time);
        let response = fixed_service().calculate(&request).unwrap();
        let satellite = response.runtime_echo.runtime.satellite;
        assert!(satellite.altitude_km < 500.0, "altitude {}", satellite.altitude_km);
    }

    fn cn0_table(name: &str, rows: &[(&str, &str, &str, f64)]) -> ModcodTableInput {
        ModcodTableInput {
            name: Some(name.into()),
            entries: rows
                .iter()
                .map(|(id, modulation, code_rate, cn0)| RawModcodEntry {
                    id: id.to_string(),
                    modulation: Some(modulation.to_string()),
                    code_rate: Some(LooseValue::Text(code_rate.to_string())),
                    required_cn0_dbhz: Some(LooseValue::Number(*cn0)),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn regenerative_hops_use_their_own_tables() {
        // Uplink C/N0 is 98.2 dBHz and downlink 95.2 dBHz with fixed losses.
        let mut request = regenerative_request();
        request.modcod_table = Some(table());
        request.uplink_modcod_table = Some(cn0_table(
            "uplink-table",
            &[("ul-low", "QPSK", "1/2", 80.0), ("ul-high", "16APSK", "3/4", 90.0)],
        ));
        request.downlink_modcod_table = Some(cn0_table(
            "downlink-table",
            &[("dl-low", "QPSK", "1/2", 90.0), ("dl-high", "16APSK", "3/4", 100.0)],
        ));
        request.include_snapshot = true;

        let response = fixed_service().calculate(&request).unwrap();
        let uplink = &response.results.uplink;
        let downlink = &response.results.downlink;
        assert_eq!(uplink.modcod_selected.as_deref(), Some("ul-high"));
        assert_eq!(downlink.modcod_selected.as_deref(), Some("dl-low"));
        let ul = uplink.link_margin_db.unwrap();
        let dl = downlink.link_margin_db.unwrap();
        assert!((ul - (uplink.cn0_dbhz - 90.0)).abs() < 1e-9);
        assert!((dl - (downlink.cn0_dbhz - 90.0)).abs() < 1e-9);
        assert!(dl < ul);
        assert_eq!(response.system_link_margin_db, Some(dl));
        assert!(response.combined_link_margin_db.is_none());

        let snapshot = response.payload_snapshot.unwrap();
        let ul_table = snapshot.static_data.uplink_modcod_table.unwrap();
        let dl_table = snapshot.static_data.downlink_modcod_table.unwrap();
        assert_eq!(ul_table.name.as_deref(), Some("uplink-table"));
        assert_eq!(dl_table.name.as_deref(), Some("downlink-table"));
        assert_eq!(ul_table.entries[0].id, "ul-low");
        assert_eq!(dl_table.entries[1].id, "dl-high");
    }

    #[test]
    fn regenerative_hop_without_table_falls_back_to_shared() {
        let mut request = regenerative_request();
        request.modcod_table = Some(table());
        request.uplink_modcod_table = Some(cn0_table(
            "uplink-table",
            &[("ul-low", "QPSK", "1/2", 80.0)],
        ));
        request.include_snapshot = true;

        let response = fixed_service().calculate(&request).unwrap();
        assert_eq!(
            response.results.uplink.modcod_selected.as_deref(),
            Some("ul-low")
        );
        assert_eq!(
            response.results.downlink.modcod_selected.as_deref(),
            Some("8psk-3/4")
        );
        let snapshot = response.payload_snapshot.unwrap();
        let dl_table = snapshot.static_data.downlink_modcod_table.unwrap();
        assert_eq!(dl_table.name.as_deref(), Some("reference"));
    }

    #[test]
    fn impairments_land_on_the_right_directions() {
        let mut request = transparent_request();
        request.runtime.uplink.interference = Some(InterferenceDescriptor {
            adjacent_sat_ci_db: Some(20.0),
            ..Default::default()
        });
        request.runtime.intermodulation = Some(IntermodulationDescriptor {
            output_backoff_db: Some(4.0),
            composite_carriers: Some(4),
            ..Default::default()
        });
        let response = fixed_service().calculate(&request).unwrap();
        let uplink = &response.results.uplink;
        let downlink = &response.results.downlink;
        assert!(uplink.interference_applied);
        assert!(!uplink.intermod_applied);
        assert!(downlink.intermod_applied);
        assert!(uplink.cn_db < uplink.clean_cn_db);
        assert!(downlink.cn_db < downlink.clean_cn_db);
        let combined = response.results.combined.unwrap();
        assert!(combined.clean_link_margin_db.unwrap() > combined.link_margin_db.unwrap());
        assert!(combined.c_im_db.is_some());
    }

    #[test]
    fn snapshot_is_attached_on_request() {
        let mut request = transparent_request();
        request.include_snapshot = true;
        let response = fixed_service().calculate(&request).unwrap();
        let snapshot = response.payload_snapshot.unwrap();
        assert_eq!(snapshot.metadata.schema_version, SCHEMA_VERSION);
        let table = snapshot.static_data.modcod_table.unwrap();
        assert_eq!(table.entries.len(), 3);
        assert_eq!(table.name.as_deref(), Some("reference"));
    }

    #[test]
    fn table_waveform_tag_overrides_request_family() {
        let mut request = transparent_request();
        if let Some(table) = request.modcod_table.as_mut() {
            table.waveform = Some(WaveformFamily::Nr);
        }
        let response = fixed_service().calculate(&request).unwrap();
        let Some(ModcodSelection::Shared(summary)) = response.modcod_selected else {
            panic!("expected a shared selection");
        };
        let expected = summary.info_bits_per_symbol * (1.0 - 0.14);
        assert!((summary.effective_spectral_efficiency - expected).abs() < 1e-12);
    }
}
