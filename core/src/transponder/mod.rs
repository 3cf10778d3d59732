//! Per-direction link budget for transparent and regenerative transponders.

pub mod context;

use crate::math::hz_to_db;
use crate::model::{
    CalculationResult, CommunicationContext, Direction, LossBreakdown, RuntimeParameters,
    TransponderType,
};
use crate::prelude::{ensure_finite, EngineConfig, LinkError, LinkResult};
use crate::providers::{AtmosphereSample, GeometryProvider, PropagationProvider};
use crate::telemetry::LogManager;

pub use context::resolve_context;

/// Thermal C/N for one direction of a transponder.
///
/// Both transponder types evaluate a single hop identically; they differ in
/// how the two hops are combined afterwards.
pub struct CommunicationStrategy<'a> {
    transponder: TransponderType,
    context: CommunicationContext,
    propagation: &'a dyn PropagationProvider,
    geometry: &'a dyn GeometryProvider,
    config: &'a EngineConfig,
    logger: LogManager,
}

impl<'a> CommunicationStrategy<'a> {
    pub fn new(
        transponder: TransponderType,
        context: CommunicationContext,
        propagation: &'a dyn PropagationProvider,
        geometry: &'a dyn GeometryProvider,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            transponder,
            context,
            propagation,
            geometry,
            config,
            logger: LogManager::new("transponder"),
        }
    }

    pub fn transponder(&self) -> TransponderType {
        self.transponder
    }

    pub fn context(&self) -> &CommunicationContext {
        &self.context
    }

    fn terminal_figures(&self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Uplink => (
                self.context.uplink_tx_eirp_dbw.value,
                self.context.uplink_rx_gt_db_per_k.value,
            ),
            Direction::Downlink => (
                self.context.downlink_tx_eirp_dbw.value,
                self.context.downlink_rx_gt_db_per_k.value,
            ),
        }
    }

    pub fn calculate(
        &self,
        runtime: &RuntimeParameters,
        direction: Direction,
    ) -> LinkResult<CalculationResult> {
        let params = runtime.direction(direction);
        if params.bandwidth_hz <= 0.0 {
            return Err(LinkError::validation(format!(
                "{} bandwidth_hz must be positive (got {})",
                direction, params.bandwidth_hz
            )));
        }
        let (eirp_dbw, gt_db_per_k) = self.terminal_figures(direction);

        let slant_range_km = self
            .geometry
            .slant_range_km(&runtime.satellite, &params.ground)?;
        let atmosphere = AtmosphereSample {
            temperature_k: params.temperature_k,
            water_vapor_density: params
                .water_vapor_density
                .unwrap_or(self.config.default_water_vapor_density),
            pressure_hpa: params
                .pressure_hpa
                .unwrap_or(self.config.default_pressure_hpa),
        };

        let losses = LossBreakdown {
            free_space_db: self
                .propagation
                .free_space_loss(params.frequency_hz, slant_range_km)?,
            rain_db: self.propagation.rain_loss(
                params.rain_rate_mm_per_hr,
                params.elevation_deg,
                &params.ground,
                params.frequency_hz,
            )?,
            gas_db: self.propagation.gas_loss(
                params.frequency_hz,
                params.elevation_deg,
                &atmosphere,
            )?,
            cloud_db: self.propagation.cloud_loss(
                &params.ground,
                params.elevation_deg,
                params.frequency_hz,
                self.config.cloud_availability_p,
            )?,
            pointing_db: self.propagation.pointing_loss(params.elevation_deg)?,
        };
        let total_loss = ensure_finite("total loss", losses.total_db())?;

        let cn0_dbhz = ensure_finite(
            "C/N0",
            eirp_dbw + gt_db_per_k - total_loss - self.config.boltzmann_dbw,
        )?;
        let cn_db = ensure_finite("C/N", cn0_dbhz - hz_to_db(params.bandwidth_hz))?;

        self.logger.trace_step(&format!(
            "{} {:?}: range {:.1} km, loss {:.2} dB, C/N0 {:.2} dBHz, C/N {:.2} dB",
            direction, self.transponder, slant_range_km, total_loss, cn0_dbhz, cn_db
        ));

        Ok(CalculationResult::thermal(
            direction,
            losses,
            eirp_dbw,
            gt_db_per_k,
            params.bandwidth_hz,
            params.elevation_deg,
            cn0_dbhz,
            cn_db,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroundLocation, LinkDirectionParameters, SatellitePosition};
    use crate::providers::{FixedPropagation, SphericalGeometry};

    fn direction(frequency_hz: f64, bandwidth_hz: f64, rain: f64) -> LinkDirectionParameters {
        LinkDirectionParameters {
            frequency_hz,
            bandwidth_hz,
            elevation_deg: 35.0,
            rain_rate_mm_per_hr: rain,
            temperature_k: 290.0,
            ground: GroundLocation::new(40.0, -3.7, 0.0),
            pressure_hpa: None,
            water_vapor_density: None,
            interference: None,
        }
    }

    fn runtime(rain: f64) -> RuntimeParameters {
        RuntimeParameters {
            satellite: SatellitePosition::geostationary(19.2, 35_786.0),
            rolloff: None,
            uplink: direction(14.25e9, 36e6, rain),
            downlink: direction(11.7e9, 36e6, 0.0),
            intermodulation: None,
        }
    }

    #[test]
    fn cn0_follows_the_budget_equation() {
        let propagation = FixedPropagation::default();
        let geometry = SphericalGeometry::new();
        let config = EngineConfig::default();
        let strategy = CommunicationStrategy::new(
            TransponderType::Transparent,
            CommunicationContext::explicit(70.0, 5.0, 52.0, 20.0),
            &propagation,
            &geometry,
            &config,
        );
        let result = strategy.calculate(&runtime(0.0), Direction::Uplink).unwrap();
        // 205 FSPL + 0.2 gas + 0.1 cloud + 0.1 pointing.
        let expected_cn0 = 70.0 + 5.0 - 205.4 + 228.6;
        assert!((result.cn0_dbhz - expected_cn0).abs() < 1e-9);
        assert!((result.cn_db - (expected_cn0 - hz_to_db(36e6))).abs() < 1e-9);
        assert_eq!(result.clean_cn_db, result.cn_db);
        assert_eq!(result.eirp_dbw, 70.0);
    }

    #[test]
    fn rain_lowers_cn() {
        let propagation = FixedPropagation::default();
        let geometry = SphericalGeometry::new();
        let config = EngineConfig::default();
        let strategy = CommunicationStrategy::new(
            TransponderType::Regenerative,
            CommunicationContext::explicit(70.0, 5.0, 52.0, 20.0),
            &propagation,
            &geometry,
            &config,
        );
        let dry = strategy.calculate(&runtime(0.0), Direction::Uplink).unwrap();
        let wet = strategy.calculate(&runtime(20.0), Direction::Uplink).unwrap();
        assert!((dry.cn_db - wet.cn_db - 2.0).abs() < 1e-9);
        assert!((wet.rain_loss_db - 2.0).abs() < 1e-9);
    }

    #[test]
    fn provider_failures_surface() {
        let propagation = crate::providers::AnalyticPropagation::new();
        let geometry = SphericalGeometry::new();
        let config = EngineConfig::default();
        let strategy = CommunicationStrategy::new(
            TransponderType::Transparent,
            CommunicationContext::explicit(70.0, 5.0, 52.0, 20.0),
            &propagation,
            &geometry,
            &config,
        );
        let mut bad = runtime(0.0);
        bad.downlink.frequency_hz = -1.0;
        let err = strategy.calculate(&bad, Direction::Downlink).unwrap_err();
        assert!(matches!(err, LinkError::Provider(_)));
    }
}
