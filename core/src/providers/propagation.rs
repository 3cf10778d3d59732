use std::f64::consts::PI;

use super::{finite, AtmosphereSample, PropagationProvider, ProviderError, ProviderResult};
use crate::model::GroundLocation;

const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
/// Below this elevation the flat-layer cosecant law is held constant.
const MIN_PATH_ELEVATION_DEG: f64 = 5.0;

/// Closed-form atmospheric models.
///
/// Free-space loss is exact. Rain, gas and cloud terms are simplified
/// engineering approximations (power-law rain with an effective slant path,
/// cosecant-scaled zenith absorption, columnar liquid water) and are not a
/// substitute for the ITU-R recommendations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticPropagation;

impl AnalyticPropagation {
    pub fn new() -> Self {
        Self
    }

    fn frequency_ghz(frequency_hz: f64) -> ProviderResult<f64> {
        if frequency_hz > 0.0 && frequency_hz.is_finite() {
            Ok(frequency_hz / 1e9)
        } else {
            Err(ProviderError::InvalidInput(format!(
                "frequency must be positive (got {} Hz)",
                frequency_hz
            )))
        }
    }

    fn path_sine(elevation_deg: f64) -> f64 {
        elevation_deg
            .max(MIN_PATH_ELEVATION_DEG)
            .min(90.0)
            .to_radians()
            .sin()
    }

    /// Power-law coefficients (k, alpha) for specific rain attenuation.
    fn rain_coefficients(frequency_ghz: f64) -> (f64, f64) {
        let k = if frequency_ghz <= 54.0 {
            4.21e-5 * frequency_ghz.powf(2.42)
        } else {
            4.09e-2 * frequency_ghz.powf(0.699)
        };
        let alpha = if frequency_ghz <= 25.0 {
            1.41 * frequency_ghz.powf(-0.0779)
        } else {
            2.63 * frequency_ghz.powf(-0.272)
        };
        (k, alpha)
    }

    /// Effective rain height (km) as a function of latitude.
    fn rain_height_km(lat_deg: f64) -> f64 {
        let lat = lat_deg.abs();
        if lat <= 23.0 {
            5.0
        } else {
            (5.0 - 0.075 * (lat - 23.0)).max(0.0)
        }
    }
}

impl PropagationProvider for AnalyticPropagation {
    fn free_space_loss(&self, frequency_hz: f64, distance_km: f64) -> ProviderResult<f64> {
        Self::frequency_ghz(frequency_hz)?;
        let distance_m = (distance_km * 1000.0).max(1e-3);
        let loss = 20.0 * distance_m.log10()
            + 20.0 * frequency_hz.log10()
            + 20.0 * (4.0 * PI / SPEED_OF_LIGHT_M_S).log10();
        finite("free-space loss", loss)
    }

    fn rain_loss(
        &self,
        rain_rate_mm_per_hr: f64,
        elevation_deg: f64,
        ground: &GroundLocation,
        frequency_hz: f64,
    ) -> ProviderResult<f64> {
        let frequency_ghz = Self::frequency_ghz(frequency_hz)?;
        if rain_rate_mm_per_hr <= 0.0 {
            return Ok(0.0);
        }
        let rain_depth_km = Self::rain_height_km(ground.lat_deg) - ground.alt_m / 1000.0;
        if rain_depth_km <= 0.0 {
            return Ok(0.0);
        }

        let (k, alpha) = Self::rain_coefficients(frequency_ghz);
        let specific_db_per_km = k * rain_rate_mm_per_hr.powf(alpha);

        let slant_km = rain_depth_km / Self::path_sine(elevation_deg);
        let horizontal_km = slant_km * elevation_deg.max(0.0).to_radians().cos();
        let reference_km = 35.0 * (-0.015 * rain_rate_mm_per_hr.min(100.0)).exp();
        let reduction = 1.0 / (1.0 + horizontal_km / reference_km);

        finite("rain", specific_db_per_km * slant_km * reduction)
    }

    fn gas_loss(
        &self,
        frequency_hz: f64,
        elevation_deg: f64,
        atmosphere: &AtmosphereSample,
    ) -> ProviderResult<f64> {
        let frequency_ghz = Self::frequency_ghz(frequency_hz)?;
        if atmosphere.temperature_k <= 0.0 || atmosphere.pressure_hpa <= 0.0 {
            return Err(ProviderError::Model {
                model: "gaseous",
                reason: format!(
                    "temperature {} K and pressure {} hPa must be positive",
                    atmosphere.temperature_k, atmosphere.pressure_hpa
                ),
            });
        }

        let density_scale = (atmosphere.pressure_hpa / 1013.25) * (288.15 / atmosphere.temperature_k);
        let oxygen_zenith_db = (0.035 + 0.0015 * frequency_ghz) * density_scale;
        let water_line = 0.3 * (-((frequency_ghz - 22.235) / 3.0).powi(2)).exp();
        let vapor_zenith_db =
            (atmosphere.water_vapor_density.max(0.0) / 7.5) * (0.0018 * frequency_ghz + water_line);

        finite(
            "gaseous",
            (oxygen_zenith_db + vapor_zenith_db) / Self::path_sine(elevation_deg),
        )
    }

    fn cloud_loss(
        &self,
        ground: &GroundLocation,
        elevation_deg: f64,
        frequency_hz: f64,
        availability_p: f64,
    ) -> ProviderResult<f64> {
        let frequency_ghz = Self::frequency_ghz(frequency_hz)?;
        if availability_p <= 0.0 {
            return Err(ProviderError::Model {
                model: "cloud",
                reason: format!("exceedance probability must be positive (got {})", availability_p),
            });
        }

        // Columnar liquid water (kg/m²), wetter towards the equator and for
        // rarer exceedance levels.
        let base_lwc = 0.2 + 0.4 * ground.lat_deg.to_radians().cos().abs();
        let rarity = (1.0 + 0.25 * (1.0 / availability_p).log10()).max(0.5);
        let specific = 4e-4 * frequency_ghz.powf(1.95);

        finite(
            "cloud",
            base_lwc * rarity * specific / Self::path_sine(elevation_deg),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> GroundLocation {
        GroundLocation::new(40.0, -3.7, 650.0)
    }

    #[test]
    fn free_space_loss_matches_closed_form() {
        let model = AnalyticPropagation::new();
        // 12 GHz over 38 000 km is roughly 205.6 dB.
        let loss = model.free_space_loss(12e9, 38_000.0).unwrap();
        assert!((loss - 205.6).abs() < 0.1, "loss {}", loss);
    }

    #[test]
    fn rain_loss_is_zero_without_rain() {
        let model = AnalyticPropagation::new();
        assert_eq!(model.rain_loss(0.0, 35.0, &ground(), 14e9).unwrap(), 0.0);
    }

    #[test]
    fn rain_loss_grows_with_rain_rate() {
        let model = AnalyticPropagation::new();
        let rates = [1.0, 5.0, 10.0, 25.0, 50.0];
        let losses: Vec<f64> = rates
            .iter()
            .map(|&r| model.rain_loss(r, 35.0, &ground(), 14e9).unwrap())
            .collect();
        assert!(losses.windows(2).all(|w| w[1] > w[0]), "{:?}", losses);
    }

    #[test]
    fn rain_loss_grows_with_frequency() {
        let model = AnalyticPropagation::new();
        let ku = model.rain_loss(20.0, 35.0, &ground(), 12e9).unwrap();
        let ka = model.rain_loss(20.0, 35.0, &ground(), 30e9).unwrap();
        assert!(ka > ku);
    }

    #[test]
    fn gas_loss_is_small_and_positive_at_ku() {
        let model = AnalyticPropagation::new();
        let atmosphere = AtmosphereSample {
            temperature_k: 290.0,
            water_vapor_density: 7.5,
            pressure_hpa: 1013.25,
        };
        let loss = model.gas_loss(12e9, 30.0, &atmosphere).unwrap();
        assert!(loss > 0.0 && loss < 1.0, "loss {}", loss);
    }

    #[test]
    fn invalid_frequency_is_rejected() {
        let model = AnalyticPropagation::new();
        assert!(matches!(
            model.free_space_loss(0.0, 1000.0),
            Err(ProviderError::InvalidInput(_))
        ));
    }

    #[test]
    fn pointing_loss_uses_two_tiers() {
        let model = AnalyticPropagation::new();
        assert_eq!(model.pointing_loss(45.0).unwrap(), 0.1);
        assert_eq!(model.pointing_loss(10.0).unwrap(), 0.5);
    }
}
