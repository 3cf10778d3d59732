use super::{AtmosphereSample, PropagationProvider, ProviderResult};
use crate::model::GroundLocation;

/// Constant-loss provider for calibrated what-if runs.
///
/// Rain scales linearly with rain rate so that sweeps over rain still move.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPropagation {
    pub free_space_db: f64,
    pub rain_db_per_mm_hr: f64,
    pub gas_db: f64,
    pub cloud_db: f64,
    /// `None` keeps the two-tier elevation policy.
    pub pointing_db: Option<f64>,
}

impl Default for FixedPropagation {
    fn default() -> Self {
        Self {
            free_space_db: 205.0,
            rain_db_per_mm_hr: 0.1,
            gas_db: 0.2,
            cloud_db: 0.1,
            pointing_db: None,
        }
    }
}

impl PropagationProvider for FixedPropagation {
    fn free_space_loss(&self, _frequency_hz: f64, _distance_km: f64) -> ProviderResult<f64> {
        Ok(self.free_space_db)
    }

    fn rain_loss(
        &self,
        rain_rate_mm_per_hr: f64,
        _elevation_deg: f64,
        _ground: &GroundLocation,
        _frequency_hz: f64,
    ) -> ProviderResult<f64> {
        Ok(self.rain_db_per_mm_hr * rain_rate_mm_per_hr.max(0.0))
    }

    fn gas_loss(
        &self,
        _frequency_hz: f64,
        _elevation_deg: f64,
        _atmosphere: &AtmosphereSample,
    ) -> ProviderResult<f64> {
        Ok(self.gas_db)
    }

    fn cloud_loss(
        &self,
        _ground: &GroundLocation,
        _elevation_deg: f64,
        _frequency_hz: f64,
        _availability_p: f64,
    ) -> ProviderResult<f64> {
        Ok(self.cloud_db)
    }

    fn pointing_loss(&self, elevation_deg: f64) -> ProviderResult<f64> {
        match self.pointing_db {
            Some(loss) => Ok(loss),
            None => Ok(if elevation_deg > 20.0 { 0.1 } else { 0.5 }),
        }
    }
}
