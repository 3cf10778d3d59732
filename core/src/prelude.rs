use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;

/// Global fallback constants shared by every engine component.
///
/// Passed explicitly into the waveform strategy, communication strategy,
/// combiner and sweep engine instead of living as module state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_rolloff: f64,
    pub default_overhead: f64,
    pub default_rain_rate_mm_per_hr: f64,
    pub default_uplink_temperature_k: f64,
    pub default_downlink_temperature_k: f64,
    pub default_pressure_hpa: f64,
    pub default_water_vapor_density: f64,
    /// Exceedance probability (%) handed to the cloud model.
    pub cloud_availability_p: f64,
    pub geo_altitude_km: f64,
    /// Boltzmann constant in dBW/K/Hz.
    pub boltzmann_dbw: f64,
    pub max_sweep_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_rolloff: 0.2,
            default_overhead: 0.14,
            default_rain_rate_mm_per_hr: 0.0,
            default_uplink_temperature_k: 290.0,
            default_downlink_temperature_k: 120.0,
            default_pressure_hpa: 1013.25,
            default_water_vapor_density: 7.5,
            cloud_availability_p: 0.01,
            geo_altitude_km: 35_786.0,
            boltzmann_dbw: -228.6,
            max_sweep_steps: 200,
        }
    }
}

/// Common error type for link budget evaluation.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    /// Bad ModCod table or engine configuration, detected at construction.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Request rejected before any collaborator was called.
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("collaborator failure: {0}")]
    Provider(#[from] ProviderError),
    #[error("computation failure: {0}")]
    Computation(String),
}

impl LinkError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// HTTP-style status class for callers that expose the engine over a wire.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Provider(ProviderError::InvalidInput(_)) => 400,
            Self::Provider(_) => 502,
            Self::Computation(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type LinkResult<T> = Result<T, LinkError>;

/// Rejects NaN and infinities so they never leak into a finalized result.
pub fn ensure_finite(label: &str, value: f64) -> LinkResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LinkError::Computation(format!(
            "non-finite {} ({}); check geometry and elevation",
            label, value
        )))
    }
}
