//! Collaborator interfaces consumed by the engine, plus default
//! implementations.
//!
//! Every provider call returns a `ProviderResult`; a failure is surfaced to
//! the caller as a computation error and never replaced by a zero term.

pub mod fixed;
pub mod geometry;
pub mod propagation;

use chrono::{DateTime, Utc};

use crate::model::{GroundLocation, SatellitePosition, TwoLineElements};

pub use fixed::FixedPropagation;
pub use geometry::SphericalGeometry;
pub use propagation::AnalyticPropagation;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("orbit propagation failed: {0}")]
    Orbit(String),
    #[error("{model} model failed: {reason}")]
    Model { model: &'static str, reason: String },
    #[error("{0} returned a non-finite value")]
    NonFinite(&'static str),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Atmospheric state at the ground terminal used by the gaseous model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereSample {
    pub temperature_k: f64,
    pub water_vapor_density: f64,
    pub pressure_hpa: f64,
}

/// Scalar dB losses for one slant path.
pub trait PropagationProvider: Send + Sync {
    fn free_space_loss(&self, frequency_hz: f64, distance_km: f64) -> ProviderResult<f64>;

    fn rain_loss(
        &self,
        rain_rate_mm_per_hr: f64,
        elevation_deg: f64,
        ground: &GroundLocation,
        frequency_hz: f64,
    ) -> ProviderResult<f64>;

    fn gas_loss(
        &self,
        frequency_hz: f64,
        elevation_deg: f64,
        atmosphere: &AtmosphereSample,
    ) -> ProviderResult<f64>;

    fn cloud_loss(
        &self,
        ground: &GroundLocation,
        elevation_deg: f64,
        frequency_hz: f64,
        availability_p: f64,
    ) -> ProviderResult<f64>;

    /// Two-tier policy: 0.1 dB above 20° elevation, 0.5 dB otherwise.
    fn pointing_loss(&self, elevation_deg: f64) -> ProviderResult<f64> {
        Ok(if elevation_deg > 20.0 { 0.1 } else { 0.5 })
    }
}

/// Satellite position and look geometry.
pub trait GeometryProvider: Send + Sync {
    fn elevation(
        &self,
        satellite: &SatellitePosition,
        ground: &GroundLocation,
    ) -> ProviderResult<f64>;

    fn slant_range_km(
        &self,
        satellite: &SatellitePosition,
        ground: &GroundLocation,
    ) -> ProviderResult<f64>;

    fn propagate_orbit(
        &self,
        elements: &TwoLineElements,
        time: DateTime<Utc>,
    ) -> ProviderResult<SatellitePosition>;
}

pub(crate) fn finite(model: &'static str, value: f64) -> ProviderResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProviderError::NonFinite(model))
    }
}
