use serde::{Deserialize, Serialize};

use super::request::CalculationRequest;
use super::strategy::StrategySnapshot;
use crate::prelude::{LinkError, LinkResult};

/// A sweepable request field with its physical bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepableParameter {
    pub path: &'static str,
    pub label: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

const fn param(
    path: &'static str,
    label: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> SweepableParameter {
    SweepableParameter {
        path,
        label,
        min,
        max,
    }
}

pub const SWEEPABLE_PARAMETERS: &[SweepableParameter] = &[
    param("runtime.uplink.rain_rate_mm_per_hr", "Uplink Rain Rate (mm/hr)", Some(0.0), None),
    param("runtime.downlink.rain_rate_mm_per_hr", "Downlink Rain Rate (mm/hr)", Some(0.0), None),
    param("runtime.uplink.frequency_hz", "Uplink Frequency (Hz)", Some(1e6), None),
    param("runtime.downlink.frequency_hz", "Downlink Frequency (Hz)", Some(1e6), None),
    param("runtime.bandwidth_hz", "Channel Bandwidth (Hz)", Some(1e3), None),
    param("runtime.uplink.bandwidth_hz", "Uplink Bandwidth (Hz)", Some(1e3), None),
    param("runtime.downlink.bandwidth_hz", "Downlink Bandwidth (Hz)", Some(1e3), None),
    param("runtime.uplink.elevation_deg", "Uplink Elevation (deg)", Some(0.0), Some(90.0)),
    param("runtime.downlink.elevation_deg", "Downlink Elevation (deg)", Some(0.0), Some(90.0)),
    param("runtime.uplink.ground_lat_deg", "Uplink Ground Latitude (deg)", Some(-90.0), Some(90.0)),
    param("runtime.downlink.ground_lat_deg", "Downlink Ground Latitude (deg)", Some(-90.0), Some(90.0)),
    param("runtime.sat_longitude_deg", "Satellite Longitude (deg)", Some(-180.0), Some(180.0)),
    param("overrides.satellite.eirp_dbw", "Satellite EIRP (dBW)", None, None),
    param("overrides.satellite.gt_db_per_k", "Satellite G/T (dB/K)", None, None),
];

pub fn sweepable(path: &str) -> Option<&'static SweepableParameter> {
    SWEEPABLE_PARAMETERS.iter().find(|p| p.path == path)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub parameter_path: String,
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

impl SweepConfig {
    /// Checks the allow-list, step count and declared bounds.
    pub fn validate(&self, max_steps: usize) -> LinkResult<&'static SweepableParameter> {
        let parameter = sweepable(&self.parameter_path).ok_or_else(|| {
            let allowed: Vec<&str> = SWEEPABLE_PARAMETERS.iter().map(|p| p.path).collect();
            LinkError::validation(format!(
                "unsupported sweep parameter: {}. Allowed: {:?}",
                self.parameter_path, allowed
            ))
        })?;
        if self.steps < 2 || self.steps > max_steps {
            return Err(LinkError::validation(format!(
                "steps must be between 2 and {} (got {})",
                max_steps, self.steps
            )));
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(LinkError::validation("start and end must be finite"));
        }
        if self.start == self.end {
            return Err(LinkError::validation("start and end must differ"));
        }
        for (name, value) in [("start", self.start), ("end", self.end)] {
            if let Some(min) = parameter.min.filter(|min| value < *min) {
                return Err(LinkError::validation(format!(
                    "{} ({}) is below minimum ({}) for {}",
                    name, value, min, parameter.label
                )));
            }
            if let Some(max) = parameter.max.filter(|max| value > *max) {
                return Err(LinkError::validation(format!(
                    "{} ({}) exceeds maximum ({}) for {}",
                    name, value, max, parameter.label
                )));
            }
        }
        Ok(parameter)
    }
}

fn default_threshold() -> Option<f64> {
    Some(3.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub base_request: CalculationRequest,
    pub sweep: SweepConfig,
    #[serde(default = "default_threshold")]
    pub threshold_db: Option<f64>,
}

/// Plot-oriented subset of one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub sweep_value: f64,
    pub combined_link_margin_db: Option<f64>,
    pub combined_cn_db: Option<f64>,
    pub combined_cn0_dbhz: Option<f64>,
    pub uplink_cn_db: Option<f64>,
    pub uplink_rain_loss_db: Option<f64>,
    pub uplink_link_margin_db: Option<f64>,
    pub downlink_cn_db: Option<f64>,
    pub downlink_rain_loss_db: Option<f64>,
    pub downlink_link_margin_db: Option<f64>,
    pub modcod_id: Option<String>,
    pub modcod_label: Option<String>,
    pub viable: bool,
    pub warnings: Vec<String>,
}

impl SweepPoint {
    pub fn failed(sweep_value: f64, message: String) -> Self {
        Self {
            sweep_value,
            viable: false,
            warnings: vec![message],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResponse {
    pub sweep_parameter: String,
    pub sweep_label: String,
    pub threshold_db: Option<f64>,
    pub points: Vec<SweepPoint>,
    pub crossover_value: Option<f64>,
    pub strategy: StrategySnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str, start: f64, end: f64, steps: usize) -> SweepConfig {
        SweepConfig {
            parameter_path: path.to_string(),
            start,
            end,
            steps,
        }
    }

    #[test]
    fn rejects_unknown_path() {
        let err = config("runtime.uplink.eirp", 0.0, 1.0, 3)
            .validate(200)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported sweep parameter"));
    }

    #[test]
    fn enforces_elevation_bounds() {
        let err = config("runtime.uplink.elevation_deg", 10.0, 95.0, 3)
            .validate(200)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
        assert!(config("runtime.uplink.elevation_deg", 10.0, 90.0, 3)
            .validate(200)
            .is_ok());
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(config("runtime.uplink.rain_rate_mm_per_hr", 5.0, 5.0, 3)
            .validate(200)
            .is_err());
        assert!(config("runtime.uplink.rain_rate_mm_per_hr", 0.0, 5.0, 1)
            .validate(200)
            .is_err());
        assert!(config("runtime.uplink.rain_rate_mm_per_hr", 0.0, 5.0, 201)
            .validate(200)
            .is_err());
        assert!(config("runtime.uplink.rain_rate_mm_per_hr", -1.0, 5.0, 3)
            .validate(200)
            .is_err());
    }

    #[test]
    fn threshold_defaults_when_omitted() {
        let request: SweepRequest = serde_json::from_str(
            r#"{"base_request": {}, "sweep": {"parameter_path": "runtime.bandwidth_hz",
                "start": 1e6, "end": 5e6, "steps": 3}}"#,
        )
        .unwrap();
        assert_eq!(request.threshold_db, Some(3.0));
    }
}
