//! One-parameter sweeps over a base calculation request.
//!
//! Every point rebuilds the request from JSON and runs a fresh
//! `CalculationService`, so nothing resolved for one point can leak into the
//! next. Point failures are recorded on the point and never abort the sweep.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinSet;

use super::calculation::CalculationService;
use crate::math::{first_crossing, linspace};
use crate::model::sweep::SweepableParameter;
use crate::model::{
    CalculationRequest, CalculationResponse, StrategySnapshot, SweepPoint, SweepRequest,
    SweepResponse,
};
use crate::prelude::{EngineConfig, LinkError, LinkResult};
use crate::providers::{GeometryProvider, PropagationProvider};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};

/// Everything a worker needs to evaluate one point in isolation.
#[derive(Clone)]
struct PointContext {
    propagation: Arc<dyn PropagationProvider>,
    geometry: Arc<dyn GeometryProvider>,
    config: EngineConfig,
    base: Arc<Value>,
    path: Arc<str>,
    threshold_db: Option<f64>,
}

impl PointContext {
    fn evaluate(&self, value: f64) -> LinkResult<SweepPoint> {
        let mut document = (*self.base).clone();
        set_path(&mut document, &self.path, value)?;
        let request: CalculationRequest = serde_json::from_value(document).map_err(|err| {
            LinkError::validation(format!("swept request is not valid: {}", err))
        })?;
        let service = CalculationService::new(
            Arc::clone(&self.propagation),
            Arc::clone(&self.geometry),
            self.config.clone(),
        );
        let response = service.calculate(&request)?;
        Ok(point_from_response(value, &response, self.threshold_db))
    }

    fn run(&self, value: f64, metrics: &MetricsRecorder, logger: &LogManager) -> SweepPoint {
        match self.evaluate(value) {
            Ok(point) => {
                metrics.record_evaluated();
                point
            }
            Err(err) => {
                metrics.record_failure();
                logger.warn(&format!("{} = {} failed: {}", self.path, value, err));
                SweepPoint::failed(value, err.to_string())
            }
        }
    }
}

/// Writes `value` at a dotted path, creating intermediate objects where the
/// document holds nothing (or null) yet.
pub fn set_path(document: &mut Value, path: &str, value: f64) -> LinkResult<()> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let leaf = parts
        .pop()
        .filter(|leaf| !leaf.is_empty())
        .ok_or_else(|| LinkError::validation(format!("invalid sweep path: {:?}", path)))?;

    let mut cursor = document;
    for part in parts {
        if cursor.is_null() {
            *cursor = Value::Object(Map::new());
        }
        let object = cursor.as_object_mut().ok_or_else(|| {
            LinkError::validation(format!("sweep path {} crosses a non-object at {}", path, part))
        })?;
        cursor = object
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if cursor.is_null() {
        *cursor = Value::Object(Map::new());
    }
    let object = cursor.as_object_mut().ok_or_else(|| {
        LinkError::validation(format!("sweep path {} does not end in an object", path))
    })?;
    object.insert(leaf.to_string(), Value::from(value));
    Ok(())
}

/// Viability uses the governing margin: combined for transparent
/// transponders, the weaker hop for regenerative ones.
fn point_from_response(
    value: f64,
    response: &CalculationResponse,
    threshold_db: Option<f64>,
) -> SweepPoint {
    let uplink = &response.results.uplink;
    let downlink = &response.results.downlink;
    let margin = response.system_link_margin_db;
    let viable = match (margin, threshold_db) {
        (Some(margin), Some(threshold)) => margin >= threshold,
        _ => true,
    };
    let primary = response
        .modcod_selected
        .as_ref()
        .and_then(|selection| selection.primary());

    let mut warnings = uplink.warnings.clone();
    warnings.extend(downlink.warnings.iter().cloned());

    SweepPoint {
        sweep_value: value,
        combined_link_margin_db: margin,
        combined_cn_db: response.combined_cn_db,
        combined_cn0_dbhz: response.combined_cn0_dbhz,
        uplink_cn_db: Some(uplink.cn_db),
        uplink_rain_loss_db: Some(uplink.rain_loss_db),
        uplink_link_margin_db: uplink.link_margin_db,
        downlink_cn_db: Some(downlink.cn_db),
        downlink_rain_loss_db: Some(downlink.rain_loss_db),
        downlink_link_margin_db: downlink.link_margin_db,
        modcod_id: primary.map(|summary| summary.id.clone()),
        modcod_label: primary
            .map(|summary| format!("{} {}", summary.modulation, summary.code_rate).trim().to_string()),
        viable,
        warnings,
    }
}

pub struct SweepEngine {
    propagation: Arc<dyn PropagationProvider>,
    geometry: Arc<dyn GeometryProvider>,
    config: EngineConfig,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl SweepEngine {
    pub fn new(
        propagation: Arc<dyn PropagationProvider>,
        geometry: Arc<dyn GeometryProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            propagation,
            geometry,
            config,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("sweep"),
        }
    }

    /// Shares the collaborators and constants of an existing service.
    pub fn from_service(service: &CalculationService) -> Self {
        Self::new(service.propagation(), service.geometry(), service.config().clone())
    }

    /// Points evaluated and failed over the engine's lifetime.
    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    fn prepare(
        &self,
        request: &SweepRequest,
    ) -> LinkResult<(&'static SweepableParameter, Vec<f64>, PointContext)> {
        let parameter = request.sweep.validate(self.config.max_sweep_steps)?;
        let values = linspace(request.sweep.start, request.sweep.end, request.sweep.steps);
        let base = serde_json::to_value(&request.base_request)
            .map_err(|err| LinkError::Computation(format!("cannot serialize base request: {}", err)))?;
        self.logger.record(&format!(
            "sweeping {} over [{}, {}] in {} steps",
            parameter.path, request.sweep.start, request.sweep.end, request.sweep.steps
        ));
        let context = PointContext {
            propagation: Arc::clone(&self.propagation),
            geometry: Arc::clone(&self.geometry),
            config: self.config.clone(),
            base: Arc::new(base),
            path: Arc::from(parameter.path),
            threshold_db: request.threshold_db,
        };
        Ok((parameter, values, context))
    }

    fn finish(
        &self,
        parameter: &SweepableParameter,
        request: &SweepRequest,
        points: Vec<SweepPoint>,
    ) -> SweepResponse {
        let crossover_value = request.threshold_db.and_then(|threshold| {
            let samples: Vec<(f64, Option<f64>)> = points
                .iter()
                .map(|point| (point.sweep_value, point.combined_link_margin_db))
                .collect();
            first_crossing(&samples, threshold)
        });
        let non_viable = points.iter().filter(|point| !point.viable).count();
        self.logger.record(&format!(
            "{} points, {} non-viable, crossover {:?}",
            points.len(),
            non_viable,
            crossover_value
        ));
        SweepResponse {
            sweep_parameter: parameter.path.to_string(),
            sweep_label: parameter.label.to_string(),
            threshold_db: request.threshold_db,
            points,
            crossover_value,
            strategy: StrategySnapshot {
                waveform_strategy: request.base_request.waveform_strategy,
                transponder_type: request.base_request.transponder_type,
            },
        }
    }

    /// Evaluates points in value order on the calling thread.
    pub fn execute(&self, request: &SweepRequest) -> LinkResult<SweepResponse> {
        let (parameter, values, context) = self.prepare(request)?;
        let points = values
            .into_iter()
            .map(|value| context.run(value, &self.metrics, &self.logger))
            .collect();
        Ok(self.finish(parameter, request, points))
    }

    /// Evaluates points on blocking tasks and re-sorts them by sweep value
    /// before interpolation. Dropping the future aborts tasks not yet started.
    pub async fn execute_concurrent(&self, request: &SweepRequest) -> LinkResult<SweepResponse> {
        let (parameter, values, context) = self.prepare(request)?;
        let mut tasks = JoinSet::new();
        for (index, value) in values.iter().copied().enumerate() {
            let context = context.clone();
            let metrics = Arc::clone(&self.metrics);
            let logger = self.logger;
            tasks.spawn_blocking(move || (index, context.run(value, &metrics, &logger)));
        }

        let mut indexed = Vec::with_capacity(values.len());
        while let Some(joined) = tasks.join_next().await {
            let entry = joined
                .map_err(|err| LinkError::Computation(format!("sweep worker failed: {}", err)))?;
            indexed.push(entry);
        }
        indexed.sort_by_key(|(index, _)| *index);
        let points = indexed.into_iter().map(|(_, point)| point).collect();
        Ok(self.finish(parameter, request, points))
    }
}
