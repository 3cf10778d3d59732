use crate::workflow::config::{PropagationChoice, WorkflowConfig};
use anyhow::Context;
use linkcore::model::{CalculationRequest, CalculationResponse, SweepRequest, SweepResponse};
use linkcore::processing::{CalculationService, SweepEngine};
use linkcore::providers::{
    AnalyticPropagation, FixedPropagation, PropagationProvider, SphericalGeometry,
};
use log::info;
use std::sync::Arc;

/// Builds the engine once from the workflow config and runs requests on it.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    service: CalculationService,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let propagation: Arc<dyn PropagationProvider> = match &config.propagation {
            PropagationChoice::Analytic => Arc::new(AnalyticPropagation::new()),
            PropagationChoice::Fixed(losses) => Arc::new(FixedPropagation::from(losses)),
        };
        let service = CalculationService::new(
            propagation,
            Arc::new(SphericalGeometry::new()),
            config.engine.clone(),
        );
        Self { config, service }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn calculate(&self, request: &CalculationRequest) -> anyhow::Result<CalculationResponse> {
        let response = self
            .service
            .calculate(request)
            .context("running link budget calculation")?;
        info!(
            "calculation complete: system margin {:?} dB",
            response.system_link_margin_db
        );
        Ok(response)
    }

    pub fn sweep(&self, request: &SweepRequest) -> anyhow::Result<SweepResponse> {
        SweepEngine::from_service(&self.service)
            .execute(request)
            .with_context(|| format!("sweeping {}", request.sweep.parameter_path))
    }

    pub async fn sweep_parallel(&self, request: &SweepRequest) -> anyhow::Result<SweepResponse> {
        SweepEngine::from_service(&self.service)
            .execute_concurrent(request)
            .await
            .with_context(|| format!("sweeping {} concurrently", request.sweep.parameter_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::scenario::{build_demo_request, GeneratorConfig};
    use crate::workflow::config::FixedLosses;
    use linkcore::model::SweepConfig;

    fn fixed_runner() -> Runner {
        Runner::new(WorkflowConfig {
            propagation: PropagationChoice::Fixed(FixedLosses::default()),
            ..Default::default()
        })
    }

    #[test]
    fn runner_calculates_demo_scenario() {
        let runner = Runner::new(WorkflowConfig::default());
        let request = build_demo_request(&GeneratorConfig::default());
        let response = runner.calculate(&request).unwrap();
        assert!(response.combined_link_margin_db.is_some());
        assert!(response.results.uplink.fspl_db > 200.0);
    }

    #[test]
    fn runner_reports_validation_context() {
        let runner = fixed_runner();
        let mut request = build_demo_request(&GeneratorConfig::default());
        request.modcod_table = None;
        let err = runner.calculate(&request).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("running link budget calculation"));
        assert!(message.contains("modcod_table"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn parallel_sweep_keeps_value_order() {
        let runner = fixed_runner();
        let request = SweepRequest {
            base_request: build_demo_request(&GeneratorConfig::default()),
            sweep: SweepConfig {
                parameter_path: "runtime.downlink.rain_rate_mm_per_hr".into(),
                start: 0.0,
                end: 40.0,
                steps: 5,
            },
            threshold_db: Some(3.0),
        };
        let response = runner.sweep_parallel(&request).await.unwrap();
        let values: Vec<f64> = response.points.iter().map(|p| p.sweep_value).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(response.points, runner.sweep(&request).unwrap().points);
    }
}
