use anyhow::Context;
use clap::Parser;
use generator::scenario::{build_demo_request, GeneratorConfig};
use linkcore::model::{CalculationRequest, SweepRequest};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::{load_document, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Satellite link budget driver")]
struct Args {
    /// Calculation request document (JSON or YAML)
    #[arg(long, conflicts_with_all = ["sweep", "demo"])]
    request: Option<PathBuf>,
    /// Sweep request document (JSON or YAML)
    #[arg(long, conflicts_with = "demo")]
    sweep: Option<PathBuf>,
    /// Run the built-in Ku-band GEO scenario
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Evaluate sweep points on a worker pool
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Append a one-line summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print the full response as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = match &args.workflow {
        Some(path) => {
            let mut config = WorkflowConfig::load(path)?;
            if args.report.is_some() {
                config.report_path = args.report.clone();
            }
            config
        }
        None => WorkflowConfig::from_args(args.report.clone()),
    };
    let runner = Runner::new(workflow_config);

    let (body, summary) = if let Some(path) = &args.sweep {
        let request: SweepRequest = load_document(path)?;
        let response = if args.parallel {
            let runtime = TokioBuilder::new_multi_thread()
                .enable_all()
                .build()
                .context("creating runtime for parallel sweep")?;
            runtime.block_on(runner.sweep_parallel(&request))?
        } else {
            runner.sweep(&request)?
        };
        (
            serde_json::to_string_pretty(&response)?,
            report::summarize_sweep(&response),
        )
    } else {
        let request: CalculationRequest = match &args.request {
            Some(path) => load_document(path)?,
            None if args.demo => build_demo_request(&GeneratorConfig::default()),
            None => anyhow::bail!("nothing to run: pass --request, --sweep or --demo"),
        };
        let response = runner.calculate(&request)?;
        (
            serde_json::to_string_pretty(&response)?,
            report::summarize_calculation(&response),
        )
    };

    if args.json {
        println!("{}", body);
    } else {
        println!("{}", summary);
    }

    if let Some(path) = &runner.config().report_path {
        report::append_report(path, &summary)?;
    }

    Ok(())
}
