use anyhow::Context;
use linkcore::model::{CalculationResponse, SweepResponse};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

fn fmt_db(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

pub fn summarize_calculation(response: &CalculationResponse) -> String {
    let modcod = response
        .modcod_selected
        .as_ref()
        .and_then(|selection| selection.primary())
        .map_or_else(|| "none".to_string(), |summary| summary.id.clone());
    let warnings = response.results.uplink.warnings.len() + response.results.downlink.warnings.len();
    format!(
        "transponder={:?} uplink_cn={:.2} downlink_cn={:.2} impairment_loss={:.2} combined_cn={} system_margin={} modcod={} warnings={}",
        response.strategy.transponder_type,
        response.results.uplink.cn_db,
        response.results.downlink.cn_db,
        response.results.uplink.impairment_degradation_db()
            + response.results.downlink.impairment_degradation_db(),
        fmt_db(response.combined_cn_db),
        fmt_db(response.system_link_margin_db),
        modcod,
        warnings
    )
}

pub fn summarize_sweep(response: &SweepResponse) -> String {
    let viable = response.points.iter().filter(|point| point.viable).count();
    format!(
        "sweep={} points={} viable={} threshold={} crossover={}",
        response.sweep_parameter,
        response.points.len(),
        viable,
        fmt_db(response.threshold_db),
        fmt_db(response.crossover_value)
    )
}

/// Appends one line to the report file, creating parent directories.
pub fn append_report(path: &Path, line: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;
    writeln!(file, "{}", line)?;
    Ok(())
}
