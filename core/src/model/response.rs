use serde::{Deserialize, Serialize};

use super::modcod::ModcodSummary;
use super::params::RuntimeParameters;
use super::result::CalculationResult;
use super::snapshot::PayloadSnapshot;
use super::strategy::StrategySnapshot;

pub const SCHEMA_VERSION: &str = "1.1.0";

/// End-to-end figures for a transparent transponder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub cn_db: f64,
    pub cn0_dbhz: f64,
    pub cni_db: f64,
    pub cni0_dbhz: f64,
    pub c_im_db: Option<f64>,
    pub link_margin_db: Option<f64>,
    pub clean_cn_db: f64,
    pub clean_link_margin_db: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionResults {
    pub uplink: CalculationResult,
    pub downlink: CalculationResult,
    pub combined: Option<CombinedResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModcodSelection {
    /// One decision for the whole bent-pipe path.
    Shared(ModcodSummary),
    PerDirection {
        uplink: Option<ModcodSummary>,
        downlink: Option<ModcodSummary>,
    },
}

impl ModcodSelection {
    /// Identifier and "MODULATION rate" label of the governing entry.
    pub fn primary(&self) -> Option<&ModcodSummary> {
        match self {
            ModcodSelection::Shared(summary) => Some(summary),
            ModcodSelection::PerDirection { uplink, downlink } => {
                downlink.as_ref().or(uplink.as_ref())
            }
        }
    }
}

/// Resolved runtime as used by the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEcho {
    #[serde(flatten)]
    pub runtime: RuntimeParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth_hz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub schema_version: String,
    pub strategy: StrategySnapshot,
    pub results: DirectionResults,
    /// Transparent only; `None` for regenerative transponders.
    pub combined_link_margin_db: Option<f64>,
    /// Governing margin: combined for transparent, the weaker hop for
    /// regenerative.
    pub system_link_margin_db: Option<f64>,
    pub combined_cn_db: Option<f64>,
    pub combined_cn0_dbhz: Option<f64>,
    pub modcod_selected: Option<ModcodSelection>,
    pub runtime_echo: RuntimeEcho,
    pub payload_snapshot: Option<PayloadSnapshot>,
}
