use anyhow::Context;
use linkcore::prelude::EngineConfig;
use linkcore::providers::FixedPropagation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Constant per-term losses for calibrated what-if runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedLosses {
    pub free_space_db: f64,
    pub rain_db_per_mm_hr: f64,
    pub gas_db: f64,
    pub cloud_db: f64,
    pub pointing_db: Option<f64>,
}

impl Default for FixedLosses {
    fn default() -> Self {
        let fixed = FixedPropagation::default();
        Self {
            free_space_db: fixed.free_space_db,
            rain_db_per_mm_hr: fixed.rain_db_per_mm_hr,
            gas_db: fixed.gas_db,
            cloud_db: fixed.cloud_db,
            pointing_db: fixed.pointing_db,
        }
    }
}

impl From<&FixedLosses> for FixedPropagation {
    fn from(losses: &FixedLosses) -> Self {
        Self {
            free_space_db: losses.free_space_db,
            rain_db_per_mm_hr: losses.rain_db_per_mm_hr,
            gas_db: losses.gas_db,
            cloud_db: losses.cloud_db,
            pointing_db: losses.pointing_db,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PropagationChoice {
    #[default]
    Analytic,
    Fixed(FixedLosses),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub engine: EngineConfig,
    pub propagation: PropagationChoice,
    /// Summary lines are appended here when set.
    pub report_path: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(report_path: Option<PathBuf>) -> Self {
        Self {
            report_path,
            ..Default::default()
        }
    }
}

/// Reads a request or sweep document; `.json` files go through serde_json,
/// everything else through serde_yaml.
pub fn load_document<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<T> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading {}", path_ref.display()))?;
    let is_json = path_ref
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path_ref.display()))
    } else {
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path_ref.display()))
    }
}
