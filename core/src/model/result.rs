use serde::{Deserialize, Serialize};

use super::params::Direction;

/// Individual propagation loss terms for one direction, all in dB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub free_space_db: f64,
    pub rain_db: f64,
    pub gas_db: f64,
    pub cloud_db: f64,
    pub pointing_db: f64,
}

impl LossBreakdown {
    pub fn total_db(&self) -> f64 {
        self.free_space_db + self.rain_db + self.gas_db + self.cloud_db + self.pointing_db
    }
}

/// Per-direction outcome of a calculation.
///
/// Values are finalized through the consuming `with_*` updates; every update
/// yields a new result rather than editing one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub direction: Direction,
    pub fspl_db: f64,
    pub rain_loss_db: f64,
    pub gas_loss_db: f64,
    pub cloud_loss_db: f64,
    pub atm_loss_db: f64,
    pub antenna_pointing_loss_db: f64,
    pub eirp_dbw: f64,
    pub gt_db_per_k: f64,
    pub bandwidth_hz: f64,
    pub elevation_deg: f64,
    /// C/N after every applied impairment, i.e. C/(N+I+IM).
    pub cn_db: f64,
    pub cn0_dbhz: f64,
    /// Thermal-only C/N before impairments.
    pub clean_cn_db: f64,
    pub clean_cn0_dbhz: f64,
    pub cni_db: Option<f64>,
    pub cni0_dbhz: Option<f64>,
    pub c_im_db: Option<f64>,
    pub link_margin_db: Option<f64>,
    pub clean_link_margin_db: Option<f64>,
    pub modcod_selected: Option<String>,
    pub interference_applied: bool,
    pub intermod_applied: bool,
    pub warnings: Vec<String>,
}

impl CalculationResult {
    /// Builds the thermal result; the placeholder margin is C/N against a
    /// 0 dB requirement until a ModCod is selected.
    #[allow(clippy::too_many_arguments)]
    pub fn thermal(
        direction: Direction,
        losses: LossBreakdown,
        eirp_dbw: f64,
        gt_db_per_k: f64,
        bandwidth_hz: f64,
        elevation_deg: f64,
        cn0_dbhz: f64,
        cn_db: f64,
    ) -> Self {
        Self {
            direction,
            fspl_db: losses.free_space_db,
            rain_loss_db: losses.rain_db,
            gas_loss_db: losses.gas_db,
            cloud_loss_db: losses.cloud_db,
            atm_loss_db: losses.total_db(),
            antenna_pointing_loss_db: losses.pointing_db,
            eirp_dbw,
            gt_db_per_k,
            bandwidth_hz,
            elevation_deg,
            cn_db,
            cn0_dbhz,
            clean_cn_db: cn_db,
            clean_cn0_dbhz: cn0_dbhz,
            cni_db: None,
            cni0_dbhz: None,
            c_im_db: None,
            link_margin_db: Some(cn_db),
            clean_link_margin_db: None,
            modcod_selected: None,
            interference_applied: false,
            intermod_applied: false,
            warnings: Vec::new(),
        }
    }

    pub fn with_modcod(self, modcod_id: Option<String>) -> Self {
        Self {
            modcod_selected: modcod_id.or(self.modcod_selected.clone()),
            ..self
        }
    }

    /// Sets the impaired margin and derives the clean margin from the
    /// C/N removed by impairments.
    pub fn with_link_margin(self, margin_db: f64) -> Self {
        let degradation = self.clean_cn_db - self.cn_db;
        Self {
            link_margin_db: Some(margin_db),
            clean_link_margin_db: Some(margin_db + degradation),
            ..self
        }
    }

    /// C/N lost to interference and intermodulation.
    pub fn impairment_degradation_db(&self) -> f64 {
        self.clean_cn_db - self.cn_db
    }
}
