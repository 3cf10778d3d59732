use serde::{Deserialize, Serialize};

/// Where a resolved EIRP or G/T figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Override,
    Derived,
    Stored,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub value: f64,
    pub source: ValueSource,
}

/// Resolved transmitter EIRP and receiver G/T for both directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunicationContext {
    pub uplink_tx_eirp_dbw: ResolvedValue,
    pub uplink_rx_gt_db_per_k: ResolvedValue,
    pub downlink_tx_eirp_dbw: ResolvedValue,
    pub downlink_rx_gt_db_per_k: ResolvedValue,
}

impl CommunicationContext {
    /// Context with every value taken as an explicit override.
    pub fn explicit(uplink_eirp: f64, uplink_gt: f64, downlink_eirp: f64, downlink_gt: f64) -> Self {
        let pin = |value| ResolvedValue {
            value,
            source: ValueSource::Override,
        };
        Self {
            uplink_tx_eirp_dbw: pin(uplink_eirp),
            uplink_rx_gt_db_per_k: pin(uplink_gt),
            downlink_tx_eirp_dbw: pin(downlink_eirp),
            downlink_rx_gt_db_per_k: pin(downlink_gt),
        }
    }
}
