use serde::{Deserialize, Serialize};

/// Closed set of waveform families; they differ only in the
/// spectral-efficiency formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaveformFamily {
    /// Single-carrier with raised-cosine filtering.
    #[default]
    #[serde(rename = "DVB_S2X")]
    DvbS2x,
    /// OFDM with CP/DMRS/guard framing overhead.
    #[serde(rename = "5G_NR")]
    Nr,
}

impl WaveformFamily {
    pub fn label(&self) -> &'static str {
        match self {
            WaveformFamily::DvbS2x => "DVB_S2X",
            WaveformFamily::Nr => "5G_NR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransponderType {
    /// Bent-pipe relay: one end-to-end signal, one ModCod decision.
    #[default]
    Transparent,
    /// Demodulate and remodulate: two independent links.
    Regenerative,
}

/// Strategy echo attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub waveform_strategy: WaveformFamily,
    pub transponder_type: TransponderType,
}
