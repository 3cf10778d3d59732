use crate::model::{ModcodEntry, WaveformFamily};
use crate::prelude::EngineConfig;

/// Family-specific spectral-efficiency rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpectralModel {
    /// `bits / (1 + rolloff)`: raised-cosine filtering overhead.
    RaisedCosine { default_rolloff: f64 },
    /// `bits * (1 - overhead)`: OFDM framing overhead.
    OfdmOverhead { default_overhead: f64 },
}

impl SpectralModel {
    pub fn for_family(family: WaveformFamily, config: &EngineConfig) -> Self {
        match family {
            WaveformFamily::DvbS2x => SpectralModel::RaisedCosine {
                default_rolloff: config.default_rolloff,
            },
            WaveformFamily::Nr => SpectralModel::OfdmOverhead {
                default_overhead: config.default_overhead,
            },
        }
    }

    pub fn default_factor(&self) -> f64 {
        match *self {
            SpectralModel::RaisedCosine { default_rolloff } => default_rolloff,
            SpectralModel::OfdmOverhead { default_overhead } => default_overhead,
        }
    }

    /// Precedence: explicit argument, then the entry's own value, then the
    /// family default.
    pub fn resolve_factor(&self, entry: &ModcodEntry, explicit: Option<f64>) -> f64 {
        let factor = explicit
            .or(entry.rolloff)
            .unwrap_or_else(|| self.default_factor());
        match self {
            SpectralModel::RaisedCosine { .. } => factor.max(0.0),
            SpectralModel::OfdmOverhead { .. } => factor.clamp(0.0, 1.0),
        }
    }

    pub fn efficiency(&self, entry: &ModcodEntry, explicit: Option<f64>) -> f64 {
        let factor = self.resolve_factor(entry, explicit);
        match self {
            SpectralModel::RaisedCosine { .. } => entry.info_bits_per_symbol / (1.0 + factor),
            SpectralModel::OfdmOverhead { .. } => entry.info_bits_per_symbol * (1.0 - factor),
        }
    }
}
