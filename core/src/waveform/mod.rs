//! ModCod tables and selection rules for each waveform family.

pub mod spectral;
pub mod table;

use std::cmp::Ordering;

use crate::math::hz_to_db;
use crate::model::{ModcodEntry, ModcodSummary, RawModcodEntry, WaveformFamily};
use crate::prelude::{EngineConfig, LinkError, LinkResult};

pub use spectral::SpectralModel;

/// Outcome of a margin-aware selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ModcodDecision {
    pub entry: ModcodEntry,
    pub available_ebno_db: Option<f64>,
    pub required_ebno_db: Option<f64>,
    pub margin_db: Option<f64>,
    pub bitrate_bps: Option<f64>,
}

/// A validated ModCod table bound to one waveform family.
///
/// Built fresh for every calculation so no selection state survives between
/// requests or sweep points.
#[derive(Debug, Clone)]
pub struct WaveformStrategy {
    family: WaveformFamily,
    model: SpectralModel,
    entries: Vec<ModcodEntry>,
}

impl WaveformStrategy {
    pub fn new(
        family: WaveformFamily,
        entries: Vec<ModcodEntry>,
        config: &EngineConfig,
    ) -> LinkResult<Self> {
        if entries.is_empty() {
            return Err(LinkError::configuration("ModCod table has no entries"));
        }
        entries.iter().try_for_each(table::validate_entry)?;
        Ok(Self {
            family,
            model: SpectralModel::for_family(family, config),
            entries,
        })
    }

    pub fn from_raw(
        family: WaveformFamily,
        raw: &[RawModcodEntry],
        config: &EngineConfig,
    ) -> LinkResult<Self> {
        Self::new(family, table::entries_from_raw(raw)?, config)
    }

    pub fn default_dvbs2x(config: &EngineConfig) -> Self {
        Self {
            family: WaveformFamily::DvbS2x,
            model: SpectralModel::for_family(WaveformFamily::DvbS2x, config),
            entries: table::default_dvbs2x_entries(),
        }
    }

    pub fn family(&self) -> WaveformFamily {
        self.family
    }

    pub fn entries(&self) -> &[ModcodEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&ModcodEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in ascending threshold order; ties keep table order.
    fn sorted_entries(&self) -> Vec<&ModcodEntry> {
        let mut sorted: Vec<&ModcodEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.threshold()
                .partial_cmp(&b.threshold())
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    pub fn effective_spectral_efficiency(&self, entry: &ModcodEntry, rolloff: Option<f64>) -> f64 {
        self.model.efficiency(entry, rolloff)
    }

    /// Efficiency of the highest-order entry at the family default.
    pub fn spectral_efficiency(&self) -> f64 {
        let default = Some(self.model.default_factor());
        self.sorted_entries()
            .last()
            .map(|entry| self.effective_spectral_efficiency(entry, default))
            .unwrap_or(0.0)
    }

    fn bitrate_bps(
        &self,
        entry: &ModcodEntry,
        bandwidth_hz: Option<f64>,
        rolloff: Option<f64>,
    ) -> Option<f64> {
        bandwidth_hz.map(|bw| (bw * self.effective_spectral_efficiency(entry, rolloff)).max(1.0))
    }

    /// Required Eb/N0 at the given bitrate, from the C/N0 threshold when
    /// present, else the native Eb/N0 threshold.
    fn required_ebno_db(entry: &ModcodEntry, bitrate_bps: f64) -> Option<f64> {
        entry
            .required_cn0_dbhz
            .map(|cn0| cn0 - hz_to_db(bitrate_bps))
            .or(entry.required_ebno_db)
    }

    /// Highest-order entry that clears its threshold, falling back to the
    /// lowest-order entry when none does.
    pub fn select_modcod(
        &self,
        cn0_dbhz: f64,
        bandwidth_hz: Option<f64>,
        rolloff: Option<f64>,
    ) -> Option<&ModcodEntry> {
        let sorted = self.sorted_entries();
        let mut selected = None;
        for entry in sorted.iter().copied() {
            let satisfied = match self.bitrate_bps(entry, bandwidth_hz, rolloff) {
                Some(bitrate) => {
                    let available = cn0_dbhz - hz_to_db(bitrate);
                    match Self::required_ebno_db(entry, bitrate) {
                        Some(required) => available >= required,
                        None => continue,
                    }
                }
                None => entry
                    .required_cn0_dbhz
                    .is_some_and(|required| cn0_dbhz >= required),
            };
            if satisfied {
                selected = Some(entry);
            }
        }
        selected.or_else(|| sorted.first().copied())
    }

    /// Selection plus Eb/N0 bookkeeping at the entry's bitrate.
    ///
    /// Without a bandwidth there is no bitrate, so the Eb/N0 fields are
    /// `None` and the margin is taken in the C/N0 domain against the entry's
    /// C/N0 threshold (still `None` for Eb/N0-only entries).
    pub fn select_modcod_with_margin(
        &self,
        cn0_dbhz: f64,
        bandwidth_hz: Option<f64>,
        rolloff: Option<f64>,
    ) -> Option<ModcodDecision> {
        let entry = self.select_modcod(cn0_dbhz, bandwidth_hz, rolloff)?;
        let Some(bitrate) = self.bitrate_bps(entry, bandwidth_hz, rolloff) else {
            // Without a bitrate only a C/N0 comparison is possible.
            return Some(ModcodDecision {
                entry: entry.clone(),
                available_ebno_db: None,
                required_ebno_db: None,
                margin_db: entry.required_cn0_dbhz.map(|required| cn0_dbhz - required),
                bitrate_bps: None,
            });
        };

        let available = cn0_dbhz - hz_to_db(bitrate);
        let required = Self::required_ebno_db(entry, bitrate);
        Some(ModcodDecision {
            entry: entry.clone(),
            available_ebno_db: Some(available),
            required_ebno_db: required,
            margin_db: required.map(|required| available - required),
            bitrate_bps: Some(bitrate),
        })
    }

    pub fn summarize(&self, entry: &ModcodEntry, rolloff: Option<f64>) -> ModcodSummary {
        ModcodSummary {
            id: entry.id.clone(),
            modulation: entry.modulation.clone(),
            code_rate: entry.code_rate.clone(),
            required_ebno_db: entry.required_ebno_db,
            required_cn0_dbhz: entry.required_cn0_dbhz,
            info_bits_per_symbol: entry.info_bits_per_symbol,
            effective_spectral_efficiency: self.effective_spectral_efficiency(entry, rolloff),
            rolloff: entry.rolloff,
            pilots: entry.pilots,
        }
    }

    pub fn raw_entries(&self) -> Vec<RawModcodEntry> {
        self.entries.iter().map(RawModcodEntry::from).collect()
    }
}
