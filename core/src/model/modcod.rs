use serde::{Deserialize, Serialize};

use super::strategy::WaveformFamily;

/// Number or numeric text as found in hand-edited tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Number(f64),
    Text(String),
}

impl LooseValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseValue::Number(value) => Some(*value),
            LooseValue::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            LooseValue::Number(value) => value.to_string(),
            LooseValue::Text(text) => text.clone(),
        }
    }
}

/// Loosely typed ModCod row; unknown keys are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawModcodEntry {
    pub id: String,
    pub modulation: Option<String>,
    pub code_rate: Option<LooseValue>,
    pub required_cn0_dbhz: Option<LooseValue>,
    pub required_ebno_db: Option<LooseValue>,
    pub info_bits_per_symbol: Option<LooseValue>,
    pub rolloff: Option<LooseValue>,
    pub pilots: Option<bool>,
}

/// Validated ModCod row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModcodEntry {
    pub id: String,
    pub modulation: String,
    pub code_rate: String,
    pub required_cn0_dbhz: Option<f64>,
    pub required_ebno_db: Option<f64>,
    /// Information bits per symbol, independent of roll-off.
    pub info_bits_per_symbol: f64,
    /// Per-entry roll-off (DVB-S2X) or overhead fraction (5G NR).
    pub rolloff: Option<f64>,
    pub pilots: Option<bool>,
}

impl ModcodEntry {
    pub fn with_cn0(
        id: &str,
        modulation: &str,
        code_rate: &str,
        required_cn0_dbhz: f64,
        info_bits_per_symbol: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            modulation: modulation.to_string(),
            code_rate: code_rate.to_string(),
            required_cn0_dbhz: Some(required_cn0_dbhz),
            required_ebno_db: None,
            info_bits_per_symbol,
            rolloff: None,
            pilots: None,
        }
    }

    pub fn with_ebno(
        id: &str,
        modulation: &str,
        code_rate: &str,
        required_ebno_db: f64,
        info_bits_per_symbol: f64,
    ) -> Self {
        Self {
            required_cn0_dbhz: None,
            required_ebno_db: Some(required_ebno_db),
            ..Self::with_cn0(id, modulation, code_rate, 0.0, info_bits_per_symbol)
        }
    }

    /// Sort key: C/N0 threshold if present, else Eb/N0, else +inf.
    pub fn threshold(&self) -> f64 {
        self.required_cn0_dbhz
            .or(self.required_ebno_db)
            .unwrap_or(f64::INFINITY)
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.modulation, self.code_rate)
            .trim()
            .to_string()
    }
}

impl From<&ModcodEntry> for RawModcodEntry {
    fn from(entry: &ModcodEntry) -> Self {
        Self {
            id: entry.id.clone(),
            modulation: Some(entry.modulation.clone()),
            code_rate: Some(LooseValue::Text(entry.code_rate.clone())),
            required_cn0_dbhz: entry.required_cn0_dbhz.map(LooseValue::Number),
            required_ebno_db: entry.required_ebno_db.map(LooseValue::Number),
            info_bits_per_symbol: Some(LooseValue::Number(entry.info_bits_per_symbol)),
            rolloff: entry.rolloff.map(LooseValue::Number),
            pilots: entry.pilots,
        }
    }
}

/// A named ModCod table as supplied by the asset store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModcodTableInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    /// Overrides the request's waveform family when set.
    pub waveform: Option<WaveformFamily>,
    pub entries: Vec<RawModcodEntry>,
}

/// Selected entry as reported back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModcodSummary {
    pub id: String,
    pub modulation: String,
    pub code_rate: String,
    pub required_ebno_db: Option<f64>,
    pub required_cn0_dbhz: Option<f64>,
    pub info_bits_per_symbol: f64,
    pub effective_spectral_efficiency: f64,
    pub rolloff: Option<f64>,
    pub pilots: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_values_parse_numbers_and_text() {
        assert_eq!(LooseValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(LooseValue::Text(" 70.5 ".into()).as_f64(), Some(70.5));
        assert_eq!(LooseValue::Text("n/a".into()).as_f64(), None);
    }

    #[test]
    fn raw_entry_ignores_unknown_fields() {
        let raw: RawModcodEntry = serde_json::from_str(
            r#"{"id": "qpsk-1/2", "modulation": "QPSK", "code_rate": "1/2",
                "required_cn0_dbhz": "70", "vendor_notes": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(raw.required_cn0_dbhz.and_then(|v| v.as_f64()), Some(70.0));
    }

    #[test]
    fn threshold_prefers_cn0() {
        let mut entry = ModcodEntry::with_cn0("a", "QPSK", "1/2", 70.0, 1.0);
        entry.required_ebno_db = Some(1.0);
        assert_eq!(entry.threshold(), 70.0);
        entry.required_cn0_dbhz = None;
        assert_eq!(entry.threshold(), 1.0);
        entry.required_ebno_db = None;
        assert!(entry.threshold().is_infinite());
    }
}
