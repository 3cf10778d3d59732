use crate::model::{ModcodEntry, RawModcodEntry};
use crate::prelude::{LinkError, LinkResult};

/// Parses "a/b" or decimal code rates.
pub fn parse_code_rate(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            if denominator == 0.0 {
                None
            } else {
                Some(numerator / denominator)
            }
        }
        None => text.parse().ok(),
    }
}

/// Coded bits per symbol for a modulation label.
///
/// Named aliases first, otherwise log2 of the first integer in the label
/// (8PSK, 16APSK, 64QAM, ...).
pub fn modulation_bits(label: &str) -> Option<f64> {
    let label = label.trim().to_uppercase();
    match label.as_str() {
        "" => return None,
        "BPSK" => return Some(1.0),
        "QPSK" | "OQPSK" => return Some(2.0),
        _ => {}
    }
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let order: u64 = digits.parse().ok()?;
    if order == 0 {
        None
    } else {
        Some((order as f64).log2())
    }
}

pub fn infer_info_bits_per_symbol(modulation: &str, code_rate: &str) -> Option<f64> {
    let bits = modulation_bits(modulation)? * parse_code_rate(code_rate)?;
    (bits > 0.0).then_some(bits)
}

/// Rejects entries that could never take part in a selection.
pub fn validate_entry(entry: &ModcodEntry) -> LinkResult<()> {
    if !(entry.info_bits_per_symbol > 0.0 && entry.info_bits_per_symbol.is_finite()) {
        return Err(LinkError::configuration(format!(
            "info_bits_per_symbol must be provided and positive for ModCod {}",
            entry.id
        )));
    }
    if entry.required_cn0_dbhz.is_none() && entry.required_ebno_db.is_none() {
        return Err(LinkError::configuration(format!(
            "ModCod {} needs required_cn0_dbhz or required_ebno_db",
            entry.id
        )));
    }
    Ok(())
}

/// Normalizes one loosely typed row, inferring bits per symbol when absent.
pub fn entry_from_raw(raw: &RawModcodEntry) -> LinkResult<ModcodEntry> {
    let modulation = raw.modulation.clone().unwrap_or_default();
    let code_rate = raw
        .code_rate
        .as_ref()
        .map(|value| value.as_text())
        .unwrap_or_default();

    let supplied_bits = raw
        .info_bits_per_symbol
        .as_ref()
        .and_then(|value| value.as_f64())
        .filter(|bits| *bits != 0.0);
    let info_bits_per_symbol = supplied_bits
        .or_else(|| infer_info_bits_per_symbol(&modulation, &code_rate))
        .unwrap_or(0.0);

    let entry = ModcodEntry {
        id: raw.id.clone(),
        modulation,
        code_rate,
        required_cn0_dbhz: raw.required_cn0_dbhz.as_ref().and_then(|v| v.as_f64()),
        required_ebno_db: raw.required_ebno_db.as_ref().and_then(|v| v.as_f64()),
        info_bits_per_symbol,
        rolloff: raw.rolloff.as_ref().and_then(|v| v.as_f64()),
        pilots: raw.pilots,
    };
    validate_entry(&entry)?;
    Ok(entry)
}

pub fn entries_from_raw(raw: &[RawModcodEntry]) -> LinkResult<Vec<ModcodEntry>> {
    raw.iter().map(entry_from_raw).collect()
}

/// Built-in DVB-S2X fallback used when a regenerative hop has no table.
pub fn default_dvbs2x_entries() -> Vec<ModcodEntry> {
    vec![
        ModcodEntry::with_cn0("qpsk-1/4", "QPSK", "1/4", 65.0, 0.5),
        ModcodEntry::with_cn0("qpsk-1/2", "QPSK", "1/2", 70.0, 1.0),
        ModcodEntry::with_cn0("8psk-3/4", "8PSK", "3/4", 78.0, 2.25),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LooseValue;

    #[test]
    fn code_rates_parse_fraction_and_decimal() {
        assert_eq!(parse_code_rate("3/4"), Some(0.75));
        assert_eq!(parse_code_rate(" 0.5 "), Some(0.5));
        assert_eq!(parse_code_rate("1/0"), None);
        assert_eq!(parse_code_rate("fast"), None);
    }

    #[test]
    fn modulation_bits_cover_aliases_and_orders() {
        assert_eq!(modulation_bits("bpsk"), Some(1.0));
        assert_eq!(modulation_bits("QPSK"), Some(2.0));
        assert_eq!(modulation_bits("8PSK"), Some(3.0));
        assert_eq!(modulation_bits("16APSK"), Some(4.0));
        assert_eq!(modulation_bits("64QAM"), Some(6.0));
        assert_eq!(modulation_bits("GMSK"), None);
    }

    #[test]
    fn missing_bits_are_inferred() {
        let raw = RawModcodEntry {
            id: "16apsk-2/3".into(),
            modulation: Some("16APSK".into()),
            code_rate: Some(LooseValue::Text("2/3".into())),
            required_ebno_db: Some(LooseValue::Number(6.2)),
            ..Default::default()
        };
        let entry = entry_from_raw(&raw).unwrap();
        assert!((entry.info_bits_per_symbol - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn supplied_bits_win_over_inference() {
        let raw = RawModcodEntry {
            id: "qpsk".into(),
            modulation: Some("QPSK".into()),
            code_rate: Some(LooseValue::Text("1/2".into())),
            required_cn0_dbhz: Some(LooseValue::Number(70.0)),
            info_bits_per_symbol: Some(LooseValue::Text("0.9".into())),
            ..Default::default()
        };
        assert_eq!(entry_from_raw(&raw).unwrap().info_bits_per_symbol, 0.9);
    }

    #[test]
    fn uninferable_entry_is_a_configuration_error() {
        let raw = RawModcodEntry {
            id: "mystery".into(),
            modulation: Some("GMSK".into()),
            required_cn0_dbhz: Some(LooseValue::Number(70.0)),
            ..Default::default()
        };
        let err = entry_from_raw(&raw).unwrap_err();
        assert!(matches!(err, LinkError::Configuration(_)));
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn entry_without_threshold_is_rejected() {
        let raw = RawModcodEntry {
            id: "qpsk".into(),
            modulation: Some("QPSK".into()),
            code_rate: Some(LooseValue::Number(0.5)),
            ..Default::default()
        };
        assert!(entry_from_raw(&raw).is_err());
    }
}
