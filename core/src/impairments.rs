//! Interference and intermodulation impairments.
//!
//! Independent degradations expressed as ratios are combined by summing
//! their inverse linear values (reciprocal-sum method).

use crate::math::{db_to_linear, hz_to_db, linear_to_db};
use crate::model::{CalculationResult, InterferenceDescriptor, IntermodulationDescriptor};

/// Aggregate of up to three carrier-to-interference ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InterferenceSummary {
    /// Sum of inverse linear C/I terms (I/C).
    pub i_over_c: f64,
    pub aggregate_ci_db: Option<f64>,
    pub applied: bool,
}

/// Simplified C/IM estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntermodulationEstimate {
    pub c_im_db: Option<f64>,
    pub applied: bool,
}

pub fn compute_interference(descriptor: Option<&InterferenceDescriptor>) -> InterferenceSummary {
    let Some(descriptor) = descriptor else {
        return InterferenceSummary::default();
    };
    let ratios = descriptor.ratios();
    let i_over_c: f64 = ratios
        .iter()
        .flatten()
        .map(|&ci_db| db_to_linear(ci_db))
        .filter(|ci_linear| *ci_linear > 0.0)
        .map(|ci_linear| 1.0 / ci_linear)
        .sum();
    InterferenceSummary {
        i_over_c,
        aggregate_ci_db: (i_over_c > 0.0).then(|| linear_to_db(1.0 / i_over_c)),
        applied: descriptor.applied || ratios.iter().any(Option::is_some),
    }
}

/// Empirical approximation `C/IM = max(0, 2·backoff + 7 − 10·log10(carriers))`.
///
/// This is a heuristic kept for compatibility with existing link budgets,
/// not an intermodulation product analysis. Output back-off is preferred
/// over input back-off.
pub fn estimate_intermodulation(
    descriptor: Option<&IntermodulationDescriptor>,
) -> IntermodulationEstimate {
    let Some(descriptor) = descriptor else {
        return IntermodulationEstimate::default();
    };
    let backoff = descriptor.output_backoff_db.or(descriptor.input_backoff_db);
    match (backoff, descriptor.composite_carriers) {
        (Some(backoff), Some(carriers)) if carriers >= 1 => IntermodulationEstimate {
            c_im_db: Some((2.0 * backoff + 7.0 - hz_to_db(carriers as f64)).max(0.0)),
            applied: true,
        },
        _ => IntermodulationEstimate::default(),
    }
}

/// Degrades a thermal result by interference and, when requested,
/// intermodulation. Returns a new result; C/N0 is recomputed from the new
/// C/N over the same bandwidth and the margin moves by the same delta.
pub fn apply_impairments(
    result: CalculationResult,
    interference: &InterferenceSummary,
    intermodulation: Option<&IntermodulationEstimate>,
) -> CalculationResult {
    let bandwidth_db = hz_to_db(result.bandwidth_hz);
    let base_cn = result.cn_db;
    let thermal_term = 1.0 / db_to_linear(base_cn);
    let interference_term = interference.i_over_c.max(0.0);

    let (cni_db, cni0_dbhz) = if interference_term > 0.0 {
        let cni = linear_to_db(1.0 / (thermal_term + interference_term));
        (cni, cni + bandwidth_db)
    } else {
        (base_cn, result.cn0_dbhz)
    };

    let applied_im = intermodulation
        .filter(|estimate| estimate.applied)
        .and_then(|estimate| estimate.c_im_db);
    let intermod_term = applied_im.map_or(0.0, |c_im| 1.0 / db_to_linear(c_im));

    let cn_db = linear_to_db(1.0 / (thermal_term + interference_term + intermod_term));
    let delta = cn_db - base_cn;
    let interference_applied = interference.applied || interference_term > 0.0;
    let intermod_applied = applied_im.is_some() || result.intermod_applied;
    let c_im_db = applied_im.or(result.c_im_db);

    let mut warnings = result.warnings.clone();
    if interference_applied {
        if let Some(aggregate) = interference.aggregate_ci_db {
            warnings.push(format!(
                "Interference applied: aggregate C/I={:.2} dB, C/(N+I) degraded by {:.2} dB",
                aggregate,
                base_cn - cni_db
            ));
        }
    }
    if let (true, Some(c_im)) = (intermod_applied, c_im_db) {
        warnings.push(format!(
            "Intermodulation applied: C/IM={:.2} dB, total C/N degraded by {:.2} dB",
            c_im,
            base_cn - cn_db
        ));
    }

    CalculationResult {
        cn_db,
        cn0_dbhz: cn_db + bandwidth_db,
        cni_db: Some(cni_db),
        cni0_dbhz: Some(cni0_dbhz),
        c_im_db,
        link_margin_db: result.link_margin_db.map(|margin| margin + delta),
        interference_applied,
        intermod_applied,
        warnings,
        ..result
    }
}
