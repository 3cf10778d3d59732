//! Decibel helpers shared by the impairment and combiner stages.

pub fn db_to_linear(value_db: f64) -> f64 {
    10f64.powf(value_db / 10.0)
}

pub fn linear_to_db(value: f64) -> f64 {
    10.0 * value.log10()
}

/// 10·log10 of a bandwidth or bitrate in Hz / bps.
pub fn hz_to_db(value: f64) -> f64 {
    10.0 * value.log10()
}

/// Combines independent carrier-to-noise ratios by summing their inverse
/// linear values (reciprocal-sum method).
pub fn reciprocal_sum_db(ratios_db: &[f64]) -> f64 {
    let inverse: f64 = ratios_db.iter().map(|&r| 1.0 / db_to_linear(r)).sum();
    linear_to_db(1.0 / inverse)
}

/// Uplink/downlink C/N combination through a transparent transponder.
pub fn combine_cn_db(uplink_cn_db: f64, downlink_cn_db: f64) -> f64 {
    reciprocal_sum_db(&[uplink_cn_db, downlink_cn_db])
}
