//! Merging of the two per-direction results into a system outcome.

use crate::math::{combine_cn_db, hz_to_db};
use crate::model::{CalculationResult, CombinedResult, ModcodSelection, ModcodSummary};
use crate::prelude::{ensure_finite, LinkResult};
use crate::waveform::{ModcodDecision, WaveformStrategy};

/// Per-direction results plus whatever the transponder type derives from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedOutcome {
    pub uplink: CalculationResult,
    pub downlink: CalculationResult,
    pub combined: Option<CombinedResult>,
    pub combined_link_margin_db: Option<f64>,
    pub system_link_margin_db: Option<f64>,
    pub modcod_selected: Option<ModcodSelection>,
}

/// How the two hops are merged, with the tables each variant needs.
#[derive(Debug, Clone, Copy)]
pub enum Combiner<'a> {
    /// One signal end to end: noise adds, one ModCod decision.
    Transparent {
        strategy: &'a WaveformStrategy,
        bandwidth_hz: f64,
    },
    /// Two independent links, each with its own table.
    Regenerative {
        uplink: &'a WaveformStrategy,
        downlink: &'a WaveformStrategy,
    },
}

impl<'a> Combiner<'a> {
    pub fn combine(
        self,
        uplink: CalculationResult,
        downlink: CalculationResult,
        rolloff: Option<f64>,
    ) -> LinkResult<CombinedOutcome> {
        match self {
            Combiner::Transparent {
                strategy,
                bandwidth_hz,
            } => combine_transparent(strategy, bandwidth_hz, uplink, downlink, rolloff),
            Combiner::Regenerative {
                uplink: uplink_strategy,
                downlink: downlink_strategy,
            } => {
                let (uplink, uplink_summary) =
                    finalize_direction(uplink_strategy, uplink, rolloff);
                let (downlink, downlink_summary) =
                    finalize_direction(downlink_strategy, downlink, rolloff);
                let system_link_margin_db = match (uplink.link_margin_db, downlink.link_margin_db)
                {
                    (Some(ul), Some(dl)) => Some(ul.min(dl)),
                    (ul, dl) => ul.or(dl),
                };
                Ok(CombinedOutcome {
                    uplink,
                    downlink,
                    combined: None,
                    combined_link_margin_db: None,
                    system_link_margin_db,
                    modcod_selected: Some(ModcodSelection::PerDirection {
                        uplink: uplink_summary,
                        downlink: downlink_summary,
                    }),
                })
            }
        }
    }
}

/// Regenerative hop: selection against the hop's own C/N0 and bandwidth.
fn finalize_direction(
    strategy: &WaveformStrategy,
    result: CalculationResult,
    rolloff: Option<f64>,
) -> (CalculationResult, Option<ModcodSummary>) {
    match strategy.select_modcod_with_margin(result.cn0_dbhz, Some(result.bandwidth_hz), rolloff) {
        Some(decision) => {
            let summary = strategy.summarize(&decision.entry, rolloff);
            let result = result.with_modcod(Some(decision.entry.id.clone()));
            let result = match decision.margin_db {
                Some(margin) => result.with_link_margin(margin),
                None => result,
            };
            (result, Some(summary))
        }
        None => (result, None),
    }
}

/// Margin of one hop against the shared decision's Eb/N0 requirement.
fn margin_against(decision: &ModcodDecision, result: &CalculationResult) -> Option<f64> {
    let bitrate = decision.bitrate_bps?;
    let required = decision.required_ebno_db?;
    Some(result.cn0_dbhz - hz_to_db(bitrate) - required)
}

fn combine_transparent(
    strategy: &WaveformStrategy,
    bandwidth_hz: f64,
    uplink: CalculationResult,
    downlink: CalculationResult,
    rolloff: Option<f64>,
) -> LinkResult<CombinedOutcome> {
    let bandwidth_db = hz_to_db(bandwidth_hz);
    let cn_db = ensure_finite("combined C/N", combine_cn_db(uplink.cn_db, downlink.cn_db))?;
    let cn0_dbhz = cn_db + bandwidth_db;
    let cni_db = combine_cn_db(
        uplink.cni_db.unwrap_or(uplink.cn_db),
        downlink.cni_db.unwrap_or(downlink.cn_db),
    );
    let clean_cn_db = combine_cn_db(uplink.clean_cn_db, downlink.clean_cn_db);

    let decision = strategy.select_modcod_with_margin(cn0_dbhz, Some(bandwidth_hz), rolloff);
    let link_margin_db = decision.as_ref().and_then(|d| d.margin_db);
    let clean_link_margin_db = link_margin_db.map(|margin| margin + (clean_cn_db - cn_db));

    let (uplink, downlink, modcod_selected) = match &decision {
        Some(decision) => {
            let id = Some(decision.entry.id.clone());
            let apply = |result: CalculationResult| {
                let margin = margin_against(decision, &result);
                let result = result.with_modcod(id.clone());
                match margin {
                    Some(margin) => result.with_link_margin(margin),
                    None => result,
                }
            };
            (
                apply(uplink),
                apply(downlink),
                Some(ModcodSelection::Shared(
                    strategy.summarize(&decision.entry, rolloff),
                )),
            )
        }
        None => (uplink, downlink, None),
    };

    let combined = CombinedResult {
        cn_db,
        cn0_dbhz,
        cni_db,
        cni0_dbhz: cni_db + bandwidth_db,
        c_im_db: downlink.c_im_db,
        link_margin_db,
        clean_cn_db,
        clean_link_margin_db,
    };

    Ok(CombinedOutcome {
        uplink,
        downlink,
        combined: Some(combined),
        combined_link_margin_db: link_margin_db,
        system_link_margin_db: link_margin_db,
        modcod_selected,
    })
}
