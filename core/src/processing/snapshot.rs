use chrono::{DateTime, Utc};

use super::calculation::ModcodTables;
use crate::model::snapshot::{
    EntitySnapshot, ModcodTableSnapshot, SnapshotMetadata, StaticSnapshot,
};
use crate::model::{
    CalculationRequest, CommunicationContext, ModcodTableInput, PayloadSnapshot, RuntimeEcho,
    StrategySnapshot, SCHEMA_VERSION,
};
use crate::waveform::WaveformStrategy;

fn describe(input: Option<&ModcodTableInput>, strategy: &WaveformStrategy) -> ModcodTableSnapshot {
    ModcodTableSnapshot {
        id: input.and_then(|table| table.id.clone()),
        name: input
            .and_then(|table| table.name.clone())
            .or_else(|| input.is_none().then(|| "built-in DVB-S2X".to_string())),
        version: input.and_then(|table| table.version.clone()),
        waveform: strategy.family(),
        entries: strategy.raw_entries(),
    }
}

/// Assembles the replay snapshot from values the calculation already
/// resolved. No computation happens here.
pub fn build_snapshot(
    request: &CalculationRequest,
    tables: &ModcodTables,
    runtime: &RuntimeEcho,
    context: &CommunicationContext,
    computed_at: DateTime<Utc>,
) -> PayloadSnapshot {
    let static_data = match tables {
        ModcodTables::Shared(strategy) => StaticSnapshot {
            modcod_table: Some(describe(request.modcod_table.as_ref(), strategy)),
            uplink_modcod_table: None,
            downlink_modcod_table: None,
        },
        ModcodTables::PerDirection { uplink, downlink } => {
            let shared = request.modcod_table.as_ref();
            let source = |table| Option::or(table, shared);
            StaticSnapshot {
                modcod_table: None,
                uplink_modcod_table: Some(describe(
                    source(request.uplink_modcod_table.as_ref()),
                    uplink,
                )),
                downlink_modcod_table: Some(describe(
                    source(request.downlink_modcod_table.as_ref()),
                    downlink,
                )),
            }
        }
    };

    PayloadSnapshot {
        static_data,
        entity: EntitySnapshot {
            satellite: request.satellite.clone(),
            earth_station_tx: request.earth_station_tx.clone(),
            earth_station_rx: request.earth_station_rx.clone(),
        },
        runtime: runtime.clone(),
        strategy: StrategySnapshot {
            waveform_strategy: request.waveform_strategy,
            transponder_type: request.transponder_type,
        },
        overrides: request.overrides.clone(),
        metadata: SnapshotMetadata {
            schema_version: SCHEMA_VERSION.to_string(),
            computed_at,
            context: *context,
        },
    }
}
