//! Value types exchanged with the engine. Everything here is created fresh
//! per calculation and discarded with the response.

pub mod context;
pub mod geo;
pub mod modcod;
pub mod params;
pub mod request;
pub mod response;
pub mod result;
pub mod snapshot;
pub mod strategy;
pub mod sweep;

pub use context::{CommunicationContext, ResolvedValue, ValueSource};
pub use geo::{GroundLocation, OrbitType, SatellitePosition, TwoLineElements};
pub use modcod::{LooseValue, ModcodEntry, ModcodSummary, ModcodTableInput, RawModcodEntry};
pub use params::{
    Direction, InterferenceDescriptor, IntermodulationDescriptor, LinkDirectionParameters,
    RuntimeParameters,
};
pub use request::{
    CalculationRequest, DirectionInput, EarthStationAsset, Overrides, RuntimeInput,
    SatelliteAsset, TerminalOverride,
};
pub use response::{
    CalculationResponse, CombinedResult, DirectionResults, ModcodSelection, RuntimeEcho,
    SCHEMA_VERSION,
};
pub use result::{CalculationResult, LossBreakdown};
pub use snapshot::PayloadSnapshot;
pub use strategy::{StrategySnapshot, TransponderType, WaveformFamily};
pub use sweep::{SweepConfig, SweepPoint, SweepRequest, SweepResponse, SWEEPABLE_PARAMETERS};
