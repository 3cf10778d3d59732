pub mod calculation;
pub mod combine;
pub mod snapshot;
pub mod sweep;

pub use calculation::{CalculationService, ModcodTables};
pub use combine::{CombinedOutcome, Combiner};
pub use snapshot::build_snapshot;
pub use sweep::SweepEngine;
