//! Link budget engine for geostationary and non-geostationary satellite
//! links.
//!
//! A calculation resolves satellite geometry and per-direction parameters,
//! evaluates the thermal budget of each hop through injected propagation and
//! geometry collaborators, degrades it by interference and intermodulation,
//! and combines the hops according to the transponder type before picking a
//! ModCod. The sweep engine repeats that calculation over one parameter.

pub mod impairments;
pub mod math;
pub mod model;
pub mod prelude;
pub mod processing;
pub mod providers;
pub mod telemetry;
pub mod transponder;
pub mod waveform;

pub use model::{CalculationRequest, CalculationResponse, SweepRequest, SweepResponse};
pub use prelude::{EngineConfig, LinkError, LinkResult};
pub use processing::{CalculationService, SweepEngine};
