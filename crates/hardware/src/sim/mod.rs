//! Simulation handoff.
//!
//! Wraps a built topology in a root object and hands it to an external engine.

/// Root object, engine trait, and the external engine.
pub mod simulator;

pub use simulator::{ExitEvent, ExternalEngine, Root, SimulationEngine, run};
