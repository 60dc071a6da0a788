//! # Unit Components
//!
//! Groups the tests by library module: parameters, units, power models, topology,
//! simulator handoff, and stats extraction.






/// Unit tests for stats extraction and CSV output.
pub mod stats;
