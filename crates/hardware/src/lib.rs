//! ARM full-system topology builder and stats extractor.
//!
//! This crate describes a small ARM board for an external cycle-level simulator and reads back
//! what the simulator measured. It provides:
//! 1. **Configuration:** `BuildParameters`, the handful of scalars a system is built from.
//! 2. **Topology:** CPUs with private L1s, a shared L2, a system bus, DRAM, and the IO platform.
//! 3. **Power:** Per-state power curves attached to the CPUs and the memory controller.
//! 4. **Simulation:** The root object and the handoff to the external engine.
//! 5. **Stats:** Extraction of a fixed set of metrics from the simulator's stats dump.

/// Common types (units, errors).
pub mod common;
/// Build parameters (defaults, JSON loading).
pub mod config;
/// CPU nodes and caches.
pub mod core;
/// Per-state power models.
pub mod power;
/// Root object and simulation engine handoff.
pub mod sim;
/// System topology (builder, clocks, devices, interconnect, memory).
pub mod soc;
/// Stats dump extraction and CSV reporting.
pub mod stats;

/// Scalar build inputs; start from `BuildParameters::new(kernel, disk)`.
pub use crate::config::BuildParameters;
/// Root object handed to the simulation engine.
pub use crate::sim::Root;
/// Fully wired system; construct with [`build`].
pub use crate::soc::{SystemTopology, build};
