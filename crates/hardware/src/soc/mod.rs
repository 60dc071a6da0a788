//! System-on-Chip topology.
//!
//! This module organizes the nodes outside the CPU cores and the builder that wires
//! everything together into a `SystemTopology`.

/// Topology builder and the top-level system type.
pub mod builder;

/// Clock and voltage domains.
pub mod clock;

/// Platform devices, disk images, and the boot workload.
pub mod devices;

/// Crossbars, ports, and the connection relation.
pub mod interconnect;

/// Address ranges and the memory controller.
pub mod memory;

pub use builder::{SystemTopology, build};
