//! Clock and voltage domains.
//!
//! The system has two of each: one for the uncore and one for the CPU cluster.
//! Nodes refer to a domain through a `DomainHandle`.

use serde::Serialize;

use crate::common::Frequency;

/// Nominal supply voltage of a voltage domain (V).
pub const DEFAULT_VOLTAGE: f64 = 1.0;

/// Which of the two domains a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainHandle {
    /// Uncore: buses, L2, memory controller, IO.
    System,
    /// CPU cluster.
    Cpu,
}

/// A voltage domain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VoltageDomain {
    /// Supply voltage (V).
    pub voltage: f64,
}

impl Default for VoltageDomain {
    fn default() -> Self {
        Self {
            voltage: DEFAULT_VOLTAGE,
        }
    }
}

/// A source clock domain bound to one voltage domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClockDomain {
    /// Clock frequency.
    pub clock: Frequency,
    /// Voltage domain supplying it.
    pub voltage_domain: DomainHandle,
}
