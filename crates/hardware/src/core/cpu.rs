//! CPU nodes.
//!
//! A `CpuNode` bundles everything private to one core: its L1 caches, TLBs, interrupt
//! controller, and power model. This module provides:
//! 1. **Model:** The CPU timing model and thread count handed to the simulator.
//! 2. **Private units:** `Tlb` and `InterruptController`.
//! 3. **Node:** `CpuNode`, with accessors for the per-kind cache and TLB.

use serde::Serialize;

use super::cache::{AccessKind, L1Cache};
use crate::power::PowerModel;
use crate::soc::clock::DomainHandle;
use crate::soc::interconnect::Port;

/// CPU timing model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CpuModel {
    /// In-order, four-stage pipelined model.
    MinorCPU,
}

/// Translation lookaside buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tlb {
    /// Translations it serves.
    pub kind: AccessKind,
}

/// Per-CPU interrupt controller.
///
/// The PIO port and the responder hang off the memory side of the system bus, the
/// requestor off its CPU side, so interrupts travel both ways over the same crossbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InterruptController {
    /// Programmed-IO port.
    pub pio: Port,
    /// Outgoing interrupt messages.
    pub int_requestor: Port,
    /// Incoming interrupt messages.
    pub int_responder: Port,
}

/// One CPU core and its private units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CpuNode {
    /// Core index, `0..num_cpus`.
    pub id: usize,
    /// Timing model.
    pub model: CpuModel,
    /// Hardware threads.
    pub num_threads: u32,
    /// Clock domain the core runs in.
    pub clk_domain: DomainHandle,
    /// L1 instruction cache.
    pub icache: L1Cache,
    /// L1 data cache.
    pub dcache: L1Cache,
    /// Instruction TLB.
    pub itb: Tlb,
    /// Data TLB.
    pub dtb: Tlb,
    /// Interrupt controller.
    pub interrupts: InterruptController,
    /// Per-state power curves.
    pub power_model: PowerModel,
}

impl CpuNode {
    /// Returns the L1 cache of the given kind.
    pub const fn cache(&self, kind: AccessKind) -> &L1Cache {
        match kind {
            AccessKind::Instruction => &self.icache,
            AccessKind::Data => &self.dcache,
        }
    }

    /// Returns the TLB of the given kind.
    pub const fn tlb(&self, kind: AccessKind) -> &Tlb {
        match kind {
            AccessKind::Instruction => &self.itb,
            AccessKind::Data => &self.dtb,
        }
    }
}
