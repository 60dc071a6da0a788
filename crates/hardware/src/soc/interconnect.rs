//! System interconnect: crossbars, ports, and the connection relation.
//!
//! The topology has exactly three crossbars, so a bus is named by a closed `BusHandle`
//! rather than an index. This module provides:
//! 1. **Handles:** `BusHandle` and `PortSide`, combined into a typed `Port`.
//! 2. **Crossbars:** `Crossbar` parameters and the `Bridge` between the memory and IO buses.
//! 3. **Connections:** `Endpoint` and `Connection`, the directed "X connects to P of Y" relation
//!    derived from a built topology.

use serde::Serialize;

use crate::common::Latency;
use crate::core::AccessKind;

/// One of the three crossbars in the topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusHandle {
    /// Top-level system crossbar feeding the memory controller.
    MemBus,
    /// Shared crossbar between the L1 caches and the L2 cache.
    L2Bus,
    /// Secondary crossbar carrying off-chip IO devices.
    IoBus,
}

impl BusHandle {
    /// Returns the bus name used in stats keys and topology dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MemBus => "membus",
            Self::L2Bus => "l2bus",
            Self::IoBus => "iobus",
        }
    }
}

/// Side of a crossbar (or cache) a port belongs to.
///
/// Requestors attach to the CPU side of a bus; responders attach to its memory side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSide {
    /// Upstream (request-receiving) side.
    CpuSide,
    /// Downstream (request-sending) side.
    MemSide,
}

/// A vector port on one side of one crossbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Port {
    /// Crossbar the port belongs to.
    pub bus: BusHandle,
    /// Side of the crossbar.
    pub side: PortSide,
}

impl Port {
    /// CPU-side port of `bus`.
    pub const fn cpu_side(bus: BusHandle) -> Self {
        Self {
            bus,
            side: PortSide::CpuSide,
        }
    }

    /// Memory-side port of `bus`.
    pub const fn mem_side(bus: BusHandle) -> Self {
        Self {
            bus,
            side: PortSide::MemSide,
        }
    }
}

/// Crossbar model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CrossbarKind {
    /// Coherent system crossbar.
    SystemXBar,
    /// Crossbar in front of a shared L2.
    L2XBar,
}

/// A crossbar node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Crossbar {
    /// Crossbar model.
    pub kind: CrossbarKind,
    /// Data path width in bytes; `None` keeps the model's default.
    pub width: Option<u32>,
}

impl Crossbar {
    /// Creates a crossbar of the given model.
    pub const fn new(kind: CrossbarKind, width: Option<u32>) -> Self {
        Self { kind, width }
    }
}

/// Bridge between two crossbars with a fixed propagation delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bridge {
    /// Propagation delay.
    pub delay: Latency,
    /// Port the bridge issues requests on.
    pub mem_side_port: Port,
    /// Port the bridge receives requests on.
    pub cpu_side_port: Port,
}

/// Ports of a per-CPU interrupt controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPort {
    /// Programmed-IO port.
    Pio,
    /// Outgoing interrupt messages.
    IntRequestor,
    /// Incoming interrupt messages.
    IntResponder,
}

/// Ports of a group of platform IO devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IoPort {
    /// Programmed-IO (device registers).
    Pio,
    /// DMA requests from the devices.
    Dma,
}

/// Group of platform IO devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IoGroup {
    /// On-chip devices (interrupt distributor, timers).
    OnChip,
    /// External devices (UARTs, RTC, virtio slots, PCI host).
    OffChip,
}

/// A named port anywhere in the topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Endpoint {
    /// A CPU's instruction or data port.
    Cpu {
        /// CPU index.
        cpu: usize,
        /// Which port.
        port: AccessKind,
    },
    /// One side of a CPU's private L1 cache.
    L1 {
        /// Owning CPU index.
        cpu: usize,
        /// Instruction or data cache.
        kind: AccessKind,
        /// Cache side.
        side: PortSide,
    },
    /// One side of the shared L2 cache.
    L2 {
        /// Cache side.
        side: PortSide,
    },
    /// A port of a CPU's interrupt controller.
    Interrupts {
        /// Owning CPU index.
        cpu: usize,
        /// Which port.
        port: InterruptPort,
    },
    /// The memory controller's port.
    MemCtrl,
    /// One side of the IO bridge.
    IoBridge {
        /// Bridge side.
        side: PortSide,
    },
    /// Platform IO devices.
    Io {
        /// Device group.
        group: IoGroup,
        /// Which port.
        port: IoPort,
    },
    /// The system's functional access port.
    SystemPort,
    /// A crossbar port.
    Bus(Port),
}

/// A directed edge: `from` is connected to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    /// Requesting end.
    pub from: Endpoint,
    /// Responding end.
    pub to: Endpoint,
}

impl Connection {
    /// Creates an edge from `from` to `to`.
    pub const fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    /// Creates an edge from `from` to a crossbar port.
    pub const fn to_bus(from: Endpoint, port: Port) -> Self {
        Self {
            from,
            to: Endpoint::Bus(port),
        }
    }
}
