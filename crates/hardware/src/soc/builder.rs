//! Topology construction and the top-level `SystemTopology` type.
//!
//! This module assembles the complete system from `BuildParameters`. It performs:
//! 1. **Validation:** Rejects bad parameters before any node exists.
//! 2. **Domains:** System and CPU clock domains, each on its own voltage domain.
//! 3. **CPUs:** Per-core L1 caches, TLBs, interrupt controller, and power model.
//! 4. **Hierarchy:** L1s through the shared L2 bus into the L2, L2 into the system bus,
//!    system bus into the single memory controller.
//! 5. **IO and workload:** Platform devices, IO bus and bridge, kernel, boot loader, and disk.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::common::{BuildError, ByteSize, Frequency, Latency};
use crate::config::BuildParameters;
use crate::core::{
    AccessKind, CacheGeometry, CpuModel, CpuNode, InterruptController, L1Cache, L2Cache, Tlb,
};
use crate::power::PowerModel;
use crate::soc::clock::{ClockDomain, DomainHandle, VoltageDomain};
use crate::soc::devices::{
    BootLoader, CowDiskImage, DiskAttachment, IoAttachment, Platform, PlatformKind, VirtioSlot,
    Workload, WorkloadKind,
};
use crate::soc::interconnect::{
    Bridge, BusHandle, Connection, Crossbar, CrossbarKind, Endpoint, InterruptPort, IoGroup,
    IoPort, Port, PortSide,
};
use crate::soc::memory::controller::{DramInterface, MemCtrl};
use crate::soc::memory::{AddrRange, MemoryMode};

/// System bus data path width in bytes.
pub const MEMBUS_WIDTH: u32 = 64;

/// Geometry of every L1 cache (32 kB, 2-way).
pub const L1_GEOMETRY: CacheGeometry = CacheGeometry::new(ByteSize::from_kib(32), 2);

/// Geometry of the shared L2 cache (512 kB, 8-way).
pub const L2_GEOMETRY: CacheGeometry = CacheGeometry::new(ByteSize::from_kib(512), 8);

/// Propagation delay of the bridge between the system and IO buses.
pub const IOBRIDGE_DELAY: Latency = Latency::from_ns(50);

/// Hardware threads per CPU.
const THREADS_PER_CPU: u32 = 1;

/// Complete, fully wired system topology.
///
/// Owns every node. The singletons (three crossbars, one L2, one memory controller, one
/// bridge, one memory range) are plain fields, so their multiplicity cannot drift. The
/// topology is immutable once built; fields are reachable only through accessors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemTopology {
    mem_mode: MemoryMode,
    mmap_using_noreserve: bool,
    clk_domain: ClockDomain,
    voltage_domain: VoltageDomain,
    cpu_clk_domain: ClockDomain,
    cpu_voltage_domain: VoltageDomain,
    realview: Platform,
    mem_ranges: [AddrRange; 1],
    membus: Crossbar,
    cpu: Vec<CpuNode>,
    l2bus: Crossbar,
    l2cache: L2Cache,
    mem_ctrl: MemCtrl,
    iobus: Crossbar,
    iobridge: Bridge,
    system_port: Port,
    workload: Workload,
}

/// Builds the system topology described by `params`.
///
/// Pure construction: no files are touched and nothing is handed to the simulator.
///
/// # Arguments
///
/// * `params` - Core count, clocks, memory size, and guest image paths.
///
/// # Errors
///
/// Returns a [`BuildError`] if the core count is not positive, an image path is empty, or a
/// clock or size string is malformed. Validation completes before any node is created.
pub fn build(params: &BuildParameters) -> Result<SystemTopology, BuildError> {
    let num_cpus = usize::try_from(params.num_cpus)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(BuildError::InvalidCpuCount(params.num_cpus))?;
    if params.kernel.as_os_str().is_empty() {
        return Err(BuildError::MissingKernel);
    }
    if params.disk.as_os_str().is_empty() {
        return Err(BuildError::MissingDisk);
    }
    let cpu_clock = parse_frequency("cpu_clock", &params.cpu_clock)?;
    let sys_clock = parse_frequency("sys_clock", &params.sys_clock)?;
    let mem_size: ByteSize = params
        .mem_size
        .parse()
        .map_err(|source| BuildError::InvalidSize {
            field: "mem_size",
            source,
        })?;

    let clk_domain = ClockDomain {
        clock: sys_clock,
        voltage_domain: DomainHandle::System,
    };
    let cpu_clk_domain = ClockDomain {
        clock: cpu_clock,
        voltage_domain: DomainHandle::Cpu,
    };

    let mem_range = AddrRange::from_size(mem_size);
    let membus = Crossbar::new(CrossbarKind::SystemXBar, Some(MEMBUS_WIDTH));

    let cpu: Vec<CpuNode> = (0..num_cpus.get()).map(build_cpu).collect();

    let l2bus = Crossbar::new(CrossbarKind::L2XBar, None);
    let l2cache = L2Cache {
        geometry: L2_GEOMETRY,
        cpu_side: Port::mem_side(BusHandle::L2Bus),
        mem_side: Port::cpu_side(BusHandle::MemBus),
    };
    tracing::debug!(
        upstream = l2cache.cpu_side.bus.name(),
        downstream = l2cache.mem_side.bus.name(),
        "Wired shared L2"
    );

    let mem_ctrl = MemCtrl {
        interface: DramInterface::Ddr3_1600_8x8,
        range: mem_range,
        port: Port::mem_side(BusHandle::MemBus),
        power_model: PowerModel::dram(),
    };
    tracing::debug!(
        bus = mem_ctrl.port.bus.name(),
        range_end = mem_ctrl.range.end(),
        "Wired memory controller"
    );

    let iobus = Crossbar::new(CrossbarKind::SystemXBar, None);
    let realview = Platform {
        kind: PlatformKind::VExpressGem5V1,
        on_chip_io: IoAttachment::on(BusHandle::MemBus),
        off_chip_io: IoAttachment::on(BusHandle::IoBus),
    };
    let iobridge = Bridge {
        delay: IOBRIDGE_DELAY,
        mem_side_port: Port::cpu_side(BusHandle::MemBus),
        cpu_side_port: Port::mem_side(BusHandle::IoBus),
    };

    let workload = Workload {
        kind: WorkloadKind::ArmFsLinux,
        kernel: params.kernel.clone(),
        boot_loader: BootLoader::ArmFsBootLoader,
        readfile: None,
        disk: DiskAttachment {
            image: CowDiskImage::over_raw(&params.disk),
            slot: VirtioSlot::BLOCK0,
        },
    };

    let topology = SystemTopology {
        mem_mode: MemoryMode::Timing,
        mmap_using_noreserve: false,
        clk_domain,
        voltage_domain: VoltageDomain::default(),
        cpu_clk_domain,
        cpu_voltage_domain: VoltageDomain::default(),
        realview,
        mem_ranges: [mem_range],
        membus,
        cpu,
        l2bus,
        l2cache,
        mem_ctrl,
        iobus,
        iobridge,
        system_port: Port::cpu_side(BusHandle::MemBus),
        workload,
    };
    tracing::info!(
        num_cpus = num_cpus.get(),
        %cpu_clock,
        %sys_clock,
        %mem_size,
        "Built system topology"
    );
    Ok(topology)
}

fn parse_frequency(field: &'static str, text: &str) -> Result<Frequency, BuildError> {
    text.parse()
        .map_err(|source| BuildError::InvalidFrequency { field, source })
}

/// Builds core `id` with its private units wired towards the L2 bus and system bus.
fn build_cpu(id: usize) -> CpuNode {
    let l1 = |kind| L1Cache {
        kind,
        geometry: L1_GEOMETRY,
        mem_side: Port::cpu_side(BusHandle::L2Bus),
    };

    let cpu = CpuNode {
        id,
        model: CpuModel::MinorCPU,
        num_threads: THREADS_PER_CPU,
        clk_domain: DomainHandle::Cpu,
        icache: l1(AccessKind::Instruction),
        dcache: l1(AccessKind::Data),
        itb: Tlb {
            kind: AccessKind::Instruction,
        },
        dtb: Tlb {
            kind: AccessKind::Data,
        },
        interrupts: InterruptController {
            pio: Port::mem_side(BusHandle::MemBus),
            int_requestor: Port::cpu_side(BusHandle::MemBus),
            int_responder: Port::mem_side(BusHandle::MemBus),
        },
        power_model: PowerModel::cpu(),
    };
    tracing::debug!(
        cpu = id,
        l1_bus = cpu.icache.mem_side.bus.name(),
        irq_bus = cpu.interrupts.pio.bus.name(),
        "Wired CPU with private L1s, TLBs and interrupt controller"
    );
    cpu
}

/// Edge between a node port and a crossbar port, oriented requestor to responder.
///
/// Nodes on a bus's CPU side send requests into it; nodes on its memory side receive them.
fn bus_link(endpoint: Endpoint, port: Port) -> Connection {
    match port.side {
        PortSide::CpuSide => Connection::to_bus(endpoint, port),
        PortSide::MemSide => Connection::new(Endpoint::Bus(port), endpoint),
    }
}

impl SystemTopology {
    /// Memory access mode.
    pub const fn mem_mode(&self) -> MemoryMode {
        self.mem_mode
    }

    /// Whether guest memory is mapped without reserving swap.
    pub const fn mmap_using_noreserve(&self) -> bool {
        self.mmap_using_noreserve
    }

    /// Clock domain of the given handle.
    pub const fn clock_domain(&self, handle: DomainHandle) -> &ClockDomain {
        match handle {
            DomainHandle::System => &self.clk_domain,
            DomainHandle::Cpu => &self.cpu_clk_domain,
        }
    }

    /// Voltage domain of the given handle.
    pub const fn voltage_domain(&self, handle: DomainHandle) -> &VoltageDomain {
        match handle {
            DomainHandle::System => &self.voltage_domain,
            DomainHandle::Cpu => &self.cpu_voltage_domain,
        }
    }

    /// The board model.
    pub const fn platform(&self) -> &Platform {
        &self.realview
    }

    /// Physical memory ranges; always exactly one.
    pub const fn mem_ranges(&self) -> &[AddrRange] {
        &self.mem_ranges
    }

    /// Crossbar of the given handle.
    pub const fn bus(&self, handle: BusHandle) -> &Crossbar {
        match handle {
            BusHandle::MemBus => &self.membus,
            BusHandle::L2Bus => &self.l2bus,
            BusHandle::IoBus => &self.iobus,
        }
    }

    /// CPU nodes in index order.
    pub fn cpus(&self) -> &[CpuNode] {
        &self.cpu
    }

    /// The shared L2 cache.
    pub const fn l2cache(&self) -> &L2Cache {
        &self.l2cache
    }

    /// The memory controller.
    pub const fn mem_ctrl(&self) -> &MemCtrl {
        &self.mem_ctrl
    }

    /// The bridge between the system and IO buses.
    pub const fn iobridge(&self) -> &Bridge {
        &self.iobridge
    }

    /// Port the system's functional accesses enter through.
    pub const fn system_port(&self) -> Port {
        self.system_port
    }

    /// Boot workload.
    pub const fn workload(&self) -> &Workload {
        &self.workload
    }

    /// Every L1 cache, CPU by CPU, instruction before data.
    pub fn l1_caches(&self) -> impl Iterator<Item = (usize, &L1Cache)> + '_ {
        self.cpu.iter().flat_map(|cpu| {
            AccessKind::ALL
                .into_iter()
                .map(move |kind| (cpu.id, cpu.cache(kind)))
        })
    }

    /// Caches whose memory side feeds `bus`, named by their memory-side endpoint.
    ///
    /// Yields the L1s in CPU order (instruction before data), then the L2 if it sits above `bus`.
    pub fn caches_upstream_of(&self, bus: BusHandle) -> impl Iterator<Item = Endpoint> + '_ {
        let l1s = self
            .l1_caches()
            .filter(move |(_, cache)| cache.mem_side.bus == bus)
            .map(|(cpu, cache)| Endpoint::L1 {
                cpu,
                kind: cache.kind,
                side: PortSide::MemSide,
            });
        let l2 = (self.l2cache.mem_side.bus == bus).then_some(Endpoint::L2 {
            side: PortSide::MemSide,
        });
        l1s.chain(l2)
    }

    /// The full directed connection relation, requestor to responder.
    ///
    /// Derived from the typed ports held by each node; the order is stable for a given topology.
    pub fn connections(&self) -> Vec<Connection> {
        let mut edges = Vec::with_capacity(self.cpu.len() * 7 + 10);

        for cpu in &self.cpu {
            for kind in AccessKind::ALL {
                let cache = cpu.cache(kind);
                edges.push(Connection::new(
                    Endpoint::Cpu {
                        cpu: cpu.id,
                        port: kind,
                    },
                    Endpoint::L1 {
                        cpu: cpu.id,
                        kind,
                        side: PortSide::CpuSide,
                    },
                ));
                edges.push(bus_link(
                    Endpoint::L1 {
                        cpu: cpu.id,
                        kind,
                        side: PortSide::MemSide,
                    },
                    cache.mem_side,
                ));
            }

            let interrupts = &cpu.interrupts;
            for (port, bus_port) in [
                (InterruptPort::Pio, interrupts.pio),
                (InterruptPort::IntRequestor, interrupts.int_requestor),
                (InterruptPort::IntResponder, interrupts.int_responder),
            ] {
                edges.push(bus_link(Endpoint::Interrupts { cpu: cpu.id, port }, bus_port));
            }
        }

        edges.push(bus_link(
            Endpoint::L2 {
                side: PortSide::CpuSide,
            },
            self.l2cache.cpu_side,
        ));
        edges.push(bus_link(
            Endpoint::L2 {
                side: PortSide::MemSide,
            },
            self.l2cache.mem_side,
        ));
        edges.push(bus_link(Endpoint::MemCtrl, self.mem_ctrl.port));
        edges.push(bus_link(
            Endpoint::IoBridge {
                side: PortSide::MemSide,
            },
            self.iobridge.mem_side_port,
        ));
        edges.push(bus_link(
            Endpoint::IoBridge {
                side: PortSide::CpuSide,
            },
            self.iobridge.cpu_side_port,
        ));

        for (group, attachment) in [
            (IoGroup::OnChip, self.realview.on_chip_io),
            (IoGroup::OffChip, self.realview.off_chip_io),
        ] {
            edges.push(bus_link(
                Endpoint::Io {
                    group,
                    port: IoPort::Pio,
                },
                attachment.pio,
            ));
            edges.push(bus_link(
                Endpoint::Io {
                    group,
                    port: IoPort::Dma,
                },
                attachment.dma,
            ));
        }

        edges.push(bus_link(Endpoint::SystemPort, self.system_port));
        edges
    }
}
