//! Platform devices and the boot workload.
//!
//! This module describes everything outside the CPU/memory path. It provides:
//! 1. **Platform:** The VExpress board model and how its device groups attach to the buses.
//! 2. **Disk:** A copy-on-write disk layered over a read-only raw image, and its virtio slot.
//! 3. **Workload:** Kernel, boot loader, boot script, and disk of the full-system Linux boot.

use std::path::PathBuf;

use serde::Serialize;

use crate::soc::interconnect::{BusHandle, Port};

/// Board model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlatformKind {
    /// Versatile Express board tailored for the simulator, first revision.
    #[serde(rename = "VExpress_GEM5_V1")]
    VExpressGem5V1,
}

/// How a device group is attached to a crossbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IoAttachment {
    /// Port the device registers respond on.
    pub pio: Port,
    /// Port DMA-capable devices issue requests on.
    pub dma: Port,
}

impl IoAttachment {
    /// Attaches a device group to `bus`: PIO on its memory side, DMA on its CPU side.
    pub const fn on(bus: BusHandle) -> Self {
        Self {
            pio: Port::mem_side(bus),
            dma: Port::cpu_side(bus),
        }
    }
}

/// The board and its two device groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Board model.
    pub kind: PlatformKind,
    /// Interrupt distributor, timers, and other on-chip devices.
    pub on_chip_io: IoAttachment,
    /// UARTs, RTC, virtio slots, and other external devices.
    pub off_chip_io: IoAttachment,
}

/// A raw disk image file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawDiskImage {
    /// Image file.
    pub image_file: PathBuf,
    /// Whether writes to the file are refused.
    pub read_only: bool,
}

/// A copy-on-write overlay; writes stay in memory and never reach `child`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CowDiskImage {
    /// Backing image.
    pub child: RawDiskImage,
    /// Whether the overlay itself refuses writes.
    pub read_only: bool,
}

impl CowDiskImage {
    /// Writable overlay over a read-only raw image at `path`.
    pub fn over_raw(path: impl Into<PathBuf>) -> Self {
        Self {
            child: RawDiskImage {
                image_file: path.into(),
                read_only: true,
            },
            read_only: false,
        }
    }
}

/// A BAR of a virtio slot's PCI configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VirtioSlot {
    /// Virtio slot index.
    pub vio: usize,
    /// PCI configuration index within the slot.
    pub config: usize,
    /// Base address register index.
    pub bar: usize,
}

impl VirtioSlot {
    /// The first virtio block slot's BAR0.
    pub const BLOCK0: Self = Self {
        vio: 0,
        config: 0,
        bar: 0,
    };
}

/// A disk image hooked into a platform slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiskAttachment {
    /// Image stack.
    pub image: CowDiskImage,
    /// Where it is plugged in.
    pub slot: VirtioSlot,
}

/// Workload kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WorkloadKind {
    /// Full-system ARM Linux boot.
    ArmFsLinux,
}

/// Boot loader reference.
///
/// A placeholder: the simulator resolves the actual binary from its own guest-binary search path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BootLoader {
    /// Default ARM full-system boot loader.
    ArmFsBootLoader,
}

/// What the system boots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Workload {
    /// Workload kind.
    pub kind: WorkloadKind,
    /// Kernel image.
    pub kernel: PathBuf,
    /// Boot loader.
    pub boot_loader: BootLoader,
    /// Script the guest reads after boot; `None` boots to the default init.
    pub readfile: Option<PathBuf>,
    /// Root disk.
    pub disk: DiskAttachment,
}
