//! Cache nodes.
//!
//! Every CPU owns a private instruction and data L1; all L1s share one L2. The two levels
//! are separate types so that an L1 can only ever sit between its CPU and the L2 bus.

use serde::Serialize;

use crate::common::ByteSize;
use crate::soc::interconnect::Port;

/// Instruction-side or data-side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    /// Instruction fetch path.
    Instruction,
    /// Load/store path.
    Data,
}

impl AccessKind {
    /// Both kinds, instruction first.
    pub const ALL: [Self; 2] = [Self::Instruction, Self::Data];
}

/// Size and associativity of a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    /// Total capacity.
    pub size: ByteSize,
    /// Number of ways.
    pub assoc: u32,
}

impl CacheGeometry {
    /// Creates a geometry of `size` bytes and `assoc` ways.
    pub const fn new(size: ByteSize, assoc: u32) -> Self {
        Self { size, assoc }
    }
}

/// A private first-level cache.
///
/// Its CPU side is wired to the owning CPU's port of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct L1Cache {
    /// Instruction or data cache.
    pub kind: AccessKind,
    /// Size and associativity.
    #[serde(flatten)]
    pub geometry: CacheGeometry,
    /// Port the cache's memory side is connected to.
    pub mem_side: Port,
}

/// The shared second-level cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct L2Cache {
    /// Size and associativity.
    #[serde(flatten)]
    pub geometry: CacheGeometry,
    /// Port feeding the cache's CPU side.
    pub cpu_side: Port,
    /// Port the cache's memory side is connected to.
    pub mem_side: Port,
}
