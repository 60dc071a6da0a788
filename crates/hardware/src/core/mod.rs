//! Processor-side nodes.
//!
//! This module contains the per-core part of the topology: CPU nodes and the
//! cache hierarchy they feed.

/// L1 and L2 cache nodes.
pub mod cache;

/// CPU nodes and their private units.
pub mod cpu;

pub use self::cache::{AccessKind, CacheGeometry, L1Cache, L2Cache};
pub use self::cpu::{CpuModel, CpuNode, InterruptController, Tlb};
