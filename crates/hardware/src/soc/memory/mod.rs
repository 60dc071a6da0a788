//! Physical memory layout.
//!
//! This module describes system memory as the simulator sees it. It provides:
//! 1. **Ranges:** `AddrRange`, a half-open physical address range.
//! 2. **Access mode:** `MemoryMode`, how the simulator services memory accesses.
//! 3. **Controller:** The DRAM controller node serving the range.

/// DRAM controller node.
pub mod controller;

use serde::Serialize;

use crate::common::ByteSize;

/// Half-open physical address range `[start, start + size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AddrRange {
    /// First address.
    pub start: u64,
    /// Length.
    pub size: ByteSize,
}

impl AddrRange {
    /// Range of `size` bytes starting at address zero.
    pub const fn from_size(size: ByteSize) -> Self {
        Self { start: 0, size }
    }

    /// One past the last address.
    pub const fn end(&self) -> u64 {
        self.start + self.size.bytes()
    }

    /// Returns whether `addr` falls inside the range.
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end()
    }
}

/// How the simulator services memory accesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    /// Timed, event-driven accesses. Required by the detailed CPU model.
    #[default]
    Timing,
}
