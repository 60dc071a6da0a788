//! Memory controller node.
//!
//! The topology has a single controller serving the single DRAM range. This module provides:
//! 1. **Interface:** `DramInterface`, the DRAM device timing preset handed to the simulator.
//! 2. **Controller:** `MemCtrl`, bound to its range, its bus port, and its power model.

use serde::Serialize;

use super::AddrRange;
use crate::power::PowerModel;
use crate::soc::interconnect::Port;

/// DRAM timing preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DramInterface {
    /// DDR3-1600, 8 devices of x8.
    #[serde(rename = "DDR3_1600_8x8")]
    Ddr3_1600_8x8,
}

/// The DRAM controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MemCtrl {
    /// Device timing preset.
    pub interface: DramInterface,
    /// Address range served.
    pub range: AddrRange,
    /// Bus port the controller responds on.
    pub port: Port,
    /// Per-state power curves.
    pub power_model: PowerModel,
}
