//! Power models attached to CPU and memory-controller nodes.
//!
//! A power model is a fixed table of four curves, one per operating state. This module provides:
//! 1. **States:** `PowerState`, the closed set of operating states and their slot indices.
//! 2. **Curves:** `PowerCurve`, the closed set of curves used by this system, each carrying the
//!    dynamic and static expressions handed verbatim to the simulator's expression engine.
//! 3. **Evaluation:** Native evaluation of each curve against a sample of simulation signals,
//!    for sanity checks and offline estimates.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Number of operating states a power model covers.
pub const NUM_POWER_STATES: usize = 4;

/// Operating state of a powered component, in slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    /// Active.
    On,
    /// Clock gated; state retained.
    ClockGated,
    /// SRAM retention only.
    SramRetention,
    /// Powered off.
    Off,
}

impl PowerState {
    /// All states in slot order.
    pub const ALL: [Self; NUM_POWER_STATES] =
        [Self::On, Self::ClockGated, Self::SramRetention, Self::Off];

    /// Returns the curve slot this state selects.
    pub const fn index(self) -> usize {
        match self {
            Self::On => 0,
            Self::ClockGated => 1,
            Self::SramRetention => 2,
            Self::Off => 3,
        }
    }
}

/// Simulation signals the curves are written against.
///
/// Field names follow the signal names used in the expressions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Signals {
    /// Supply voltage of the component's voltage domain (V).
    pub voltage: f64,
    /// Instructions per cycle.
    pub ipc: f64,
    /// `dcache.overall_misses`.
    pub dcache_overall_misses: f64,
    /// Elapsed simulated time (s).
    pub sim_seconds: f64,
    /// Temperature (°C).
    pub temp: f64,
    /// `dram.readReqs`.
    pub dram_read_reqs: f64,
    /// `dram.writeReqs`.
    pub dram_write_reqs: f64,
}

impl Signals {
    /// `count / sim_seconds`, or zero before any time has elapsed.
    fn per_second(&self, count: f64) -> f64 {
        if self.sim_seconds > 0.0 {
            count / self.sim_seconds
        } else {
            0.0
        }
    }
}

/// Power drawn in one state, split into its two components (W).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PowerDraw {
    /// Activity-dependent power.
    pub dynamic: f64,
    /// Leakage power.
    pub static_: f64,
}

impl PowerDraw {
    /// Dynamic plus static power.
    pub fn total(&self) -> f64 {
        self.dynamic + self.static_
    }
}

/// One operating-state curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerCurve {
    /// CPU running: IPC and L1 data-cache miss rate drive dynamic power, leakage scales with
    /// temperature.
    CpuActive,
    /// CPU in any non-running state: draws nothing.
    CpuOff,
    /// DRAM: request rate drives dynamic power over a fixed static floor.
    DramActive,
}

impl PowerCurve {
    /// Returns the curve's name as exported to the simulator.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CpuActive => "CpuOn",
            Self::CpuOff => "CpuOff",
            Self::DramActive => "DramOn",
        }
    }

    /// Dynamic power expression over simulation signals.
    pub const fn dynamic_expr(self) -> &'static str {
        match self {
            Self::CpuActive => "voltage * (1.8 * ipc + 1e-9 * dcache.overall_misses / sim_seconds)",
            Self::CpuOff => "0",
            Self::DramActive => "1e-10 * (dram.readReqs + dram.writeReqs) / sim_seconds",
        }
    }

    /// Static power expression.
    pub const fn static_expr(self) -> &'static str {
        match self {
            Self::CpuActive => "0.5 * temp",
            Self::CpuOff => "0",
            Self::DramActive => "0.2",
        }
    }

    /// Evaluates both expressions against a signal sample.
    ///
    /// Rate terms are taken as zero while `sim_seconds` is not positive.
    pub fn evaluate(self, signals: &Signals) -> PowerDraw {
        match self {
            Self::CpuActive => PowerDraw {
                dynamic: signals.voltage
                    * 1e-9f64.mul_add(
                        signals.per_second(signals.dcache_overall_misses),
                        1.8 * signals.ipc,
                    ),
                static_: 0.5 * signals.temp,
            },
            Self::CpuOff => PowerDraw::default(),
            Self::DramActive => PowerDraw {
                dynamic: 1e-10
                    * signals.per_second(signals.dram_read_reqs + signals.dram_write_reqs),
                static_: 0.2,
            },
        }
    }
}

impl Serialize for PowerCurve {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut curve = serializer.serialize_struct("PowerCurve", 3)?;
        curve.serialize_field("name", self.name())?;
        curve.serialize_field("dyn", self.dynamic_expr())?;
        curve.serialize_field("st", self.static_expr())?;
        curve.end()
    }
}

/// Per-state power curves of one component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PowerModel {
    pm: [PowerCurve; NUM_POWER_STATES],
}

impl PowerModel {
    /// CPU model: active curve in the `On` slot, zero-power curve everywhere else.
    pub const fn cpu() -> Self {
        Self {
            pm: [
                PowerCurve::CpuActive,
                PowerCurve::CpuOff,
                PowerCurve::CpuOff,
                PowerCurve::CpuOff,
            ],
        }
    }

    /// Memory-controller model: the same curve in every slot, i.e. no distinct off state.
    pub const fn dram() -> Self {
        Self {
            pm: [PowerCurve::DramActive; NUM_POWER_STATES],
        }
    }

    /// Returns all curve slots in state order.
    pub const fn slots(&self) -> &[PowerCurve; NUM_POWER_STATES] {
        &self.pm
    }

    /// Returns the curve selected by `state`.
    pub const fn curve(&self, state: PowerState) -> PowerCurve {
        self.pm[state.index()]
    }

    /// Evaluates the curve selected by `state`.
    pub fn evaluate(&self, state: PowerState, signals: &Signals) -> PowerDraw {
        self.curve(state).evaluate(signals)
    }
}
