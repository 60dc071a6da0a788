//! Handoff of a built topology to the external simulation engine.
//!
//! The engine owns timing, coherence, and ISA emulation; this side only instantiates it with a
//! topology and waits for the guest to stop. This module provides:
//! 1. **Root:** The full-system root object wrapping a `SystemTopology`.
//! 2. **Engine trait:** `SimulationEngine`, the instantiate-then-simulate seam.
//! 3. **External engine:** Runs a simulator binary on a JSON dump of the root and reads back
//!    its exit event.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::common::SimError;
use crate::soc::SystemTopology;

/// File name of the topology dump inside the output directory.
pub const TOPOLOGY_FILE: &str = "topology.json";

/// Prefix of the line the simulator prints when the guest stops.
const EXIT_PREFIX: &str = "Exiting @ tick ";

/// Separator between the tick and the cause on the exit line.
const EXIT_CAUSE_SEPARATOR: &str = " because ";

/// Root of the simulated object tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Root {
    /// Whether the system boots an operating system rather than a single process.
    pub full_system: bool,
    /// The system under simulation.
    pub system: SystemTopology,
}

impl Root {
    /// Wraps `system` in a full-system root.
    pub const fn full_system(system: SystemTopology) -> Self {
        Self {
            full_system: true,
            system,
        }
    }
}

/// Why and when the simulation stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitEvent {
    /// Simulated tick at which the loop exited.
    pub tick: u64,
    /// Reason reported by the engine.
    pub cause: String,
}

impl ExitEvent {
    /// Parses the simulator's `Exiting @ tick <N> because <cause>` line.
    ///
    /// # Returns
    ///
    /// `None` if `line` is not an exit line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(EXIT_PREFIX)?;
        let (tick, cause) = rest.split_once(EXIT_CAUSE_SEPARATOR)?;
        Some(Self {
            tick: tick.trim().parse().ok()?,
            cause: cause.trim().to_string(),
        })
    }
}

impl fmt::Display for ExitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EXIT_PREFIX}{}{EXIT_CAUSE_SEPARATOR}{}", self.tick, self.cause)
    }
}

/// An engine that can instantiate a root and run it to completion.
pub trait SimulationEngine {
    /// Instantiates the simulated objects described by `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`SimError`] if the engine cannot accept the topology.
    fn instantiate(&mut self, root: &Root) -> Result<(), SimError>;

    /// Runs the instantiated system until the guest or the engine stops it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInstantiated`] if called before [`Self::instantiate`], or another
    /// [`SimError`] if the run fails.
    fn simulate(&mut self) -> Result<ExitEvent, SimError>;
}

/// Instantiates `root` on `engine` and simulates it.
///
/// # Errors
///
/// Propagates any [`SimError`] from either step.
pub fn run<E: SimulationEngine + ?Sized>(engine: &mut E, root: &Root) -> Result<ExitEvent, SimError> {
    engine.instantiate(root)?;
    tracing::info!("Instantiated topology, starting simulation");
    let event = engine.simulate()?;
    tracing::info!(tick = event.tick, cause = %event.cause, "Simulation stopped");
    Ok(event)
}

/// Simulator binary driven through a topology file.
///
/// `instantiate` writes the root as JSON to `<outdir>/topology.json`; `simulate` runs
/// `<program> [args..] --outdir=<outdir> <outdir>/topology.json` and takes the last exit line
/// from its standard output.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    program: PathBuf,
    args: Vec<OsString>,
    outdir: PathBuf,
    topology_file: Option<PathBuf>,
}

impl ExternalEngine {
    /// Creates an engine running `program` with output under `outdir`.
    pub fn new(program: impl Into<PathBuf>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            outdir: outdir.into(),
            topology_file: None,
        }
    }

    /// Adds an argument passed before the output directory and topology file.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Output directory.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Topology file written by the last `instantiate`, if any.
    pub fn topology_file(&self) -> Option<&Path> {
        self.topology_file.as_deref()
    }
}

impl SimulationEngine for ExternalEngine {
    fn instantiate(&mut self, root: &Root) -> Result<(), SimError> {
        fs::create_dir_all(&self.outdir).map_err(|source| SimError::Io {
            path: self.outdir.clone(),
            source,
        })?;

        let path = self.outdir.join(TOPOLOGY_FILE);
        let json = serde_json::to_string_pretty(root)?;
        fs::write(&path, json).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote topology");

        self.topology_file = Some(path);
        Ok(())
    }

    fn simulate(&mut self) -> Result<ExitEvent, SimError> {
        let topology_file = self
            .topology_file
            .as_ref()
            .ok_or(SimError::NotInstantiated)?;

        let mut outdir_arg = OsString::from("--outdir=");
        outdir_arg.push(&self.outdir);

        tracing::debug!(program = %self.program.display(), args = ?self.args, "Launching simulator");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(outdir_arg)
            .arg(topology_file)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| SimError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut event = None;
        for line in stdout.lines() {
            tracing::trace!(target: "armfs::simulator", "{line}");
            if let Some(parsed) = ExitEvent::parse_line(line) {
                event = Some(parsed);
            }
        }

        if !output.status.success() {
            return Err(SimError::Failed {
                status: output.status,
            });
        }
        event.ok_or(SimError::NoExitEvent)
    }
}
