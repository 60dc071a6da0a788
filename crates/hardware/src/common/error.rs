//! Error definitions.
//!
//! This module defines every failure the library can report. It provides:
//! 1. **Unit errors:** Malformed frequency, size, or latency strings.
//! 2. **Build errors:** Invalid topology parameters, raised before any node is created.
//! 3. **Config errors:** Unreadable or malformed parameter files.
//! 4. **Stats errors:** Unreadable stats dumps and allow-listed values that are not numbers.
//! 5. **Simulation errors:** Failures while handing a topology to the external engine.

use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// A quantity string could not be turned into a number of base units.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The string was empty or only whitespace.
    #[error("empty quantity")]
    Empty,

    /// A unit suffix without a leading number, e.g. `"GHz"`.
    #[error("missing numeric part in {0:?}")]
    MissingNumber(String),

    /// The numeric part did not parse, or was negative or non-finite.
    #[error("invalid number in {0:?}")]
    InvalidNumber(String),

    /// The suffix is not one of the accepted units.
    #[error("unknown unit {unit:?} in {input:?}")]
    UnknownUnit {
        /// Full input string.
        input: String,
        /// Offending suffix.
        unit: String,
    },

    /// The quantity scales to a fractional number of base units.
    #[error("{0:?} is not a whole number of base units")]
    NotIntegral(String),

    /// The quantity is zero.
    #[error("{0:?} must be non-zero")]
    Zero(String),

    /// The quantity does not fit in 64 bits.
    #[error("{0:?} is too large")]
    Overflow(String),
}

/// Topology parameters were rejected.
///
/// Raised by [`crate::soc::builder::build`] before any component is constructed,
/// so a failed build never leaves a partial topology behind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The CPU count was zero or negative.
    #[error("CPU count must be at least 1, got {0}")]
    InvalidCpuCount(i64),

    /// No kernel image path was supplied.
    #[error("a kernel image path is required")]
    MissingKernel,

    /// No disk image path was supplied.
    #[error("a disk image path is required")]
    MissingDisk,

    /// A clock parameter is not a valid frequency.
    #[error("invalid {field}: {source}")]
    InvalidFrequency {
        /// Parameter name.
        field: &'static str,
        /// Parse failure.
        #[source]
        source: UnitError,
    },

    /// A size parameter is not a valid byte size.
    #[error("invalid {field}: {source}")]
    InvalidSize {
        /// Parameter name.
        field: &'static str,
        /// Parse failure.
        #[source]
        source: UnitError,
    },
}

/// A parameter file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("unable to read config file {}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid parameter JSON.
    #[error("unable to parse config file {}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Stats extraction failed.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The stats dump could not be opened or read.
    #[error("unable to read stats file {}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// An allow-listed key carried a value that is not a number.
    #[error("line {line}: value {value:?} for {key} is not a number")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// Metric name.
        key: String,
        /// Raw value token.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseFloatError,
    },

    /// The stats stream could not be read.
    #[error("unable to read stats input")]
    Read(#[source] io::Error),

    /// Writing the CSV report failed.
    #[error("unable to write stats report")]
    Write(#[source] io::Error),
}

/// Handing the topology to the external engine failed.
#[derive(Debug, Error)]
pub enum SimError {
    /// A file in the output directory could not be written.
    #[error("unable to write {}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The topology could not be serialized.
    #[error("unable to serialize topology")]
    Serialize(#[from] serde_json::Error),

    /// The simulator process could not be started or waited on.
    #[error("unable to run simulator {}", program.display())]
    Spawn {
        /// Simulator program.
        program: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The simulator exited unsuccessfully.
    #[error("simulator exited with {status}")]
    Failed {
        /// Exit status reported by the OS.
        status: ExitStatus,
    },

    /// The simulator finished without reporting why it stopped.
    #[error("simulator output contained no exit event")]
    NoExitEvent,

    /// `simulate` was called before `instantiate`.
    #[error("no topology has been instantiated")]
    NotInstantiated,
}
