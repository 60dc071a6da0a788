//! Topology build parameters.
//!
//! This module defines the handful of scalars a topology is built from. It provides:
//! 1. **Defaults:** The baseline single-core, 1 GHz, 512 MB system.
//! 2. **Structure:** `BuildParameters`, deserializable from JSON with per-field defaults.
//! 3. **Loading:** `BuildParameters::from_json_file` for parameter files passed on the command line.
//!
//! Parameters are raw input: clocks and sizes stay strings here and are validated by
//! [`crate::soc::builder::build`], so every rejection surfaces as a [`crate::common::BuildError`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// Default parameter values.
mod defaults {
    /// Number of CPU cores.
    pub const NUM_CPUS: i64 = 1;

    /// CPU clock domain frequency.
    pub const CPU_CLOCK: &str = "1GHz";

    /// System clock domain frequency.
    pub const SYS_CLOCK: &str = "1GHz";

    /// Size of the single DRAM range.
    pub const MEM_SIZE: &str = "512MB";
}

/// Scalar inputs to topology construction.
///
/// # Examples
///
/// Deserializing a parameter file where only the paths and core count are given:
///
/// ```
/// use armfs_core::config::BuildParameters;
///
/// let json = r#"{
///     "kernel": "vmlinux",
///     "disk": "rootfs.img",
///     "num_cpus": 2
/// }"#;
///
/// let params: BuildParameters = serde_json::from_str(json).unwrap();
/// assert_eq!(params.num_cpus, 2);
/// assert_eq!(params.cpu_clock, "1GHz");
/// assert_eq!(params.mem_size, "512MB");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameters {
    /// Guest kernel image.
    #[serde(default)]
    pub kernel: PathBuf,

    /// Guest disk image (raw, opened read-only by the simulator).
    #[serde(default)]
    pub disk: PathBuf,

    /// Number of CPU cores. Signed so that non-positive counts reach validation.
    #[serde(default = "BuildParameters::default_num_cpus")]
    pub num_cpus: i64,

    /// CPU clock domain frequency, e.g. `"1GHz"`.
    #[serde(default = "BuildParameters::default_cpu_clock")]
    pub cpu_clock: String,

    /// System clock domain frequency, e.g. `"1GHz"`.
    #[serde(default = "BuildParameters::default_sys_clock")]
    pub sys_clock: String,

    /// DRAM size, e.g. `"512MB"`.
    #[serde(default = "BuildParameters::default_mem_size")]
    pub mem_size: String,
}

impl BuildParameters {
    /// Creates parameters for the given images with every other field at its default.
    ///
    /// # Arguments
    ///
    /// * `kernel` - Guest kernel image path.
    /// * `disk` - Guest disk image path.
    pub fn new(kernel: impl Into<PathBuf>, disk: impl Into<PathBuf>) -> Self {
        Self {
            kernel: kernel.into(),
            disk: disk.into(),
            ..Self::default()
        }
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid parameter object.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?params, "Loaded build parameters");
        Ok(params)
    }

    fn default_num_cpus() -> i64 {
        defaults::NUM_CPUS
    }

    fn default_cpu_clock() -> String {
        defaults::CPU_CLOCK.to_string()
    }

    fn default_sys_clock() -> String {
        defaults::SYS_CLOCK.to_string()
    }

    fn default_mem_size() -> String {
        defaults::MEM_SIZE.to_string()
    }
}

impl Default for BuildParameters {
    /// Default parameters with empty image paths; `build` rejects them until both are set.
    fn default() -> Self {
        Self {
            kernel: PathBuf::new(),
            disk: PathBuf::new(),
            num_cpus: defaults::NUM_CPUS,
            cpu_clock: defaults::CPU_CLOCK.to_string(),
            sys_clock: defaults::SYS_CLOCK.to_string(),
            mem_size: defaults::MEM_SIZE.to_string(),
        }
    }
}
