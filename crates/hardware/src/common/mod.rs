//! Common types used throughout the topology builder and stats extractor.
//!
//! This module provides the building blocks shared by every other module:
//! 1. **Units:** Strong types for frequencies, byte sizes, and latencies.
//! 2. **Error Handling:** One error enum per failure domain.

/// Error types.
pub mod error;

/// Frequency, size, and latency quantities.
pub mod units;

pub use error::{BuildError, ConfigError, SimError, StatsError, UnitError};
pub use units::{ByteSize, Frequency, Latency};
