//! Frequency, byte-size, and latency quantities.
//!
//! The simulator takes its quantities as short strings (`"1GHz"`, `"512MB"`, `"50ns"`).
//! This module gives those strings strong types. It provides:
//! 1. **Parsing:** `FromStr` for each quantity, accepting the simulator's unit suffixes.
//! 2. **Formatting:** `Display` back into the same notation using the largest exact unit.
//! 3. **Serde:** Quantities serialize as their display string, so topology dumps stay readable.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::UnitError;

/// Frequency suffixes, largest first.
const FREQUENCY_UNITS: &[(&str, u64)] = &[
    ("THz", 1_000_000_000_000),
    ("GHz", 1_000_000_000),
    ("MHz", 1_000_000),
    ("kHz", 1_000),
    ("Hz", 1),
];

/// Byte-size suffixes, largest first. Decimal-looking suffixes are binary multiples.
const SIZE_UNITS: &[(&str, u64)] = &[
    ("TiB", 1 << 40),
    ("GiB", 1 << 30),
    ("MiB", 1 << 20),
    ("KiB", 1 << 10),
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("kB", 1 << 10),
    ("KB", 1 << 10),
    ("B", 1),
];

/// Suffixes used when printing a byte size.
const SIZE_DISPLAY_UNITS: &[(&str, u64)] = &[
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("kB", 1 << 10),
    ("B", 1),
];

/// Time suffixes in picoseconds, largest first.
const LATENCY_UNITS: &[(&str, u64)] = &[
    ("s", 1_000_000_000_000),
    ("ms", 1_000_000_000),
    ("us", 1_000_000),
    ("ns", 1_000),
    ("ps", 1),
];

/// Splits `"512MB"` into `(512.0, "MB")`.
fn split_quantity(input: &str) -> Result<(f64, &str), UnitError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnitError::Empty);
    }

    let (number, unit) = trimmed.split_at(number_len(trimmed));
    let number = number.trim();
    if number.is_empty() {
        return Err(UnitError::MissingNumber(input.to_string()));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| UnitError::InvalidNumber(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(UnitError::InvalidNumber(input.to_string()));
    }
    Ok((value, unit.trim()))
}

/// Length of the leading float literal of `text`, exponent included.
///
/// An `e`/`E` only counts as an exponent marker when a digit (optionally signed) follows,
/// so `"1e3MB"` splits after `1e3` while `"1EB"` splits after `1`.
fn number_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while let Some(&byte) = bytes.get(idx) {
        match byte {
            b'0'..=b'9' | b'.' | b'+' | b'-' => idx += 1,
            b'e' | b'E' if exponent_follows(&bytes[idx + 1..]) => idx += 1,
            _ => break,
        }
    }
    idx
}

fn exponent_follows(rest: &[u8]) -> bool {
    match rest {
        [digit, ..] if digit.is_ascii_digit() => true,
        [b'+' | b'-', digit, ..] => digit.is_ascii_digit(),
        _ => false,
    }
}

/// Parses `input` against a unit table and returns the quantity in base units.
fn parse_scaled(input: &str, units: &[(&str, u64)], allow_bare: bool) -> Result<u64, UnitError> {
    let (value, unit) = split_quantity(input)?;

    let multiplier = if unit.is_empty() && allow_bare {
        1
    } else {
        units
            .iter()
            .find(|(suffix, _)| *suffix == unit)
            .map(|&(_, mult)| mult)
            .ok_or_else(|| UnitError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })?
    };

    let scaled = value * multiplier as f64;
    if scaled >= u64::MAX as f64 {
        return Err(UnitError::Overflow(input.to_string()));
    }
    let rounded = scaled.round();
    if (scaled - rounded).abs() > 1e-6 {
        return Err(UnitError::NotIntegral(input.to_string()));
    }
    if rounded < 1.0 {
        return Err(UnitError::Zero(input.to_string()));
    }
    Ok(rounded as u64)
}

/// Writes `value` with the largest unit that divides it exactly.
fn fmt_scaled(f: &mut fmt::Formatter<'_>, value: u64, units: &[(&str, u64)]) -> fmt::Result {
    let (suffix, mult) = units
        .iter()
        .copied()
        .find(|&(_, mult)| value != 0 && value % mult == 0)
        .unwrap_or_else(|| units[units.len() - 1]);
    write!(f, "{}{}", value / mult, suffix)
}

/// A clock frequency in hertz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u64);

impl Frequency {
    /// Creates a frequency from a raw hertz value.
    pub const fn from_hz(hz: u64) -> Self {
        Self(hz)
    }

    /// Returns the frequency in hertz.
    pub const fn hz(self) -> u64 {
        self.0
    }

    /// Returns the clock period in picoseconds, rounded to the nearest tick.
    pub fn period(self) -> Latency {
        Latency::from_ps((1e12 / self.0 as f64).round() as u64)
    }
}

impl FromStr for Frequency {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, FREQUENCY_UNITS, false).map(Self)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0, FREQUENCY_UNITS)
    }
}

/// A memory or cache size in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(u64);

impl ByteSize {
    /// Creates a size from a raw byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Creates a size of `kib` kibibytes.
    pub const fn from_kib(kib: u64) -> Self {
        Self(kib << 10)
    }

    /// Creates a size of `mib` mebibytes.
    pub const fn from_mib(mib: u64) -> Self {
        Self(mib << 20)
    }

    /// Returns the size in bytes.
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, SIZE_UNITS, true).map(Self)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0, SIZE_DISPLAY_UNITS)
    }
}

/// A propagation delay in picoseconds (the simulator's tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Latency(u64);

impl Latency {
    /// Creates a latency from picoseconds.
    pub const fn from_ps(ps: u64) -> Self {
        Self(ps)
    }

    /// Creates a latency from nanoseconds.
    pub const fn from_ns(ns: u64) -> Self {
        Self(ns * 1_000)
    }

    /// Returns the latency in picoseconds.
    pub const fn ps(self) -> u64 {
        self.0
    }
}

impl FromStr for Latency {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, LATENCY_UNITS, false).map(Self)
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_scaled(f, self.0, LATENCY_UNITS)
    }
}

macro_rules! string_serde {
    ($($ty:ty),* $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(D::Error::custom)
            }
        }
    )*};
}

string_serde!(Frequency, ByteSize, Latency);
