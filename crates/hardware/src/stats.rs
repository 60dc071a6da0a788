//! Statistics dump extraction.
//!
//! This module pulls a fixed set of metrics out of the simulator's textual stats dump. It provides:
//! 1. **Allow-list:** `STATS_KEYS` and the `AllowList` set built from it.
//! 2. **Scanning:** A best-effort `<key> <value> [# comment]` line scan that skips section
//!    delimiters and every line it does not recognise.
//! 3. **Reporting:** A two-column `metric,value` CSV writer.
//!
//! Only allow-listed keys have their value inspected. For those, a value token that is not a
//! number is fatal: it means the dump does not have the shape this scan assumes.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;

use crate::common::StatsError;

/// Metrics kept by default.
pub const STATS_KEYS: &[&str] = &[
    "sim_seconds",
    "system.cpu.power_model.power",
    "system.cpu.power_model.dynamic",
    "system.cpu.power_model.static",
    "system.mem_ctrl.power_model.power",
    "system.mem_ctrl.power_model.dynamic",
    "system.mem_ctrl.power_model.static",
    "system.cpu.ipc",
];

/// Header row of the CSV report.
pub const CSV_HEADER: &str = "metric,value";

const SECTION_BEGIN: &str = "---------- Begin";
const SECTION_END: &str = "---------- End";

/// One extracted metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatRecord {
    /// Stats key.
    pub metric: String,
    /// Parsed value.
    pub value: f64,
}

impl StatRecord {
    /// Creates a record.
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
        }
    }
}

/// Set of stats keys to keep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    /// Returns whether `key` is kept.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no key is kept.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AllowList {
    /// The `STATS_KEYS` allow-list.
    fn default() -> Self {
        STATS_KEYS.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Returns whether `line` opens or closes a stats section.
fn is_section_delimiter(line: &str) -> bool {
    line.starts_with(SECTION_BEGIN) || line.starts_with(SECTION_END)
}

/// Splits a stats line into its key and value tokens.
///
/// # Returns
///
/// `None` for delimiters, blank lines, single-token lines, and lines whose second token
/// starts or carries a comment.
fn split_stat_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if is_section_delimiter(line) {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let key = tokens.next()?;
    let value = tokens.next()?;
    if value.contains('#') {
        return None;
    }
    Some((key, value))
}

/// Extracts allow-listed records from a stats dump on disk.
///
/// # Arguments
///
/// * `path` - Stats dump.
/// * `allow_list` - Keys to keep.
///
/// # Errors
///
/// Returns [`StatsError::Io`] if the file cannot be opened or read, and
/// [`StatsError::InvalidValue`] if an allow-listed key has a non-numeric value.
pub fn extract(path: &Path, allow_list: &AllowList) -> Result<Vec<StatRecord>, StatsError> {
    let file = File::open(path).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    extract_from_reader(BufReader::new(file), allow_list).map_err(|err| match err {
        StatsError::Read(source) => StatsError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Extracts allow-listed records from any buffered reader.
///
/// Records come out in file order; a key that appears several times yields several records.
///
/// # Errors
///
/// Returns [`StatsError::Read`] on read failure and [`StatsError::InvalidValue`] if an
/// allow-listed key has a non-numeric value.
pub fn extract_from_reader<R: BufRead>(
    reader: R,
    allow_list: &AllowList,
) -> Result<Vec<StatRecord>, StatsError> {
    let mut records = Vec::new();
    let mut lines_read = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(StatsError::Read)?;
        lines_read += 1;

        let Some((key, value)) = split_stat_line(&line) else {
            continue;
        };
        if !allow_list.contains(key) {
            continue;
        }

        let parsed = value
            .parse::<f64>()
            .map_err(|source| StatsError::InvalidValue {
                line: idx + 1,
                key: key.to_string(),
                value: value.to_string(),
                source,
            })?;
        tracing::trace!(key, value = parsed, line = idx + 1, "Kept stat");
        records.push(StatRecord::new(key, parsed));
    }

    tracing::debug!(lines_read, records = records.len(), "Scanned stats dump");
    Ok(records)
}

/// Formats a value in shortest round-trip notation.
///
/// Whole numbers keep a trailing `.0` and very large or small magnitudes use exponent form.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}inf")
    } else {
        format!("{value:?}")
    }
}

/// Quotes a CSV field if it contains a separator, quote, or line break.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes `records` as a `metric,value` CSV report.
///
/// # Errors
///
/// Returns [`StatsError::Write`] if the writer fails.
pub fn write_csv<W: Write>(records: &[StatRecord], mut writer: W) -> Result<(), StatsError> {
    let write = |writer: &mut W| -> io::Result<()> {
        writeln!(writer, "{CSV_HEADER}")?;
        for record in records {
            writeln!(
                writer,
                "{},{}",
                csv_field(&record.metric),
                format_value(record.value)
            )?;
        }
        writer.flush()
    };
    write(&mut writer).map_err(StatsError::Write)
}
