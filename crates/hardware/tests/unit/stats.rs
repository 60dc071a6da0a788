//! # Stats Extraction Tests
//!
//! Verifies the line scan against the simulator's dump layout, the allow-list, fatal
//! handling of non-numeric allow-listed values, and the CSV report.

use std::io::Cursor;
use std::path::Path;

use armfs_core::common::StatsError;
use armfs_core::stats::{
    AllowList, CSV_HEADER, STATS_KEYS, StatRecord, extract, extract_from_reader, format_value,
    write_csv,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::harness::{SAMPLE_STATS, write_file};

fn scan(text: &str) -> Result<Vec<StatRecord>, StatsError> {
    extract_from_reader(Cursor::new(text), &AllowList::default())
}

fn csv(records: &[StatRecord]) -> String {
    let mut out = Vec::new();
    write_csv(records, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Allow-list
// ══════════════════════════════════════════════════════════

#[test]
fn default_allow_list_holds_power_and_ipc_keys() {
    let allow = AllowList::default();
    assert_eq!(allow.len(), STATS_KEYS.len());
    assert!(!allow.is_empty());
    for key in STATS_KEYS {
        assert!(allow.contains(key));
    }
    assert!(!allow.contains("sim_ticks"));
}

#[test]
fn custom_allow_list() {
    let allow: AllowList = ["sim_ticks"].into_iter().collect();
    let records = extract_from_reader(Cursor::new(SAMPLE_STATS), &allow).unwrap();
    assert_eq!(records, vec![StatRecord::new("sim_ticks", 2_500_000_000.0)]);
}

// ══════════════════════════════════════════════════════════
// 2. Line scan
// ══════════════════════════════════════════════════════════

#[test]
fn ipc_line_with_comment() {
    let records = scan("system.cpu.ipc                 1.234567  # extra comment\n").unwrap();
    assert_eq!(records, vec![StatRecord::new("system.cpu.ipc", 1.234567)]);
}

#[test]
fn exponent_notation() {
    let records = scan("sim_seconds   2.5e-03\n").unwrap();
    assert_eq!(records, vec![StatRecord::new("sim_seconds", 0.0025)]);
}

#[rstest]
#[case("foo.bar.baz    hello")]
#[case("---------- Begin Simulation Statistics ----------")]
#[case("---------- End Simulation Statistics   ----------")]
#[case("")]
#[case("   ")]
#[case("system.cpu.ipc")]
#[case("system.cpu.ipc   # no value")]
#[case("sim_seconds 0.1#c")]
#[case("system.cpu.ipc   1.5#glued comment")]
#[case("system.cpu.power_model.power::samples   3")]
fn irrelevant_lines_are_skipped(#[case] line: &str) {
    assert!(scan(line).unwrap().is_empty());
}

#[test]
fn non_numeric_allow_listed_value_is_fatal() {
    let err = scan("sim_seconds   0.001\nsystem.cpu.ipc    hello\n").unwrap_err();
    match err {
        StatsError::InvalidValue {
            line, key, value, ..
        } => {
            assert_eq!(line, 2);
            assert_eq!(key, "system.cpu.ipc");
            assert_eq!(value, "hello");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn sample_dump_in_file_order() {
    let records = scan(SAMPLE_STATS).unwrap();
    let keys: Vec<_> = records.iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(
        keys,
        [
            "sim_seconds",
            "system.cpu.ipc",
            "system.cpu.power_model.dynamic",
            "system.cpu.power_model.static",
            "system.cpu.power_model.power",
            "system.mem_ctrl.power_model.dynamic",
            "system.mem_ctrl.power_model.static",
            "system.mem_ctrl.power_model.power",
        ]
    );
    assert_eq!(records[1].value, 1.234567);
}

#[test]
fn repeated_keys_are_all_kept() {
    let records = scan(
        "---------- Begin Simulation Statistics ----------\n\
         system.cpu.ipc 0.5\n\
         ---------- End Simulation Statistics   ----------\n\
         ---------- Begin Simulation Statistics ----------\n\
         system.cpu.ipc 0.75\n\
         ---------- End Simulation Statistics   ----------\n",
    )
    .unwrap();
    assert_eq!(
        records,
        vec![
            StatRecord::new("system.cpu.ipc", 0.5),
            StatRecord::new("system.cpu.ipc", 0.75),
        ]
    );
}

// ══════════════════════════════════════════════════════════
// 3. Files
// ══════════════════════════════════════════════════════════

#[test]
fn extract_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "stats.txt", SAMPLE_STATS);
    let records = extract(&path, &AllowList::default()).unwrap();
    assert_eq!(records.len(), 8);
}

#[test]
fn missing_file_reports_path() {
    let err = extract(Path::new("/nonexistent/stats.txt"), &AllowList::default()).unwrap_err();
    assert!(matches!(err, StatsError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/stats.txt"));
}

#[test]
fn extraction_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "stats.txt", SAMPLE_STATS);

    let first = csv(&extract(&path, &AllowList::default()).unwrap());
    let second = csv(&extract(&path, &AllowList::default()).unwrap());
    assert_eq!(first, second);
}

// ══════════════════════════════════════════════════════════
// 4. CSV report
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0.0025, "0.0025")]
#[case(1.234567, "1.234567")]
#[case(20.0, "20.0")]
#[case(2_500_000_000.0, "2500000000.0")]
#[case(1e-20, "1e-20")]
#[case(f64::NAN, "nan")]
#[case(f64::INFINITY, "inf")]
#[case(f64::NEG_INFINITY, "-inf")]
fn values_use_shortest_round_trip_form(#[case] value: f64, #[case] expected: &str) {
    assert_eq!(format_value(value), expected);
}

#[test]
fn empty_report_is_header_only() {
    assert_eq!(csv(&[]), format!("{CSV_HEADER}\n"));
}

#[test]
fn report_rows_follow_records() {
    let report = csv(&scan(SAMPLE_STATS).unwrap());
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(lines[0], "metric,value");
    assert_eq!(lines[1], "sim_seconds,0.0025");
    assert_eq!(lines[2], "system.cpu.ipc,1.234567");
    assert_eq!(lines[5], "system.cpu.power_model.power,20.812");
    assert_eq!(lines.len(), 9);
}

proptest::proptest! {
    #[test]
    fn formatted_values_parse_back_exactly(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let line = format!("system.cpu.ipc   {}   # sampled", format_value(value));
        let records = scan(&line).unwrap();
        proptest::prop_assert_eq!(records, vec![StatRecord::new("system.cpu.ipc", value)]);
    }

    #[test]
    fn unlisted_keys_never_fail(key in "[a-z]{1,8}(\\.[a-z_]{1,8}){0,3}", value in "\\S{1,12}") {
        proptest::prop_assume!(!AllowList::default().contains(&key));
        let line = format!("{key}   {value}");
        proptest::prop_assert!(scan(&line).unwrap().is_empty());
    }
}
