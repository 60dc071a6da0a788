//! Stats dump to CSV converter.
//!
//! Reads a simulator `stats.txt`, keeps the power, IPC, and simulated-time metrics, and writes
//! them to stdout as a `metric,value` CSV. On any error nothing is written to stdout.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use armfs_core::stats::{self, AllowList};

#[derive(Parser, Debug)]
#[command(
    name = "parse-stats",
    author,
    version,
    about = "Extract power and performance metrics from a simulator stats dump as CSV"
)]
struct Cli {
    /// Stats dump, e.g. m5out/stats.txt.
    stats_file: PathBuf,
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprint!("{err}");
                process::exit(1);
            }
        },
    };

    let records = match stats::extract(&cli.stats_file, &AllowList::default()) {
        Ok(records) => records,
        Err(err) => fail(&err),
    };
    tracing::debug!(
        path = %cli.stats_file.display(),
        records = records.len(),
        "Extracted stats"
    );

    if let Err(err) = stats::write_csv(&records, io::stdout().lock()) {
        fail(&err);
    }
}

/// Prints `err` and its causes to stderr and exits with status 1.
fn fail(err: &dyn Error) -> ! {
    eprintln!("Error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    process::exit(1);
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
