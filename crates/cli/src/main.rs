//! ARM full-system topology builder CLI.
//!
//! This binary builds the board described by its flags and hands it to the simulator. It performs:
//! 1. **Parameters:** Flags, optionally layered over a JSON parameter file.
//! 2. **Build:** Validates the parameters and wires the topology.
//! 3. **Handoff:** Writes the topology into the output directory, runs the simulator on it, and
//!    prints the exit event. With `--dump-config` the topology JSON goes to stdout instead.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use armfs_core::sim::{ExternalEngine, run};
use armfs_core::{BuildParameters, Root, build};

#[derive(Parser, Debug)]
#[command(
    name = "armfs-sim",
    author,
    version,
    about = "Build an ARM full-system topology and run it on an external simulator",
    long_about = "Build a single-cluster ARM board (private L1s, shared L2, DDR3 memory, VExpress platform) \
and boot a Linux kernel on it with an external simulator.\n\n\
Examples:\n  armfs-sim --kernel vmlinux --disk rootfs.img\n  \
armfs-sim --kernel vmlinux --disk rootfs.img --num-cpus 2 --cpu-clock 800MHz\n  \
armfs-sim --config board.json --dump-config"
)]
struct Cli {
    /// Guest kernel image.
    #[arg(long, required_unless_present = "config")]
    kernel: Option<PathBuf>,

    /// Guest disk image (raw).
    #[arg(long, required_unless_present = "config")]
    disk: Option<PathBuf>,

    /// Number of CPU cores [default: 1].
    #[arg(long, allow_negative_numbers = true)]
    num_cpus: Option<i64>,

    /// CPU clock frequency [default: 1GHz].
    #[arg(long)]
    cpu_clock: Option<String>,

    /// System clock frequency [default: 1GHz].
    #[arg(long)]
    sys_clock: Option<String>,

    /// DRAM size [default: 512MB].
    #[arg(long)]
    mem_size: Option<String>,

    /// JSON parameter file; flags given on the command line override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulator binary.
    #[arg(long, default_value = "gem5.opt")]
    simulator: PathBuf,

    /// Extra argument passed to the simulator ahead of the output directory; repeatable.
    #[arg(long = "sim-arg", value_name = "ARG", allow_hyphen_values = true)]
    sim_args: Vec<String>,

    /// Simulator output directory.
    #[arg(long, default_value = "m5out")]
    outdir: PathBuf,

    /// Print the topology as JSON and exit without simulating.
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    /// Resolves the build parameters: file values (or defaults), then command-line overrides.
    fn parameters(&self) -> Result<BuildParameters, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => BuildParameters::from_json_file(path)?,
            None => BuildParameters::default(),
        };

        if let Some(kernel) = &self.kernel {
            params.kernel.clone_from(kernel);
        }
        if let Some(disk) = &self.disk {
            params.disk.clone_from(disk);
        }
        if let Some(num_cpus) = self.num_cpus {
            params.num_cpus = num_cpus;
        }
        if let Some(cpu_clock) = &self.cpu_clock {
            params.cpu_clock.clone_from(cpu_clock);
        }
        if let Some(sys_clock) = &self.sys_clock {
            params.sys_clock.clone_from(sys_clock);
        }
        if let Some(mem_size) = &self.mem_size {
            params.mem_size.clone_from(mem_size);
        }
        Ok(params)
    }
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

    if let Err(err) = execute(&cli) {
        eprintln!("Error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let params = cli.parameters()?;
    let root = Root::full_system(build(&params)?);
    tracing::debug!(?params, "Resolved build parameters");

    if cli.dump_config {
        tracing::info!(num_cpus = root.system.cpus().len(), "Dumping topology to stdout");
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &root)?;
        writeln!(stdout)?;
        return Ok(());
    }

    require_file(&params.kernel)?;
    require_file(&params.disk)?;

    let mut engine = cli
        .sim_args
        .iter()
        .fold(ExternalEngine::new(&cli.simulator, &cli.outdir), |engine, arg| {
            engine.arg(arg)
        });
    tracing::info!(
        simulator = %cli.simulator.display(),
        outdir = %cli.outdir.display(),
        "Handing topology to simulator"
    );
    let event = run(&mut engine, &root)?;
    println!("{event}");
    Ok(())
}

/// Fails with the path in the message if `path` does not exist.
fn require_file(path: &Path) -> io::Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
    }
}
