//! Cache hierarchy simulator CLI.
//!
//! Reads a memory-reference trace (stdin by default), runs it through the
//! configured L1i/L1d/L2/memory hierarchy, and prints the statistics and cost
//! report. Configuration starts from built-in defaults; each JSON file named
//! on the command line is applied as an overlay in order, later files winning
//! field-by-field.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::config::{Config, ConfigOverlay};
use cachesim_core::Simulation;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    version,
    about = "Trace-driven multi-level cache hierarchy simulator",
    long_about = "Simulate a memory trace against two private L1 caches, a shared L2, and \
                  main memory.\n\nTrace records are `<op> <inst_addr> <data>` with op in \
                  {L,S,B,C} and hex addresses. The run ends at end of input or the first \
                  malformed record.\n\nExamples:\n  cachesim < trace.din\n  cachesim \
                  big-l2.json --trace trace.din"
)]
struct Cli {
    /// JSON configuration overlays, applied in order over the defaults.
    configs: Vec<PathBuf>,

    /// Trace file to simulate; stdin when omitted.
    #[arg(short, long)]
    trace: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&Cli::parse()) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::default();
    for path in &cli.configs {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {e}", path.display()))?;
        let overlay = ConfigOverlay::from_json(&source)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        config.apply(&overlay);
    }
    let resolved = config.resolve()?;

    let mut sim = Simulation::new(&resolved);
    let processed = match &cli.trace {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("opening {}: {e}", path.display()))?;
            sim.run(BufReader::new(file))?
        }
        None => sim.run(io::stdin().lock())?,
    };
    info!(processed, "trace complete");

    print!("{}", sim.report());
    Ok(())
}
