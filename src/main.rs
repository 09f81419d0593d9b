//! VM Simulator - Main Entry Point
//!
//! Reads paging commands (READ, WRITE, PAGES, FRAMES, TIME, REF, CLEAR)
//! from a file or standard input and prints how each access is translated.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use vm_simulator::constants::{FRAMES_IN_RAM, OFFSET_BITS, PAGES_IN_PROCESS, PROMPT};
use vm_simulator::io::run_commands;
use vm_simulator::{EvictionPolicy, MemoryManager, SimConfig, SimError, VictimScan};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Evict the least recently accessed frame
    Time,
    /// Evict by reference bit
    Ref,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanArg {
    /// Reference-bit policy considers present pages only
    Present,
    /// Reference-bit policy scans every page
    All,
}

#[derive(Parser, Debug)]
#[command(name = "vm-simulator")]
#[command(about = "Simulate demand-paged address translation and frame eviction")]
#[command(version)]
struct Cli {
    /// Command file; standard input when omitted
    input: Option<PathBuf>,

    /// Number of frames in RAM
    #[arg(short, long, default_value_t = FRAMES_IN_RAM)]
    frames: usize,

    /// Number of pages in the process
    #[arg(short, long, default_value_t = PAGES_IN_PROCESS)]
    pages: usize,

    /// Bits of a virtual address used for the in-page offset
    #[arg(long, default_value_t = OFFSET_BITS)]
    offset_bits: u32,

    /// Initial eviction policy
    #[arg(long, value_enum, default_value = "time")]
    policy: PolicyArg,

    /// Pages the reference-bit policy may pick as unreferenced
    #[arg(long, value_enum, default_value = "present")]
    victim_scan: ScanArg,

    /// Log faults and evictions, print a summary at the end
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn build_config(cli: &Cli) -> SimConfig {
    let victim_scan = match cli.victim_scan {
        ScanArg::Present => VictimScan::PresentPages,
        ScanArg::All => VictimScan::AllPages,
    };
    SimConfig::new(cli.frames, cli.pages, cli.offset_bits).with_victim_scan(victim_scan)
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<(), SimError> {
    let config = build_config(cli);
    let policy = match cli.policy {
        PolicyArg::Time => EvictionPolicy::Timestamp,
        PolicyArg::Ref => EvictionPolicy::ReferenceBit,
    };
    let mut mm = MemoryManager::new(config)?.with_policy(policy);

    if cli.verbose {
        eprintln!("=== VM Simulator ===");
        eprintln!("Config: {}", mm.config());
        eprintln!("Policy: {}", policy);
        eprintln!();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.input {
        Some(path) => {
            let file = File::open(path)?;
            run_commands(BufReader::new(file), &mut mm, &mut out, None)?;
        }
        None => {
            let stdin = io::stdin();
            // prompt only for a human at the keyboard
            let prompt = stdin.is_terminal().then_some(PROMPT);
            run_commands(stdin.lock(), &mut mm, &mut out, prompt)?;
        }
    }

    if cli.verbose {
        let stats = mm.stats();
        eprintln!();
        eprintln!("=== Summary ===");
        eprintln!("Accesses:    {}", stats.accesses);
        eprintln!("Page faults: {}", stats.faults);
        eprintln!("Evictions:   {}", stats.evictions);
        eprintln!("Fault rate:  {:.2}%", stats.fault_rate() * 100.0);
    }

    Ok(())
}
