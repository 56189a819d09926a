use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uxn_vm::runtime::disasm;
use uxn_vm::{Console, Machine, PROGRAM_ORIGIN};

#[derive(Parser)]
#[command(name = "uxnemu")]
#[command(about = "uxn stack machine emulator")]
struct Args {
    /// ROM image, loaded at 0x0100
    rom: PathBuf,

    /// Stop each run after this many instructions
    #[arg(short, long)]
    budget: Option<u64>,

    /// Do not feed stdin to the console device
    #[arg(long)]
    no_input: bool,

    /// Print a disassembly of the ROM before running it
    #[arg(short, long)]
    disasm: bool,

    /// Print machine state on exit
    #[arg(long)]
    dump: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "uxn_vm=debug,uxnemu=debug",
        _ => "uxn_vm=trace,uxnemu=trace",
    };

    // stdout belongs to the console device
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

fn run(mach: &mut Machine<Console<io::Stdout>>, start: u16, budget: Option<u64>) -> Result<()> {
    match budget {
        Some(budget) => {
            let executed = mach.run_bounded(start, budget)?;
            info!(executed, "vector {:#06x} halted", start);
        }
        None => mach.run(start)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read rom {}", args.rom.display()))?;
    info!("{} bytes", rom.len());

    let mut mach = Machine::new(Console::new(io::stdout()));
    mach.load_image(&rom).context("failed to load rom")?;

    if args.disasm {
        let end = PROGRAM_ORIGIN as usize + rom.len();
        eprint!("{}", disasm::dump_memory(mach.memory(), PROGRAM_ORIGIN, end));
    }

    let result = run(&mut mach, PROGRAM_ORIGIN, args.budget).and_then(|()| {
        if args.no_input {
            return Ok(());
        }

        // One event per byte, each one a full run of the console vector
        for byte in io::stdin().lock().bytes() {
            let byte = byte.context("failed to read stdin")?;
            mach.dispatch_console_input([byte], args.budget)?;
        }
        Ok(())
    });

    if args.dump {
        eprintln!("{}", mach);
    }

    result
}
