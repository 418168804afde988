//! Badger CLI
//!
//! Runs a Brainfuck source file against stdin/stdout. Diagnostics go to
//! stderr with the 1-based line:column where the condition was detected.
//!
//! Exit codes (closed enumeration, sysexits-flavored):
//! - 0  — successful halt
//! - 2  — usage error (clap's convention)
//! - 65 — structural fault: unmatched bracket at priming or runtime
//! - 66 — source file unreadable, or an I/O fault mid-run
//! - 70 — runtime bounds fault (data pointer left the tape)
//! - 71 — allocation fault at startup

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use badger_vm::{Interpreter, VmError};
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "badger", version, about = "Badger Brainfuck interpreter")]
struct Cli {
    /// Source file to execute
    source: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli.source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("badger: {}: {err}", cli.source.display());
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(source: &Path) -> Result<(), VmError> {
    let file = File::open(source)?;
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    let mut interpreter = Interpreter::new(file, stdin, stdout)?;
    interpreter.run()
}

fn exit_code(err: &VmError) -> u8 {
    match err {
        VmError::Io(_) => 66,
        VmError::UnmatchedClose { .. } | VmError::UnbalancedOpen { .. } => 65,
        VmError::PointerUnderflow { .. } | VmError::PointerOverflow { .. } => 70,
        VmError::Allocation(_) => 71,
        VmError::Bytecode(_) => 70,
    }
}
