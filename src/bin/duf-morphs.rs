use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use duf_morphs::export::{self, ExportOptions};
use duf_morphs::loader::LoadOptions;

/// Export the morph values of every figure in a DAZ Studio .duf scene
#[derive(Parser, Debug)]
#[command(name = "duf-morphs")]
#[command(version, long_about = None)]
struct Args {
    /// Scene file to read
    input: Option<PathBuf>,

    /// Directory for the morphdata_*.json files (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also accept .duf files saved without compression
    #[arg(long)]
    accept_uncompressed: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    wait: bool,

    /// Log each morph found
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = if args.verbose { "debug" } else if args.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn wait_for_enter() {
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

fn run(args: &Args) -> ExitCode {
    let input = match args.input {
        Some(ref x) => x,
        None => {
            println!("Please drag and drop a .duf file.");
            return ExitCode::from(2);
        },
    };

    let opts = ExportOptions {
        load: LoadOptions { accept_uncompressed: args.accept_uncompressed },
        output_dir: args.output_dir.clone(),
    };
    let status = match export::export_morphs(input, &opts) {
        Ok(out) => {
            if !out.resolution.unresolved.is_empty() {
                warn!("{} modifiers had no known parent", out.resolution.unresolved.len());
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("error reading {}: {}", input.display(), e);
            ExitCode::FAILURE
        },
    };
    println!("\n.duf morph extraction done.");
    status
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    let status = run(&args);
    if args.wait {
        wait_for_enter();
    }
    status
}
