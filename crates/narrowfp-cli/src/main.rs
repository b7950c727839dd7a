use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use narrowfp::{NarrowFormat, Rounding};

mod commands;

/// Top-level CLI argument parser for the `nfp` command
#[derive(Parser)]
#[command(
    name = "nfp",
    about = "narrowfp: bf16/half emulation and builtin conformance checks",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `nfp` CLI
#[derive(Subcommand)]
enum Commands {
    /// Narrow an f32 value and print its bit pattern
    Encode {
        /// Value to encode
        #[arg(allow_hyphen_values = true)]
        value: f32,
        /// Narrow format: bf16 or half
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
        /// Rounding: truncate or nearest_even
        #[arg(short, long, default_value = "truncate")]
        rounding: Rounding,
    },
    /// Widen a 16-bit pattern (hex with 0x prefix, or decimal)
    Decode {
        bits: String,
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
    },
    /// Pack two values into one 32-bit two-lane word
    Pack {
        #[arg(allow_hyphen_values = true)]
        x: f32,
        #[arg(allow_hyphen_values = true)]
        y: f32,
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
        #[arg(short, long, default_value = "truncate")]
        rounding: Rounding,
    },
    /// Unpack a 32-bit two-lane word
    Unpack {
        word: String,
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
    },
    /// Compare a device value against a reference with the format tolerance
    Compare {
        /// Device (narrow) result
        #[arg(allow_hyphen_values = true)]
        actual: f32,
        /// Host reference
        #[arg(allow_hyphen_values = true)]
        expected: f32,
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
        /// Override the format epsilon
        #[arg(long)]
        eps: Option<f32>,
    },
    /// Validate a YAML suite definition
    Validate {
        /// Path to the suite YAML file
        suite: PathBuf,
    },
    /// Run a conformance suite against the emulated device
    Run {
        /// Path to the suite YAML file (defaults to the built-in suite for --type)
        suite: Option<PathBuf>,
        /// Built-in suite to run when no file is given
        #[arg(short, long = "type", default_value = "bf16")]
        ty: NarrowFormat,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check an nd-range against work-group count limits
    Limits {
        /// Global sizes, comma separated (API order, last is x)
        #[arg(long, value_delimiter = ',', required = true)]
        global: Vec<usize>,
        /// Work-group sizes, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        local: Vec<usize>,
        /// Maximum work-groups in x
        #[arg(long)]
        max_x: Option<usize>,
        /// Maximum work-groups in y and z
        #[arg(long)]
        max_yz: Option<usize>,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Encode {
            value,
            ty,
            rounding,
        } => commands::codec::encode(value, ty, rounding),
        Commands::Decode { bits, ty } => commands::codec::decode(&bits, ty),
        Commands::Pack { x, y, ty, rounding } => commands::codec::pack(x, y, ty, rounding),
        Commands::Unpack { word, ty } => commands::codec::unpack(&word, ty),
        Commands::Compare {
            actual,
            expected,
            ty,
            eps,
        } => commands::compare::run(actual, expected, ty, eps),
        Commands::Validate { suite } => commands::validate::run(&suite),
        Commands::Run { suite, ty, format } => {
            match commands::run::OutputFormat::from_str(&format) {
                Ok(fmt) => commands::run::run(suite.as_deref(), ty, fmt),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Limits {
            global,
            local,
            max_x,
            max_yz,
        } => commands::limits::run(&global, &local, max_x, max_yz),
    }
}

/// Install a stderr tracing subscriber honoring `RUST_LOG`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
