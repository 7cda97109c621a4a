//! spillbuf CLI: buffer a stream and replay it, spilling to disk past a threshold.

use clap::{Parser, Subcommand};
use spillbuf_core::{BufferConfig, DEFAULT_MAX_BYTES};
use spillbuf_mem::{ingest, SpillableBuffer};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spillbuf")]
#[command(about = "Buffer a byte stream in memory, spilling to temp files past a threshold", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Buffer the input completely, then write it to the output one or more times
    Buffer {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bytes kept in memory before spilling (overrides env)
        #[arg(long, allow_hyphen_values = true)]
        mem_bytes: Option<i64>,

        /// Maximum total size in bytes (overrides env; -1 lifts any ceiling)
        #[arg(long, allow_hyphen_values = true)]
        max_bytes: Option<i64>,

        /// Directory for spill files (overrides env)
        #[arg(long)]
        spill_dir: Option<String>,

        /// How many times to replay the buffered content
        #[arg(long, default_value_t = 1)]
        passes: usize,
    },

    /// Print the effective configuration (environment + defaults) as JSON
    Config,
}

/// CLI flags layered over the environment configuration.
#[derive(Debug, Default)]
struct Overrides {
    mem_bytes: Option<i64>,
    max_bytes: Option<i64>,
    spill_dir: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct Summary {
    size: u64,
    spilled: bool,
    written: u64,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Buffer {
            input,
            output,
            mem_bytes,
            max_bytes,
            spill_dir,
            passes,
        } => {
            let overrides = Overrides {
                mem_bytes,
                max_bytes,
                spill_dir,
            };
            if let Err(e) = run_buffer(input, output, overrides, passes) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Config => {
            if let Err(e) = print_config() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_buffer(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: Overrides,
    passes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = apply_overrides(BufferConfig::from_env()?, overrides)?;

    let reader: Box<dyn Read> = match &input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let mut buf = ingest(reader, &cfg)?;
    let summary = replay(&mut buf, &mut writer, passes);
    buf.close()?;
    let summary = summary?;
    writer.flush()?;

    eprintln!(
        "buffered {} bytes ({}), wrote {} bytes in {} pass(es)",
        summary.size,
        if summary.spilled { "spilled to disk" } else { "in memory" },
        summary.written,
        passes
    );
    Ok(())
}

fn replay<W: Write + ?Sized>(
    buf: &mut SpillableBuffer,
    sink: &mut W,
    passes: usize,
) -> Result<Summary, Box<dyn std::error::Error>> {
    let mut written = 0;
    for pass in 0..passes {
        if pass > 0 {
            buf.rewind_to_start()?;
        }
        written += buf.write_to(sink)?;
        tracing::info!(pass, written, "replay pass complete");
    }
    Ok(Summary {
        size: buf.size(),
        spilled: buf.is_spilled(),
        written,
    })
}

fn apply_overrides(
    mut cfg: BufferConfig,
    overrides: Overrides,
) -> Result<BufferConfig, Box<dyn std::error::Error>> {
    if let Some(mem) = overrides.mem_bytes {
        cfg = cfg.with_mem_bytes(mem)?;
    }
    match overrides.max_bytes {
        Some(DEFAULT_MAX_BYTES) => cfg.max_bytes = None,
        Some(max) => cfg = cfg.with_max_bytes(max)?,
        None => {}
    }
    if let Some(dir) = overrides.spill_dir {
        cfg = cfg.with_spill_dir(dir);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn print_config() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = BufferConfig::from_env()?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
