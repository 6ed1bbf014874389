/*
cargo run --bin split_jsonl -- \
    data/turkce_veriseti/corpus.jsonl \
    data/turkce_veriseti/chunks \
    --max-size 80 --progress --log-dir logs
*/

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use jsonl_split::{ChunkWriter, SplitConfig, DEFAULT_MAX_SIZE_MB};
use log::{error, info};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

// Split a large JSONL file into chunks no bigger than --max-size megabytes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    // Input JSONL file
    input_file: PathBuf,

    // Output directory (created if missing)
    output_dir: PathBuf,

    // Maximum chunk size in MB
    #[arg(long = "max-size", value_name = "MB", default_value_t = DEFAULT_MAX_SIZE_MB,
          value_parser = clap::value_parser!(u64).range(1..))]
    max_size: u64,

    // Show a byte progress bar while streaming
    #[arg(long)]
    progress: bool,

    // Also write a timestamped log file into this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    // Write a JSON manifest of the produced chunks
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    // Log debug details to the terminal
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    // Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Cannot initialise logging: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = SplitConfig::builder()
        .max_size_mb(args.max_size)
        .show_progress(args.progress && !args.quiet)
        .build()?;

    info!(
        "Started - input: {:?}, output_dir: {:?}, max_size: {} MB",
        args.input_file, args.output_dir, args.max_size
    );

    let writer = ChunkWriter::new(config);
    let report = writer
        .split_with(&args.input_file, &args.output_dir, |chunk| {
            if !args.quiet {
                println!("{} ({:.2} MB)", chunk.path.display(), chunk.megabytes());
            }
        })
        .with_context(|| format!("Failed to split {}", args.input_file.display()))?;

    if !args.quiet {
        if report.short_circuit {
            println!("Input already within {} MB, copied as is.", args.max_size);
        } else {
            println!("Created {} chunks.", report.chunks.len());
        }
    }

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote chunk manifest to {:?}", path);
    }

    info!("Finished");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let term_level = if args.quiet {
        LevelFilter::Error
    } else if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        ConfigBuilder::new().build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(dir) = &args.log_dir {
        create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = dir.join(format!("split_jsonl_{ts}.log"));
        loggers.push(WriteLogger::new(
            LevelFilter::Info,
            ConfigBuilder::new().build(),
            File::create(&log_path)
                .with_context(|| format!("Cannot open {}", log_path.display()))?,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
