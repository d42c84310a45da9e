//! CLI entrypoint for `ptv`.
//!
//! Resolves the source and destination codecs, reads one or more inputs
//! (optionally memory-mapped, optionally in parallel), converts each through
//! the intermediate representation, and writes the results.
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, error};
use rayon::prelude::*;

use ptv::codec::registry;
use ptv::convert::{ConvertError, convert};
use ptv::io::{DEFAULT_MMAP_THRESHOLD_BYTES, read_bytes_auto};

#[derive(Parser, Debug)]
#[command(name = "ptv", version, about = "Universal credential-data format converter")]
struct Args {
    /// Source format name
    #[arg(short = 'f', long = "from")]
    from: Option<String>,

    /// Destination format name
    #[arg(short = 't', long = "to")]
    to: Option<String>,

    /// Input file(s); '-' reads stdin
    #[arg(short = 'i', long = "input", default_value = "-")]
    inputs: Vec<PathBuf>,

    /// Output file, or directory when converting multiple inputs;
    /// '-' writes stdout
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: PathBuf,

    /// List available formats and exit
    #[arg(long = "formats")]
    formats: bool,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Convert multiple inputs in parallel
    #[arg(long = "parallel")]
    parallel: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress non-error output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn read_input(path: &PathBuf, threshold: u64) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read stdin")?;
        Ok(buf)
    } else {
        Ok(read_bytes_auto(path, threshold)?.to_vec())
    }
}

fn write_output(path: &PathBuf, data: &[u8]) -> Result<()> {
    if path.as_os_str() == "-" {
        std::io::stdout().write_all(data).context("write stdout")
    } else {
        fs::write(path, data).with_context(|| format!("write {}", path.display()))
    }
}

/// Output path for one input when converting a batch into a directory.
fn batch_output_path(outdir: &PathBuf, input: &PathBuf, to: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    outdir.join(format!("{stem}.{to}"))
}

fn run(args: &Args) -> Result<()> {
    let (Some(from), Some(to)) = (&args.from, &args.to) else {
        bail!("both --from and --to are required (see --formats for names)");
    };

    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };

    if args.inputs.len() <= 1 {
        let input = args
            .inputs
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("-"));
        let raw = read_input(&input, threshold)?;
        let out = convert(registry(), from, to, &raw)?;
        return write_output(&args.output, &out);
    }

    // batch mode: output must be a directory
    if args.output.as_os_str() == "-" {
        bail!("multiple inputs require -o <directory>");
    }
    fs::create_dir_all(&args.output)
        .with_context(|| format!("create output directory {}", args.output.display()))?;

    let convert_one = |input: &PathBuf| -> Result<()> {
        let raw = read_input(input, threshold)?;
        let out = convert(registry(), from, to, &raw)
            .with_context(|| format!("convert {}", input.display()))?;
        write_output(&batch_output_path(&args.output, input, to), &out)
    };

    if args.parallel {
        args.inputs.par_iter().try_for_each(convert_one)
    } else {
        args.inputs.iter().try_for_each(convert_one)
    }
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }

    if args.formats {
        let names = registry().list();
        if !args.quiet {
            println!("{}", format!("{} formats available:", names.len()).bold());
        }
        for name in names {
            println!("  {name}");
        }
        return;
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        eprintln!("{} {:#}", "error:".red().bold(), e);
        let code = match e.downcast_ref::<ConvertError>() {
            Some(ConvertError::InvalidFormat(_)) => 2,
            Some(ConvertError::Parse(_)) => 3,
            Some(ConvertError::Render(_)) => 4,
            None => 1,
        };
        std::process::exit(code);
    }
}
