//! dust-convert: turns the hourly AQI CSV into hex packet lines.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use dustlink_core::config::DustlinkConfig;
use dustlink_core::verify::verify;
use dustlink_core::{Converter, TimestampMode};

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct Cli {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    strict_time: bool,
    verify: bool,
    help: bool,
}

impl Cli {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cli = Cli::default();
        let mut positional: Vec<PathBuf> = Vec::new();

        for arg in args {
            match arg.as_str() {
                "--strict-time" => cli.strict_time = true,
                "--verify" => cli.verify = true,
                "--help" | "-h" => cli.help = true,
                flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
                path => positional.push(PathBuf::from(path)),
            }
        }

        let max_positional = if cli.verify { 1 } else { 2 };
        if positional.len() > max_positional {
            warn!(
                ignored = positional.len() - max_positional,
                "ignoring extra arguments"
            );
            positional.truncate(max_positional);
        }
        let mut positional = positional.into_iter();
        cli.input = positional.next();
        cli.output = positional.next();
        Ok(cli)
    }
}

fn print_usage() {
    println!("Usage: dust-convert [--strict-time] [input.csv] [output.dat]");
    println!("       dust-convert --verify [packets.dat]");
    println!();
    println!("Options:");
    println!("  --strict-time   Skip rows whose timestamp does not fully parse");
    println!("  --verify        Check every line of a hex packet file");
    println!("  -h, --help      Show this help");
    println!();
    println!("Defaults come from $DUSTLINK_CONFIG or ~/.config/dustlink/config.toml,");
    println!("then dust_aqi.csv and hex_packet.dat.");
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_convert(cli: &Cli, config: &DustlinkConfig) -> Result<ExitCode> {
    let input = cli.input.clone().unwrap_or_else(|| config.paths.input.clone());
    let output = cli.output.clone().unwrap_or_else(|| config.paths.output.clone());
    let mode = if cli.strict_time {
        TimestampMode::Strict
    } else {
        config.codec.timestamp_mode
    };

    println!("Converting: {} -> {}", input.display(), output.display());

    let reader = match File::open(&input) {
        Ok(file) => BufReader::new(file),
        Err(e) => {
            debug!(error = %e, path = %input.display(), "open failed");
            println!("Error: Cannot open input file {}", input.display());
            return Ok(ExitCode::FAILURE);
        }
    };
    let writer = match File::create(&output) {
        Ok(file) => BufWriter::new(file),
        Err(e) => {
            debug!(error = %e, path = %output.display(), "create failed");
            println!("Error: Cannot create output file {}", output.display());
            return Ok(ExitCode::FAILURE);
        }
    };

    let summary = Converter::new(mode)
        .run(reader, writer)
        .with_context(|| format!("conversion of {} failed", input.display()))?;

    println!("Conversion completed: {} packets created", summary.packets);
    println!("Output file: {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify(cli: &Cli, config: &DustlinkConfig) -> Result<ExitCode> {
    let path = cli.input.clone().unwrap_or_else(|| config.paths.output.clone());

    println!("Verifying: {}", path.display());

    let reader = match File::open(&path) {
        Ok(file) => BufReader::new(file),
        Err(e) => {
            debug!(error = %e, path = %path.display(), "open failed");
            println!("Error: Cannot open input file {}", path.display());
            return Ok(ExitCode::FAILURE);
        }
    };

    let summary = verify(reader).with_context(|| format!("verification of {} failed", path.display()))?;

    println!("Valid packets    : {}", summary.valid);
    println!("Corrupt packets  : {}", summary.corrupt);
    println!("Inconsistent AQI : {}", summary.inconsistent);

    Ok(if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match Cli::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            print_usage();
            return Ok(ExitCode::FAILURE);
        }
    };
    if cli.help {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let config = DustlinkConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        DustlinkConfig::default()
    });

    if cli.verify {
        cmd_verify(&cli, &config)
    } else {
        cmd_convert(&cli, &config)
    }
}
