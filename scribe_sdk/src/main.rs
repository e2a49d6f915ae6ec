//! # Scribe CLI
//!
//! Loads a document, prepares every test object and prints the evidence.
//!
//! Exit codes: 0 success, 1 at least one object failed, 2 configuration or
//! document error.

use clap::Parser;
use scribe_base::config::available_cpus;
use scribe_base::logging::codes;
use scribe_base::prelude::*;
use scribe_base::{log_error, log_info, log_warning};
use scribe_sdk::create_package_inventory;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_OBJECT_FAILED: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect host evidence for declarative test objects", long_about = None)]
struct Cli {
    /// Document describing the test objects (JSON)
    document: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum directory depth searched below each source root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fail objects on unreadable directories and files
    #[arg(long)]
    strict: bool,

    /// Worker threads used to prepare objects
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print the full evidence report as JSON
    #[arg(long)]
    json: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    fn configuration(err: impl Display) -> Self {
        Self {
            code: EXIT_CONFIGURATION,
            message: err.to_string(),
        }
    }

    fn runtime(err: impl Display) -> Self {
        Self {
            code: EXIT_OBJECT_FAILED,
            message: err.to_string(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, Failure> {
    let config = load_config(cli).map_err(Failure::configuration)?;

    let mut document = Document::from_path(&cli.document).map_err(|err| {
        log_error!(
            codes::lifecycle::DOCUMENT_LOAD_FAILED,
            "Failed to load document",
            "path" => cli.document.display(),
            "error" => &err
        );
        Failure::configuration(err)
    })?;
    document.validate().map_err(Failure::configuration)?;

    let inventory = create_package_inventory(config.command_timeout());
    let summary = document
        .prepare(&config, &inventory)
        .map_err(Failure::runtime)?;

    let report = EvidenceReport::from_document(&document);
    let rendered = if cli.json {
        report.to_json().map_err(Failure::runtime)?
    } else {
        report.summary()
    };

    match &cli.output {
        Some(path) => fs::write(path, format!("{}\n", rendered)).map_err(|err| {
            Failure::runtime(format!("cannot write {}: {}", path.display(), err))
        })?,
        None => println!("{}", rendered),
    }

    log_info!(
        "Scan complete",
        "prepared" => summary.prepared,
        "chain_members" => summary.skipped_chain,
        "failed" => summary.failed.len()
    );

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_OBJECT_FAILED))
    }
}

fn load_config(cli: &Cli) -> Result<ScribeConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ScribeConfig::from_path(path)?,
        None => ScribeConfig::default(),
    };

    if let Some(depth) = cli.max_depth {
        config = config.with_max_depth(depth);
    }
    if cli.strict {
        config = config.strict();
    }
    if let Some(threads) = cli.threads {
        config = config.with_max_threads(clamp_threads(threads));
    }

    config.validate()?;
    Ok(config)
}

fn clamp_threads(requested: usize) -> usize {
    let cpus = available_cpus();
    if requested > cpus {
        log_warning!(
            "Thread count exceeds available CPUs, clamping",
            "requested" => requested,
            "cpus" => cpus
        );
        return cpus;
    }
    requested
}
