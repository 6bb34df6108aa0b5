//! Command-line driver: elaborated-program JSON in, MCMT text out.
//!
//! All file I/O of the pipeline lives here; the library crates are pure.

use clap::{Parser, Subcommand};
use miette::Diagnostic;
use sable_model::{Config, FaultModel, Program};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    #[diagnostic(help("the file must hold an elaborated program or a fault-model configuration"))]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("elaboration output failed validation: {0}")]
    Elaboration(#[from] sable_model::ModelError),

    #[error(transparent)]
    Translate(#[from] sable_trans::TransError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sable", version)]
#[command(
    about = "Translate elaborated reactive models to MCMT transition systems",
    long_about = None
)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a program file and render the transition system
    Translate {
        /// Elaborated program (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path; stdout when absent
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fault-model configuration (JSON); defaults to no faults
        #[arg(long, value_name = "FILE")]
        faults: Option<PathBuf>,

        /// Emit comment headers in the output
        #[arg(long)]
        debug: bool,
    },

    /// Check a program file against the elaborator invariants
    Validate {
        /// Elaborated program (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Translate {
            file,
            output,
            faults,
            debug,
        } => cmd_translate(&file, output.as_deref(), faults.as_deref(), debug)?,
        Commands::Validate { file } => cmd_validate(&file)?,
    }
    Ok(())
}

fn cmd_translate(
    file: &Path,
    output: Option<&Path>,
    faults: Option<&Path>,
    debug: bool,
) -> CliResult<()> {
    let program = load_program(file)?;
    let fault_model = match faults {
        Some(path) => load_json::<FaultModel>(path)?,
        None => FaultModel::NoFaults,
    };
    let config = Config { debug, fault_model };

    let mcmt = sable_trans::translate(&program, &config)?;
    let text = sable_mcmt::render(&mcmt, config.debug);

    match output {
        Some(path) => {
            fs::write(path, &text).map_err(|source| CliError::Write {
                path: path.display().to_string(),
                source,
            })?;
            info!(
                system = %program.name,
                output = %path.display(),
                "wrote transition system"
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_validate(file: &Path) -> CliResult<()> {
    let program = load_program(file)?;
    program.validate()?;
    info!(
        system = %program.name,
        rules = program.rules.len(),
        channels = program.channels.len(),
        "program is well formed"
    );
    Ok(())
}

fn load_program(path: &Path) -> CliResult<Program> {
    load_json(path)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.display().to_string(),
        source,
    })
}
