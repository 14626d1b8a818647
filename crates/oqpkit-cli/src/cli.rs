use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "OQPKit Developers",
    version,
    about = "OQPKit CLI - Run OpenQP computations and extract optimized geometries and molecular orbitals from their output.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `oqpkit/config.toml` in the user configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S runtime.image=openqp:latest
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an OpenQP job and stream its output until it finishes. Ctrl-C kills the job.
    Run(RunArgs),
    /// Extract the last optimized geometry from an OpenQP log and save it as XYZ.
    Geometry(GeometryArgs),
    /// Inspect the atoms and molecular orbitals of a Molden file.
    Orbitals(OrbitalsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the OpenQP input file (e.g., water.inp).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Working directory mounted into the container.
    /// Defaults to the directory containing the input file.
    #[arg(short, long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Override the container image from the config file.
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Name the container so that cancellation also kills it.
    #[arg(long, value_name = "NAME")]
    pub container_name: Option<String>,

    /// Extract the optimized geometry from the job log once the job succeeds.
    #[arg(short = 'g', long)]
    pub extract_geometry: bool,

    /// Job name used for the extracted geometry file. Defaults to the input file stem.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub job_name: Option<String>,
}

/// Arguments for the `geometry` subcommand.
#[derive(Args, Debug)]
pub struct GeometryArgs {
    /// Path to the OpenQP log file of an optimization run.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub log: PathBuf,

    /// Job name used for the output file. Defaults to the log file stem.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub job_name: Option<String>,

    /// Directory for the output file. Defaults to the directory containing the log.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `orbitals` subcommand.
#[derive(Args, Debug)]
pub struct OrbitalsArgs {
    /// Path to the Molden file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub molden: PathBuf,

    /// Print the lines of the orbital at this zero-based index instead of a summary.
    #[arg(long, value_name = "INT")]
    pub index: Option<usize>,
}
