use clap::{ Parser, Subcommand };
use std::path::PathBuf;

use wfomc_sweep::{ DispatchPolicy, OracleKind };

pub mod commands;
pub mod ui;

#[derive(Parser)]
#[command(
    name = "wfomc-sweep",
    about = "Resumable sweeps of exact weighted model counts over growing domain sizes",
    version,
    author,
    long_about = None
)]
pub struct SweepCli {
    /// Sets the log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the checkpoint files
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Oracle selection shared by the commands that evaluate
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OracleArgs {
    /// Counting oracle (grounding, external)
    #[arg(long)]
    pub oracle: Option<OracleKind>,

    /// External oracle program
    #[arg(long)]
    pub oracle_command: Option<String>,

    /// Largest number of ground atoms the grounding oracle accepts
    #[arg(long)]
    pub max_ground_atoms: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate every catalog property for increasing n, checkpointing each result
    Run {
        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Stop before this n (exclusive)
        #[arg(short = 'n', long)]
        max_n: Option<u64>,

        /// Dispatch policy (resubmit, sweep)
        #[arg(short, long)]
        policy: Option<DispatchPolicy>,

        /// Per-unit timeout in seconds
        #[arg(short, long)]
        timeout: Option<f64>,

        /// Only run these properties (repeatable)
        #[arg(long = "property")]
        properties: Vec<String>,

        #[command(flatten)]
        oracle: OracleArgs,
    },

    /// Show the resume point and last result of every property
    Status {
        /// Only show these properties (repeatable)
        #[arg(long = "property")]
        properties: Vec<String>,
    },

    /// List the property catalog
    List,

    /// Evaluate one property at one n without checkpointing
    Eval {
        /// Property name
        #[arg(short, long)]
        property: String,

        /// Index to evaluate
        #[arg(short, long)]
        n: u64,

        #[command(flatten)]
        oracle: OracleArgs,
    },
}
