mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use args::{ParamsArgs, RunArgs, TopologyArgs};
use commands::{check, init, params, run, topology};

/// CoalMiner: random demographic models for fastsimcoal
///
/// Generates randomized but structurally valid population histories and
/// writes them as linked topology (.tpl) and parameter (.est) files.
#[derive(Parser, Debug)]
#[command(name = "coalminer")]
#[command(author, version, about = "Generates random fastsimcoal model pairs", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log every generation decision to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a batch of random model replicates from a configuration file.
    ///
    /// Each replicate gets its own directory holding the .tpl, the .est and a
    /// copy of the observed SFS files.
    Run(RunArgs),

    /// Generate a single random topology file.
    Topology(TopologyArgs),

    /// Derive the parameter file for an existing topology file.
    Params(ParamsArgs),

    /// Check an existing .tpl/.est pair.
    ///
    /// Verifies that every variable is declared exactly once and that the
    /// migration matrix indices follow the migration regime.
    Check {
        /// Topology file
        tpl: PathBuf,

        /// Parameter file
        est: PathBuf,
    },

    /// Write a commented template configuration.
    Init {
        /// Output configuration path
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        tracing::debug!(threads, "Configured global thread pool");
    }

    match cli.command {
        Commands::Run(args) => {
            run::run_batch(&args)?;
        }
        Commands::Topology(args) => {
            topology::generate_topology(&args)?;
        }
        Commands::Params(args) => {
            params::derive_parameters(&args)?;
        }
        Commands::Check { tpl, est } => {
            check::check_pair(&tpl, &est)?;
        }
        Commands::Init { output, force } => {
            init::write_template(&output, force)?;
        }
    }

    Ok(())
}
