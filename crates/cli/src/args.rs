use clap::Args;
use coalminer_model::topology::MigrationFamily;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (YAML, or JSON with a .json extension)
    pub config: PathBuf,

    /// Override random seed (default: SEED from the configuration, else random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override output directory (default: OUTPUT_DIR)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override number of replicates (default: NUM_RANDOM_MODELS)
    #[arg(short = 'n', long)]
    pub replicates: Option<usize>,

    /// Directory searched for {INPUT_PREFIX}*.obs when OBS_FILES is not set
    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// Number of sampled populations
    #[arg(short = 'p', long)]
    pub num_pops: usize,

    /// Sample size per population, comma separated (e.g. 20,20,10)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub sample_sizes: Vec<u32>,

    /// Output topology file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Random seed (default: random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Force a ghost population on (true) or off (false)
    #[arg(long)]
    pub ghost: Option<bool>,

    /// Force migration on (true) or off (false)
    #[arg(long)]
    pub migration: Option<bool>,

    /// Force the migration family (IM_THEN_ISO, SECONDARY_CONTACT, CONSTANT_MIG, PULSE)
    ///
    /// Implies migration.
    #[arg(long)]
    pub family: Option<MigrationFamily>,

    /// Force per-matrix migration rates on (true) or off (false)
    #[arg(long)]
    pub vary_rates: Option<bool>,

    /// Force an admixture event on (true) or off (false)
    #[arg(long)]
    pub admixture: Option<bool>,

    /// Force a bottleneck on (true) or off (false)
    #[arg(long)]
    pub bottleneck: Option<bool>,
}

#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Existing topology file
    pub tpl: PathBuf,

    /// Configuration file providing MODEL_PARAMS
    #[arg(short, long)]
    pub config: PathBuf,

    /// Output parameter file
    #[arg(short, long)]
    pub output: PathBuf,
}
