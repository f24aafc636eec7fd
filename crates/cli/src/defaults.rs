//! Shared default values for the command-line interface.
//! The template is what `init` writes.

pub const CONFIG_FILE: &str = "coalminer.yml";

pub const CONFIG_TEMPLATE: &str = "\
# CoalMiner configuration
#
# Number of sampled populations and one sample size (number of genes) each.
NUM_POPS: 2
SAMPLE_SIZES: [20, 20]

# Prefix of the generated .tpl/.est files. When OBS_FILES is not given,
# every {INPUT_PREFIX}*.obs file of the input directory is copied into
# each replicate directory.
INPUT_PREFIX: mydata

# Priors: type is one of unif, logunif, norm, lognorm.
MODEL_PARAMS:
  mutation_rate_dist:
    type: logunif
    min: 1.0e-9
    max: 1.0e-7
  effective_pop_size_dist:
    type: unif
    min: 100
    max: 100000
  migration_dist:
    type: logunif
    min: 1.0e-5
    max: 1.0e-2
  time_dist:
    type: unif
    min: 100
    max: 10000
  # Upper bound of the spacing between consecutive events.
  max_time_between_events: 1000

# Optional settings.
OUTPUT_DIR: output
NUM_RANDOM_MODELS: 100
# OBS_FILES:
#   - ~/data/mydata_MAFpop0.obs
# SEED: 42
";
