use anyhow::{Context, Result};
use coalminer_model::topology::{TopologyGenerator, TopologyOptions};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::args::TopologyArgs;
use crate::printing::print_topology;

fn options(args: &TopologyArgs) -> TopologyOptions {
    TopologyOptions {
        ghost: args.ghost,
        migration: args.migration,
        per_matrix_rates: args.vary_rates,
        family: args.family,
        admixture: args.admixture,
        bottleneck: args.bottleneck,
        ancestral_resize: None,
    }
}

pub fn generate_topology(args: &TopologyArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    println!("🌳 Generating topology (seed {seed})");

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let topology = TopologyGenerator::new(options(args))
        .generate(args.num_pops, &args.sample_sizes, &mut rng)
        .context("Failed to generate topology")?;
    topology
        .write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_topology(&topology);
    println!("\n✓ Topology written to {}", args.output.display());
    Ok(())
}
