use anyhow::{Context, Result};
use coalminer_model::config::UserConfig;
use coalminer_model::params::ParameterSet;
use coalminer_model::topology::Topology;

use crate::args::ParamsArgs;
use crate::printing::print_parameters;

pub fn derive_parameters(args: &ParamsArgs) -> Result<()> {
    println!("📐 Deriving parameters for {}", args.tpl.display());

    let config = UserConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    let topology = Topology::read(&args.tpl)
        .with_context(|| format!("Failed to read topology {}", args.tpl.display()))?;

    let params = ParameterSet::derive(&topology, &config.model_params)
        .context("Derived parameters do not cover the topology")?;
    params
        .write_to(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_parameters(&params);
    println!("\n✓ Parameters written to {}", args.output.display());
    Ok(())
}
