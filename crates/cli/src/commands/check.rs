use anyhow::{Context, Result};
use coalminer_model::params::ParameterSet;
use coalminer_model::topology::Topology;
use std::path::Path;

use crate::printing::{print_parameters, print_topology};

pub fn check_pair(tpl: &Path, est: &Path) -> Result<()> {
    println!("🔍 Checking {} and {}", tpl.display(), est.display());

    let topology = Topology::read(tpl)
        .with_context(|| format!("Failed to read topology {}", tpl.display()))?;
    let params = ParameterSet::read(est, &topology)
        .with_context(|| format!("Failed to read parameters {}", est.display()))?;
    print_topology(&topology);
    print_parameters(&params);
    println!();

    let mut issues = 0;
    match topology.check_matrix_indices() {
        Ok(()) => println!("✓ Migration matrix indices: OK"),
        Err(e) => {
            println!("✗ Migration matrix indices: {e}");
            issues += 1;
        }
    }
    match params.verify_closure(&topology) {
        Ok(()) => println!("✓ Variable declarations: OK"),
        Err(e) => {
            println!("✗ Variable declarations: {e}");
            issues += 1;
        }
    }

    if issues > 0 {
        anyhow::bail!("Found {issues} issue(s)");
    }
    println!("\n✓ Model pair is consistent");
    Ok(())
}
