use anyhow::{Context, Result};
use coalminer_model::config::UserConfig;
use std::path::Path;

use crate::defaults::CONFIG_TEMPLATE;
use crate::printing::print_config;

pub fn write_template(output: &Path, force: bool) -> Result<()> {
    println!("⛏️  CoalMiner - Configuration Template");
    println!("============================================\n");

    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let config = UserConfig::from_yaml_str(CONFIG_TEMPLATE).context("Invalid built-in template")?;
    std::fs::write(output, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_config(&config, config.seed);
    println!("✓ Configuration written to {}", output.display());
    println!("  Edit it, then run: coalminer run {}", output.display());
    Ok(())
}
