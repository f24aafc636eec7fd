use anyhow::{Context, Result};
use coalminer_model::batch::BatchDriver;
use coalminer_model::config::UserConfig;
use indicatif::{ProgressBar, ProgressStyle};

use crate::args::RunArgs;
use crate::printing::{print_config, print_report};

pub fn run_batch(args: &RunArgs) -> Result<()> {
    println!("⛏️  CoalMiner - Generating Random Models");
    println!("============================================\n");

    let mut config = UserConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(replicates) = args.replicates {
        config.num_random_models = replicates;
    }
    config.validate().context("Invalid configuration after overrides")?;

    let driver = BatchDriver::new(config).with_input_dir(&args.input_dir);
    print_config(driver.config(), Some(driver.seed()));

    let total = driver.config().num_random_models;
    let pb = if args.progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = driver
        .run_with_progress(|_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        })
        .context("Failed to prepare output directory")?;
    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    print_report(&report);
    if !report.is_success() {
        anyhow::bail!(
            "{} of {total} replicates failed",
            report.failed.len()
        );
    }

    println!("\n✓ Wrote {total} models to {}", report.output_dir.display());
    Ok(())
}
