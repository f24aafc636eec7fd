use coalminer_model::batch::BatchReport;
use coalminer_model::config::UserConfig;
use coalminer_model::model::{EventKind, Prior};
use coalminer_model::params::ParameterSet;
use coalminer_model::topology::Topology;

fn prior(p: &Prior) -> String {
    format!("{} [{}, {}]", p.kind, p.min, p.max)
}

pub fn print_config(config: &UserConfig, seed: Option<u64>) {
    let priors = &config.model_params;
    println!("\n📋 Batch Configuration");
    println!("  • Populations: {} (samples {:?})", config.num_pops, config.sample_sizes);
    println!("  • Input Prefix: {}", config.input_prefix);
    println!("  • Replicates: {} [-n, --replicates]", config.num_random_models);
    println!("  • Output Directory: {} [-o, --output-dir]", config.output_dir.display());
    match seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }
    if config.obs_files.is_empty() {
        println!("  • Observed SFS: {}*.obs", config.input_prefix);
    } else {
        println!("  • Observed SFS: {} file(s)", config.obs_files.len());
    }

    println!("\n🎲 Priors");
    println!("  • Mutation Rate: {}", prior(&priors.mutation_rate));
    println!("  • Effective Size: {}", prior(&priors.effective_size));
    println!("  • Migration Rate: {}", prior(&priors.migration));
    println!("  • Event Time: {}", prior(&priors.time));
    println!("  • Max Gap Between Events: {}", priors.max_time_between_events);
    println!();
}

pub fn print_topology(topology: &Topology) {
    let count = |kind: EventKind| topology.events.iter().filter(|e| e.kind() == kind).count();
    println!("\n🌳 Topology");
    println!(
        "  • Demes: {}{}",
        topology.demes.len(),
        if topology.demes.has_ghost() { " (incl. ghost)" } else { "" }
    );
    println!("  • Divergences: {}", count(EventKind::Divergence));
    println!("  • Admixtures: {}", count(EventKind::Admixture));
    println!("  • Bottlenecks: {}", count(EventKind::BottleneckStart));
    match topology.family {
        Some(family) => println!(
            "  • Migration: {family} ({} matrices)",
            topology.matrices.len()
        ),
        None => println!("  • Migration: none"),
    }
}

pub fn print_parameters(params: &ParameterSet) {
    println!("\n📐 Parameters");
    println!("  • Simple: {}", params.simple.len());
    println!("  • Complex: {}", params.complex.len());
}

pub fn print_report(report: &BatchReport) {
    println!("\n📊 Summary");
    println!("  • Completed: {}", report.completed.len());
    println!("  • Failed: {}", report.failed.len());
    let mut families: Vec<(String, usize)> = Vec::new();
    for summary in &report.completed {
        let name = summary
            .family
            .map_or_else(|| "no migration".to_string(), |f| f.to_string());
        match families.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => families.push((name, 1)),
        }
    }
    families.sort();
    for (name, count) in families {
        println!("    - {name}: {count}");
    }
    for failure in &report.failed {
        println!("  ✗ random_model_{}: {}", failure.index, failure.error);
    }
}
