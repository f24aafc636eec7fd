//! Batch generation of independent model replicates.
//!
//! Replicate `i` (1-based) is written to `OUTPUT_DIR/random_model_{i}`. Each
//! replicate draws from its own `Xoshiro256PlusPlus` stream, obtained by
//! jumping the master generator `i - 1` times, so the files produced for a
//! seed do not depend on the number of worker threads.

use crate::config::UserConfig;
use crate::errors::{Error, Result};
use crate::params::ParameterSet;
use crate::topology::{MigrationFamily, TopologyGenerator, TopologyOptions};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What one successful replicate produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateSummary {
    pub index: usize,
    pub directory: PathBuf,
    pub family: Option<MigrationFamily>,
    pub events: usize,
    pub simple_parameters: usize,
    pub complex_parameters: usize,
}

#[derive(Debug)]
pub struct ReplicateFailure {
    pub index: usize,
    pub error: Error,
}

/// Outcome of a batch run. Replicates fail independently of each other.
#[derive(Debug)]
pub struct BatchReport {
    pub seed: u64,
    pub output_dir: PathBuf,
    pub completed: Vec<ReplicateSummary>,
    pub failed: Vec<ReplicateFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct BatchDriver {
    config: UserConfig,
    options: TopologyOptions,
    seed: u64,
    input_dir: PathBuf,
}

impl BatchDriver {
    /// Driver for an already validated configuration. Without a `SEED` the
    /// master seed is drawn from the OS.
    pub fn new(config: UserConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            options: TopologyOptions::default(),
            seed,
            input_dir: PathBuf::from("."),
        }
    }

    /// Directory searched for `{INPUT_PREFIX}*.obs` when no `OBS_FILES` are
    /// listed. Defaults to the working directory.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_options(mut self, options: TopologyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &UserConfig {
        &self.config
    }

    pub fn run(&self) -> Result<BatchReport> {
        self.run_with_progress(|_| {})
    }

    /// Run every replicate, calling `on_done` with the replicate index as each
    /// one finishes (successfully or not).
    pub fn run_with_progress<F>(&self, on_done: F) -> Result<BatchReport>
    where
        F: Fn(usize) + Sync,
    {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;
        let obs = self.obs_sources()?;
        info!(
            seed = self.seed,
            replicates = self.config.num_random_models,
            obs_files = obs.len(),
            "Starting batch"
        );

        let mut master = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut streams = Vec::with_capacity(self.config.num_random_models);
        for index in 1..=self.config.num_random_models {
            streams.push((index, master.clone()));
            master.jump();
        }

        let results: Vec<(usize, Result<ReplicateSummary>)> = streams
            .into_par_iter()
            .map(|(index, mut rng)| {
                let result = self.run_replicate(index, &mut rng, &obs);
                on_done(index);
                (index, result)
            })
            .collect();

        let mut report = BatchReport {
            seed: self.seed,
            output_dir: output_dir.clone(),
            completed: Vec::new(),
            failed: Vec::new(),
        };
        for (index, result) in results {
            match result {
                Ok(summary) => report.completed.push(summary),
                Err(error) => {
                    warn!(index, %error, "Replicate failed");
                    report.failed.push(ReplicateFailure { index, error });
                }
            }
        }
        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Batch finished"
        );
        Ok(report)
    }

    fn run_replicate(
        &self,
        index: usize,
        rng: &mut Xoshiro256PlusPlus,
        obs: &[PathBuf],
    ) -> Result<ReplicateSummary> {
        let dir = self.config.output_dir.join(format!("random_model_{index}"));
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        for source in obs {
            let Some(name) = source.file_name() else {
                warn!(path = %source.display(), "Skipping observation path without a file name");
                continue;
            };
            fs::copy(source, dir.join(name)).map_err(|e| Error::io(source, e))?;
        }

        let topology = TopologyGenerator::new(self.options).generate(
            self.config.num_pops,
            &self.config.sample_sizes,
            rng,
        )?;
        let params = ParameterSet::derive(&topology, &self.config.model_params)?;

        topology.write_to(dir.join(self.config.tpl_file_name()))?;
        params.write_to(dir.join(self.config.est_file_name()))?;

        info!(
            index,
            family = %topology.family.map_or_else(|| "none".to_string(), |f| f.to_string()),
            events = topology.events.len(),
            "Wrote replicate"
        );
        Ok(ReplicateSummary {
            index,
            directory: dir,
            family: topology.family,
            events: topology.events.len(),
            simple_parameters: params.simple.len(),
            complex_parameters: params.complex.len(),
        })
    }

    /// Files copied into every replicate directory.
    fn obs_sources(&self) -> Result<Vec<PathBuf>> {
        if !self.config.obs_files.is_empty() {
            return Ok(self.config.obs_paths());
        }
        let files = matching_obs_files(&self.input_dir, &self.config.input_prefix)?;
        if files.is_empty() {
            warn!(
                prefix = %self.config.input_prefix,
                dir = %self.input_dir.display(),
                "No observation files found"
            );
        }
        Ok(files)
    }
}

/// Files in `dir` (or the directory part of `prefix`) named `{prefix}*.obs`,
/// sorted by name.
fn matching_obs_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(prefix);
    let (search_dir, stem) = match (pattern.parent(), pattern.file_name()) {
        (Some(parent), Some(stem)) => (parent.to_path_buf(), stem.to_string_lossy().into_owned()),
        _ => return Ok(Vec::new()),
    };
    let entries = match fs::read_dir(&search_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(&search_dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&search_dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&stem) && name.ends_with(".obs") && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    debug!(count = files.len(), "Matched observation files");
    Ok(files)
}
