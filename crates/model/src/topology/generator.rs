//! Random topology construction.

use super::divergence::divergence_events;
use super::lineage::{admixture_event, bottleneck_events};
use super::migration::{rewrite_matrix_indices, MigrationFamily};
use super::ordering::Schedule;
use super::Topology;
use crate::errors::GenerationError;
use crate::model::{DemeList, SizeVar, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pins for the random decisions of the topology generator.
///
/// Every `None` field is drawn from the random stream with probability 1/2
/// (the migration family by its weights). Setting a family implies migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyOptions {
    pub ghost: Option<bool>,
    pub migration: Option<bool>,
    pub per_matrix_rates: Option<bool>,
    pub family: Option<MigrationFamily>,
    pub admixture: Option<bool>,
    pub bottleneck: Option<bool>,
    pub ancestral_resize: Option<bool>,
}

impl TopologyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ghost(mut self, ghost: bool) -> Self {
        self.ghost = Some(ghost);
        self
    }

    pub fn migration(mut self, migration: bool) -> Self {
        self.migration = Some(migration);
        self
    }

    pub fn per_matrix_rates(mut self, vary: bool) -> Self {
        self.per_matrix_rates = Some(vary);
        self
    }

    pub fn family(mut self, family: MigrationFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn admixture(mut self, admixture: bool) -> Self {
        self.admixture = Some(admixture);
        self
    }

    pub fn bottleneck(mut self, bottleneck: bool) -> Self {
        self.bottleneck = Some(bottleneck);
        self
    }

    pub fn ancestral_resize(mut self, resize: bool) -> Self {
        self.ancestral_resize = Some(resize);
        self
    }
}

fn decide<R: Rng + ?Sized>(pinned: Option<bool>, rng: &mut R) -> bool {
    pinned.unwrap_or_else(|| rng.random_bool(0.5))
}

/// Builds random, structurally valid topologies.
#[derive(Debug, Clone, Default)]
pub struct TopologyGenerator {
    options: TopologyOptions,
}

impl TopologyGenerator {
    pub fn new(options: TopologyOptions) -> Self {
        Self { options }
    }

    /// Generate a topology for `num_pops` sampled populations.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `num_pops` is zero or does not match the number of
    /// sample sizes; `RetryLimit` if a bounded sampling loop gives up.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        num_pops: usize,
        sample_sizes: &[u32],
        rng: &mut R,
    ) -> Result<Topology, GenerationError> {
        if num_pops == 0 {
            return Err(GenerationError::InvalidInput(
                "population count must be at least 1".into(),
            ));
        }
        if sample_sizes.len() != num_pops {
            return Err(GenerationError::InvalidInput(format!(
                "{} sample sizes given for {num_pops} populations",
                sample_sizes.len()
            )));
        }
        let opts = &self.options;

        let ghost = decide(opts.ghost, rng);
        let demes = DemeList::new(num_pops, ghost);

        let migration = opts.family.is_some() || decide(opts.migration, rng);
        let per_matrix_rates = migration && decide(opts.per_matrix_rates, rng);
        debug!(ghost, migration, per_matrix_rates, "Topology decisions");

        let mut schedule = Schedule::new(divergence_events(&demes, opts.ancestral_resize, rng));

        if decide(opts.admixture, rng) {
            if let Some(event) = admixture_event(&demes, rng)? {
                let unit = schedule.add_lineage_unit(vec![event]);
                schedule.place(unit, rng);
            }
        }

        if decide(opts.bottleneck, rng) {
            if let Some([start, end]) = bottleneck_events(&demes, rng) {
                let unit = schedule.add_lineage_unit(vec![start]);
                schedule.place(unit, rng);
                schedule.add_follower(unit, vec![end]);
            }
        }

        let (family, matrices) = if migration {
            let family = match opts.family {
                Some(family) => family,
                None => MigrationFamily::choose(rng)?,
            };
            debug!(%family, "Migration family");

            let mut previous = None;
            for switch in family.switch_events() {
                let unit = schedule.add_free_unit(vec![switch]);
                if let Some(prev) = previous {
                    schedule.require(prev, unit);
                }
                schedule.place(unit, rng);
                previous = Some(unit);
            }
            (Some(family), family.matrices(&demes, per_matrix_rates))
        } else {
            (None, Vec::new())
        };

        debug_assert!(schedule.is_consistent());
        let mut events = schedule.into_events();
        rewrite_matrix_indices(&mut events);

        let mut sample_sizes = sample_sizes.to_vec();
        if ghost {
            sample_sizes.push(0);
        }

        Ok(Topology {
            sizes: demes
                .iter()
                .map(|d| Symbol::Var(SizeVar::Population(d).into()))
                .collect(),
            growth_rates: vec![0.0; demes.len()],
            demes,
            sample_sizes,
            matrices,
            events,
            family,
        })
    }
}
