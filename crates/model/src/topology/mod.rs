//! Topology generation: demes, migration matrices and the ordered list of
//! historical events, plus their `.tpl` text form.
//!
//! # Examples
//!
//! ```
//! use coalminer_model::topology::{TopologyGenerator, TopologyOptions};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
//! let generator = TopologyGenerator::new(TopologyOptions::new().ghost(false));
//! let topology = generator.generate(3, &[10, 10, 10], &mut rng).unwrap();
//! assert_eq!(topology.divergences().count(), 2);
//! ```

pub mod divergence;
mod format;
pub mod generator;
pub mod lineage;
pub mod migration;
pub mod ordering;

pub use generator::{TopologyGenerator, TopologyOptions};
pub use lineage::MAX_SAMPLING_ATTEMPTS;
pub use migration::MigrationFamily;

use crate::errors::{Error, GenerationError, Result};
use crate::model::{DemeList, EventKind, HistoricalEvent, MigrationMatrix, Symbol, Variable};
use std::path::Path;

/// A complete demographic history, most recent event first.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub demes: DemeList,
    /// Effective-size field per deme, in deme order.
    pub sizes: Vec<Symbol>,
    /// Sample size per deme; the ghost always samples 0.
    pub sample_sizes: Vec<u32>,
    pub growth_rates: Vec<f64>,
    pub matrices: Vec<MigrationMatrix>,
    pub events: Vec<HistoricalEvent>,
    pub family: Option<MigrationFamily>,
}

impl Topology {
    /// Every variable referenced anywhere in the topology, in file order.
    /// Repeated references are repeated.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.sizes
            .iter()
            .filter_map(Symbol::variable)
            .chain(self.matrices.iter().flat_map(MigrationMatrix::variables))
            .chain(self.events.iter().flat_map(HistoricalEvent::variables))
    }

    pub fn divergences(&self) -> impl Iterator<Item = &HistoricalEvent> {
        self.events
            .iter()
            .filter(|e| e.kind() == EventKind::Divergence)
    }

    /// Check that event matrix indices fit the matrix list and follow the
    /// migration family's regime order.
    pub fn check_matrix_indices(&self) -> std::result::Result<(), GenerationError> {
        let indices: Vec<usize> = self.events.iter().map(|e| e.matrix_index).collect();
        let fail = |msg: String| Err(GenerationError::MatrixIndex(msg));

        if let Some(&max) = indices.iter().max() {
            if self.matrices.is_empty() && max > 0 {
                return fail(format!("event references matrix {max} but none are defined"));
            }
            if !self.matrices.is_empty() && max >= self.matrices.len() {
                return fail(format!(
                    "event references matrix {max} but only {} are defined",
                    self.matrices.len()
                ));
            }
        }

        match self.family {
            Some(MigrationFamily::ImThenIso | MigrationFamily::SecondaryContact) => {
                if let Some(first) = indices.iter().position(|&i| i == 1) {
                    if indices[first..].contains(&0) {
                        return fail(format!("{} regime returns to matrix 0: {indices:?}", self.family_name()));
                    }
                }
            }
            Some(MigrationFamily::Pulse) => {
                if indices.windows(2).any(|w| w[0] > w[1]) {
                    return fail(format!("PULSE indices decrease: {indices:?}"));
                }
            }
            Some(MigrationFamily::ConstantMig) | None => {
                if indices.iter().any(|&i| i != 0) {
                    return fail(format!("{} uses a single matrix: {indices:?}", self.family_name()));
                }
            }
        }
        Ok(())
    }

    fn family_name(&self) -> String {
        self.family
            .map_or_else(|| "NO_MIGRATION".to_string(), |f| f.to_string())
    }

    /// Write the `.tpl` text to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).map_err(|e| Error::io(path, e))
    }

    /// Read and parse a `.tpl` file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(text.parse()?)
    }
}
