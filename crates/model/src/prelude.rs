//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use coalminer_model::prelude::*;
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
//! let topology = TopologyGenerator::default()
//!     .generate(2, &[10, 10], &mut rng)
//!     .unwrap();
//! assert!(topology.to_string().starts_with("//Number of population samples"));
//! ```

pub use crate::batch::{BatchDriver, BatchReport};
pub use crate::config::UserConfig;
pub use crate::errors::{self, ConfigError, Error, GenerationError, ParseError};
pub use crate::model::{Deme, DemeList, DistributionKind, HistoricalEvent, Prior, Symbol, Variable};
pub use crate::params::{ParameterPriors, ParameterSet};
pub use crate::topology::{MigrationFamily, Topology, TopologyGenerator, TopologyOptions};
