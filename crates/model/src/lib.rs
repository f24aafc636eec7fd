//! # Model Crate
//!
//! The `model` crate generates random, structurally valid demographic
//! histories for coalescent simulation and writes them as fastsimcoal
//! topology (`.tpl`) and parameter (`.est`) files.
//! It includes modules for the shared data model, random topology
//! construction, parameter derivation, user configuration and batch output.

pub mod batch;
pub mod config;
pub mod errors;
pub mod model;
pub mod params;
pub mod prelude;
pub mod topology;

pub use errors::{Error, Result};
pub use params::{ParameterPriors, ParameterSet};
pub use topology::{Topology, TopologyGenerator, TopologyOptions};
