//! Data model shared by the topology and parameter generators.
//!
//! - `Deme`/`DemeList`: population identifiers, including the ghost deme.
//! - `Variable`: typed free-parameter names with one canonical spelling.
//! - `HistoricalEvent`: one record of the event section.
//! - `MigrationMatrix`: an N×N grid of fixed zeros and rate variables.
//! - `Prior`: the `{type, min, max}` distribution of a simple parameter.

pub mod deme;
pub mod event;
pub mod matrix;
pub mod prior;
pub mod variable;

pub use deme::{Deme, DemeList};
pub use event::{EventKind, HistoricalEvent};
pub use matrix::{MigrationMatrix, ZERO_RATE};
pub use prior::{DistributionKind, Prior};
pub use variable::{ResizeVar, SizeVar, Symbol, TimeVar, Variable};
