//! Prior distributions for simple parameters.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution families understood by fastsimcoal's estimation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    #[serde(rename = "unif")]
    Uniform,
    #[serde(rename = "logunif")]
    LogUniform,
    #[serde(rename = "norm")]
    Normal,
    #[serde(rename = "lognorm")]
    LogNormal,
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "unif"),
            Self::LogUniform => write!(f, "logunif"),
            Self::Normal => write!(f, "norm"),
            Self::LogNormal => write!(f, "lognorm"),
        }
    }
}

impl std::str::FromStr for DistributionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unif" => Ok(Self::Uniform),
            "logunif" => Ok(Self::LogUniform),
            "norm" => Ok(Self::Normal),
            "lognorm" => Ok(Self::LogNormal),
            _ => Err(format!(
                "Unknown distribution: {s}. Available: unif, logunif, norm, lognorm"
            )),
        }
    }
}

/// `{type, min, max}` triple attached to a simple parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    #[serde(rename = "type")]
    pub kind: DistributionKind,
    pub min: f64,
    pub max: f64,
}

impl Prior {
    pub fn new(kind: DistributionKind, min: f64, max: f64) -> Self {
        Self { kind, min, max }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        Self::new(DistributionKind::Uniform, min, max)
    }

    /// Same family with different bounds.
    pub fn with_bounds(&self, min: f64, max: f64) -> Self {
        Self::new(self.kind, min, max)
    }

    /// Check that both bounds are finite and ordered. `name` labels the error.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "{name}: bounds must be finite (got {} .. {})",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidValue(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if matches!(self.kind, DistributionKind::LogUniform) && self.min <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "{name}: logunif requires a positive min (got {})",
                self.min
            )));
        }
        Ok(())
    }
}
