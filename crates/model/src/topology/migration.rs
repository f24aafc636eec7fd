//! Migration regimes and the matrices they need.

use crate::errors::GenerationError;
use crate::model::{DemeList, HistoricalEvent, MigrationMatrix, TimeVar};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Named policy describing how migration changes through time.
///
/// Matrix 0 is always the most recent epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationFamily {
    /// Migration, then isolation further back: `[full, zero]`.
    #[serde(rename = "IM_THEN_ISO")]
    ImThenIso,
    /// Recent contact after an older isolation: `[full, zero]`.
    #[serde(rename = "SECONDARY_CONTACT")]
    SecondaryContact,
    /// The same migration throughout: `[full]`.
    #[serde(rename = "CONSTANT_MIG")]
    ConstantMig,
    /// A bounded window of migration: `[zero, full, zero]`.
    #[serde(rename = "PULSE")]
    Pulse,
}

const FAMILY_WEIGHTS: [(MigrationFamily, f64); 4] = [
    (MigrationFamily::ImThenIso, 0.4),
    (MigrationFamily::SecondaryContact, 0.3),
    (MigrationFamily::ConstantMig, 0.2),
    (MigrationFamily::Pulse, 0.1),
];

impl MigrationFamily {
    pub const ALL: [MigrationFamily; 4] = [
        Self::ImThenIso,
        Self::SecondaryContact,
        Self::ConstantMig,
        Self::Pulse,
    ];

    /// Weighted random family.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, GenerationError> {
        let dist = WeightedIndex::<f64>::new(FAMILY_WEIGHTS.iter().map(|(_, w)| *w))
            .map_err(|e| GenerationError::InvalidInput(format!("migration family weights: {e}")))?;
        Ok(FAMILY_WEIGHTS[dist.sample(rng)].0)
    }

    /// Number of migration matrices this family materializes.
    pub fn matrix_count(&self) -> usize {
        match self {
            Self::ConstantMig => 1,
            Self::ImThenIso | Self::SecondaryContact => 2,
            Self::Pulse => 3,
        }
    }

    /// Switch events this family injects, most recent first.
    pub fn switch_events(&self) -> Vec<HistoricalEvent> {
        match self {
            Self::ConstantMig => Vec::new(),
            Self::ImThenIso => vec![HistoricalEvent::switch(TimeVar::MigrationStop, 1)],
            Self::SecondaryContact => vec![HistoricalEvent::switch(TimeVar::Contact, 1)],
            Self::Pulse => vec![
                HistoricalEvent::switch(TimeVar::PulseStart, 1),
                HistoricalEvent::switch(TimeVar::PulseEnd, 2),
            ],
        }
    }

    /// The matrix sequence for `demes`.
    pub fn matrices(&self, demes: &DemeList, per_matrix_rates: bool) -> Vec<MigrationMatrix> {
        let n = demes.len();
        match self {
            Self::ConstantMig => vec![MigrationMatrix::full(demes, 0, per_matrix_rates)],
            Self::ImThenIso | Self::SecondaryContact => vec![
                MigrationMatrix::full(demes, 0, per_matrix_rates),
                MigrationMatrix::zero(n, 1),
            ],
            Self::Pulse => vec![
                MigrationMatrix::zero(n, 0),
                MigrationMatrix::full(demes, 1, per_matrix_rates),
                MigrationMatrix::zero(n, 2),
            ],
        }
    }

    /// Infer the family from the switch events and matrix count of an
    /// existing model. `None` means the model has no migration.
    pub fn infer(events: &[HistoricalEvent], matrix_count: usize) -> Option<Self> {
        let has = |t: TimeVar| events.iter().any(|e| e.time_var() == Some(t));
        if has(TimeVar::MigrationStop) {
            Some(Self::ImThenIso)
        } else if has(TimeVar::Contact) {
            Some(Self::SecondaryContact)
        } else if has(TimeVar::PulseStart) {
            Some(Self::Pulse)
        } else if matrix_count == 1 {
            Some(Self::ConstantMig)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MigrationFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImThenIso => write!(f, "IM_THEN_ISO"),
            Self::SecondaryContact => write!(f, "SECONDARY_CONTACT"),
            Self::ConstantMig => write!(f, "CONSTANT_MIG"),
            Self::Pulse => write!(f, "PULSE"),
        }
    }
}

impl std::str::FromStr for MigrationFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "IM_THEN_ISO" => Ok(Self::ImThenIso),
            "SECONDARY_CONTACT" => Ok(Self::SecondaryContact),
            "CONSTANT_MIG" | "CONSTANT" => Ok(Self::ConstantMig),
            "PULSE" => Ok(Self::Pulse),
            _ => Err(format!(
                "Unknown migration family: {s}. Available: IM_THEN_ISO, SECONDARY_CONTACT, CONSTANT_MIG, PULSE"
            )),
        }
    }
}

/// Rewrite every event's matrix index in one backward-time sweep.
///
/// The index starts at 0; a stop, contact or pulse-start switch moves it to
/// 1 and a pulse-end switch to 2. Every other event takes the index current
/// at its position, so a randomly placed event can never switch migration
/// back on after the regime has changed.
pub fn rewrite_matrix_indices(events: &mut [HistoricalEvent]) {
    let mut current = 0;
    for event in events {
        match event.time_var() {
            Some(TimeVar::MigrationStop | TimeVar::Contact | TimeVar::PulseStart) => current = 1,
            Some(TimeVar::PulseEnd) => current = 2,
            _ => {}
        }
        event.matrix_index = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Deme;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::HashMap;

    #[test]
    fn test_matrix_counts_and_shapes() {
        let demes = DemeList::new(3, false);
        for family in MigrationFamily::ALL {
            let matrices = family.matrices(&demes, false);
            assert_eq!(matrices.len(), family.matrix_count());
            for (i, m) in matrices.iter().enumerate() {
                assert_eq!(m.index, i);
                assert_eq!(m.dimension(), 3);
            }
        }
        let pulse = MigrationFamily::Pulse.matrices(&demes, false);
        assert!(pulse[0].is_zero());
        assert!(!pulse[1].is_zero());
        assert!(pulse[2].is_zero());
    }

    #[test]
    fn test_choose_follows_weights() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut counts: HashMap<MigrationFamily, usize> = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(MigrationFamily::choose(&mut rng).unwrap()).or_default() += 1;
        }
        let share = |f: MigrationFamily| counts[&f] as f64 / 10_000.0;
        assert!((share(MigrationFamily::ImThenIso) - 0.4).abs() < 0.03);
        assert!((share(MigrationFamily::SecondaryContact) - 0.3).abs() < 0.03);
        assert!((share(MigrationFamily::ConstantMig) - 0.2).abs() < 0.03);
        assert!((share(MigrationFamily::Pulse) - 0.1).abs() < 0.03);
    }

    #[test]
    fn test_sweep_overrides_construction_indices() {
        let mut div = HistoricalEvent::divergence(Deme::Sampled(0), Deme::Sampled(1), false);
        div.matrix_index = 5;
        let mut events = vec![
            div.clone(),
            HistoricalEvent::switch(TimeVar::PulseStart, 1),
            div.clone(),
            HistoricalEvent::switch(TimeVar::PulseEnd, 2),
            div,
        ];
        rewrite_matrix_indices(&mut events);
        let indices: Vec<usize> = events.iter().map(|e| e.matrix_index).collect();
        assert_eq!(indices, vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("PULSE".parse::<MigrationFamily>(), Ok(MigrationFamily::Pulse));
        assert_eq!("im-then-iso".parse::<MigrationFamily>(), Ok(MigrationFamily::ImThenIso));
        assert!("SOMETIMES".parse::<MigrationFamily>().is_err());
        for family in MigrationFamily::ALL {
            assert_eq!(family.to_string().parse::<MigrationFamily>(), Ok(family));
        }
    }

    #[test]
    fn test_infer_family() {
        let events = MigrationFamily::Pulse.switch_events();
        assert_eq!(MigrationFamily::infer(&events, 3), Some(MigrationFamily::Pulse));
        assert_eq!(MigrationFamily::infer(&[], 1), Some(MigrationFamily::ConstantMig));
        assert_eq!(MigrationFamily::infer(&[], 0), None);
    }
}
