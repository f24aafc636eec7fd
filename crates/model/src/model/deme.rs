//! Deme identifiers.

use std::fmt;

/// A deme (sub-population) of a model.
///
/// Sampled demes are numbered from zero. The ghost deme is unsampled and,
/// when present, always occupies the last index of the deme list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Deme {
    Sampled(usize),
    Ghost,
}

impl Deme {
    /// Tag used when the deme is embedded in a variable name.
    ///
    /// Single-digit indices and the ghost are one character; longer indices
    /// are wrapped as `_{i}_` so that concatenated tags stay unambiguous.
    pub fn tag(&self) -> String {
        match self {
            Self::Sampled(i) if *i >= 10 => format!("_{i}_"),
            _ => self.to_string(),
        }
    }

    /// Column/row index of this deme within a model of `deme_count` demes.
    pub fn index(&self, deme_count: usize) -> usize {
        match self {
            Self::Sampled(i) => *i,
            Self::Ghost => deme_count.saturating_sub(1),
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, Self::Ghost)
    }
}

impl fmt::Display for Deme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sampled(i) => write!(f, "{i}"),
            Self::Ghost => write!(f, "G"),
        }
    }
}

/// The ordered list of demes in a model.
///
/// Index `i` of the list is the deme that appears in row/column `i` of every
/// migration matrix and at position `i` of the size and sample lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemeList {
    demes: Vec<Deme>,
}

impl DemeList {
    /// `sampled` numbered demes, followed by a ghost when `ghost` is set.
    pub fn new(sampled: usize, ghost: bool) -> Self {
        let mut demes: Vec<Deme> = (0..sampled).map(Deme::Sampled).collect();
        if ghost {
            demes.push(Deme::Ghost);
        }
        Self { demes }
    }

    pub fn len(&self) -> usize {
        self.demes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demes.is_empty()
    }

    pub fn has_ghost(&self) -> bool {
        self.demes.last().is_some_and(Deme::is_ghost)
    }

    /// Deme stored at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Deme> {
        self.demes.get(index).copied()
    }

    pub fn index_of(&self, deme: Deme) -> usize {
        deme.index(self.demes.len())
    }

    /// Sampled demes only.
    pub fn sampled(&self) -> impl Iterator<Item = Deme> + '_ {
        self.demes.iter().copied().filter(|d| !d.is_ghost())
    }

    pub fn iter(&self) -> impl Iterator<Item = Deme> + '_ {
        self.demes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ghost_occupies_last_index() {
        let demes = DemeList::new(3, true);
        assert_eq!(demes.len(), 4);
        assert!(demes.has_ghost());
        assert_eq!(demes.index_of(Deme::Ghost), 3);
        assert_eq!(demes.get(3), Some(Deme::Ghost));
        assert_eq!(demes.sampled().count(), 3);
    }

    #[test]
    fn test_tags() {
        assert_eq!(Deme::Sampled(3).tag(), "3");
        assert_eq!(Deme::Sampled(12).tag(), "_12_");
        assert_eq!(Deme::Ghost.tag(), "G");
    }
}
