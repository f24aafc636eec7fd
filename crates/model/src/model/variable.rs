//! Typed free-parameter identifiers.
//!
//! Every free parameter of a model is a [`Variable`]. Its serialized name is
//! produced by a single canonicalization (`Display`), so the topology writer,
//! the topology parser and the parameter generator always agree on spelling.
//! Names end with `$`, the marker fastsimcoal uses for "free parameter".
//!
//! Deme tags are concatenated without a separator (`T_DIV01$`), so a tag of
//! more than one character is bracketed by underscores (`T_DIV1_10_$`). Tags
//! are then prefix-free and two distinct variables never share a name.

use super::Deme;
use std::fmt;

/// Size-like parameters (numbers of genes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeVar {
    /// Current effective size of a deme, `N_POP{d}$`.
    Population(Deme),
    /// Size of the ancestor produced by a merger, `N_ANC{s}{k}$`.
    /// A bottleneck on deme `d` reuses it as `N_ANC{d}{d}$`.
    Ancestral(Deme, Deme),
    /// Size of the root ancestor, `N_ANCALL$`.
    AncestralRoot,
    /// Size during a bottleneck, `N_BOT{d}{d}$`.
    Bottleneck(Deme),
    /// Size just before a bottleneck, `N_CUR{d}{d}$`.
    Current(Deme),
}

/// Time of a historical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeVar {
    Divergence { source: Deme, sink: Deme },
    Admixture { source: Deme, sink: Deme },
    BottleneckStart(Deme),
    BottleneckEnd(Deme),
    MigrationStop,
    Contact,
    PulseStart,
    PulseEnd,
}

impl TimeVar {
    /// Whether this time marks a migration-regime switch.
    pub fn is_switch(&self) -> bool {
        matches!(
            self,
            Self::MigrationStop | Self::Contact | Self::PulseStart | Self::PulseEnd
        )
    }
}

/// Relative deme-size change applied by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeVar {
    /// `RELANC{s}{k}$`
    Ancestral { source: Deme, sink: Deme },
    /// `RESBOT{d}{d}$`
    BottleneckStart(Deme),
    /// `RESBOTEND{d}{d}$`
    BottleneckEnd(Deme),
}

/// A free parameter referenced by a topology or parameters file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    MutationRate,
    Size(SizeVar),
    /// Migration rate from `from` to `to`. `matrix` is set when every matrix
    /// carries its own rates.
    MigrationRate {
        from: Deme,
        to: Deme,
        matrix: Option<usize>,
    },
    Time(TimeVar),
    /// Spacing between the `n`-th and `n+1`-th timed events, `T_{n}_{n+1}$`.
    TimeGap(usize),
    Resize(ResizeVar),
}

impl fmt::Display for SizeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Population(d) => write!(f, "N_POP{}$", d.tag()),
            Self::Ancestral(s, k) => write!(f, "N_ANC{}{}$", s.tag(), k.tag()),
            Self::AncestralRoot => write!(f, "N_ANCALL$"),
            Self::Bottleneck(d) => write!(f, "N_BOT{0}{0}$", d.tag()),
            Self::Current(d) => write!(f, "N_CUR{0}{0}$", d.tag()),
        }
    }
}

impl fmt::Display for TimeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Divergence { source, sink } => write!(f, "T_DIV{}{}$", source.tag(), sink.tag()),
            Self::Admixture { source, sink } => write!(f, "T_ADMIX{}{}$", source.tag(), sink.tag()),
            Self::BottleneckStart(d) => write!(f, "T_BOT{0}{0}$", d.tag()),
            Self::BottleneckEnd(d) => write!(f, "T_BOTEND{0}{0}$", d.tag()),
            Self::MigrationStop => write!(f, "T_MIGSTOP$"),
            Self::Contact => write!(f, "T_CONTACT$"),
            Self::PulseStart => write!(f, "T_PULSE_START$"),
            Self::PulseEnd => write!(f, "T_PULSE_END$"),
        }
    }
}

impl fmt::Display for ResizeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ancestral { source, sink } => write!(f, "RELANC{}{}$", source.tag(), sink.tag()),
            Self::BottleneckStart(d) => write!(f, "RESBOT{0}{0}$", d.tag()),
            Self::BottleneckEnd(d) => write!(f, "RESBOTEND{0}{0}$", d.tag()),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MutationRate => write!(f, "MUTRATE$"),
            Self::Size(v) => v.fmt(f),
            Self::MigrationRate {
                from,
                to,
                matrix: None,
            } => write!(f, "MIG{}{}$", from.tag(), to.tag()),
            Self::MigrationRate {
                from,
                to,
                matrix: Some(m),
            } => write!(f, "MIG{}{}_{m}$", from.tag(), to.tag()),
            Self::Time(v) => v.fmt(f),
            Self::TimeGap(n) => write!(f, "T_{}_{}$", n, n + 1),
            Self::Resize(v) => v.fmt(f),
        }
    }
}

impl From<SizeVar> for Variable {
    fn from(v: SizeVar) -> Self {
        Self::Size(v)
    }
}

impl From<TimeVar> for Variable {
    fn from(v: TimeVar) -> Self {
        Self::Time(v)
    }
}

impl From<ResizeVar> for Variable {
    fn from(v: ResizeVar) -> Self {
        Self::Resize(v)
    }
}

/// A field of a topology record: either a free parameter or a fixed literal
/// such as `1` or `0.000`.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Var(Variable),
    Fixed(String),
}

impl Symbol {
    pub fn fixed(literal: impl Into<String>) -> Self {
        Self::Fixed(literal.into())
    }

    pub fn variable(&self) -> Option<Variable> {
        match self {
            Self::Var(v) => Some(*v),
            Self::Fixed(_) => None,
        }
    }

    /// Resolve `token` against the canonical spelling of `candidates`.
    ///
    /// Tokens that match none of them are kept verbatim as literals.
    pub fn recognize(token: &str, candidates: impl IntoIterator<Item = Variable>) -> Self {
        candidates
            .into_iter()
            .find(|v| v.to_string() == token)
            .map(Self::Var)
            .unwrap_or_else(|| Self::Fixed(token.to_string()))
    }
}

impl From<Variable> for Symbol {
    fn from(v: Variable) -> Self {
        Self::Var(v)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => v.fmt(f),
            Self::Fixed(s) => f.write_str(s),
        }
    }
}
