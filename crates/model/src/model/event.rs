//! Historical events.

use super::{Deme, ResizeVar, Symbol, TimeVar, Variable};

/// Broad category of a historical event, derived from its time variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Divergence,
    Admixture,
    BottleneckStart,
    BottleneckEnd,
    /// Migration-regime switch; carries no source or sink.
    Switch,
    /// Record whose time field is not a recognized variable.
    Unknown,
}

/// One record of the historical-event section.
///
/// Serialized as `time source sink migrants resize growth matrix-index`.
/// Switch events have neither source nor sink and are written as `-1 -1`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalEvent {
    pub time: Symbol,
    pub source: Option<Deme>,
    pub sink: Option<Deme>,
    /// Fraction of migrants moved from source to sink.
    pub migrants: f64,
    /// New size of the sink, relative to its current size.
    pub resize: Symbol,
    pub growth_rate: f64,
    pub matrix_index: usize,
}

impl HistoricalEvent {
    /// Backward-time merger of `source` into `sink`, optionally rescaling the
    /// ancestor.
    pub fn divergence(source: Deme, sink: Deme, rescale: bool) -> Self {
        let resize = if rescale {
            Symbol::Var(ResizeVar::Ancestral { source, sink }.into())
        } else {
            Symbol::fixed("1")
        };
        Self {
            time: Symbol::Var(TimeVar::Divergence { source, sink }.into()),
            source: Some(source),
            sink: Some(sink),
            migrants: 1.0,
            resize,
            growth_rate: 0.0,
            matrix_index: 0,
        }
    }

    /// Partial ancestry injection; the sink keeps its size.
    pub fn admixture(source: Deme, sink: Deme, migrants: f64) -> Self {
        Self {
            time: Symbol::Var(TimeVar::Admixture { source, sink }.into()),
            source: Some(source),
            sink: Some(sink),
            migrants,
            resize: Symbol::fixed("1"),
            growth_rate: 0.0,
            matrix_index: 0,
        }
    }

    /// Start and end records of a bottleneck on `deme`.
    pub fn bottleneck(deme: Deme) -> [Self; 2] {
        let record = |time: TimeVar, resize: ResizeVar| Self {
            time: Symbol::Var(time.into()),
            source: Some(deme),
            sink: Some(deme),
            migrants: 0.0,
            resize: Symbol::Var(resize.into()),
            growth_rate: 0.0,
            matrix_index: 0,
        };
        [
            record(TimeVar::BottleneckStart(deme), ResizeVar::BottleneckStart(deme)),
            record(TimeVar::BottleneckEnd(deme), ResizeVar::BottleneckEnd(deme)),
        ]
    }

    /// Migration-regime switch moving to matrix `matrix_index`.
    pub fn switch(time: TimeVar, matrix_index: usize) -> Self {
        debug_assert!(time.is_switch());
        Self {
            time: Symbol::Var(time.into()),
            source: None,
            sink: None,
            migrants: 0.0,
            resize: Symbol::fixed("1"),
            growth_rate: 0.0,
            matrix_index,
        }
    }

    pub fn time_var(&self) -> Option<TimeVar> {
        match self.time.variable() {
            Some(Variable::Time(t)) => Some(t),
            _ => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.time_var() {
            Some(TimeVar::Divergence { .. }) => EventKind::Divergence,
            Some(TimeVar::Admixture { .. }) => EventKind::Admixture,
            Some(TimeVar::BottleneckStart(_)) => EventKind::BottleneckStart,
            Some(TimeVar::BottleneckEnd(_)) => EventKind::BottleneckEnd,
            Some(t) if t.is_switch() => EventKind::Switch,
            _ => EventKind::Unknown,
        }
    }

    pub fn is_switch(&self) -> bool {
        self.kind() == EventKind::Switch
    }

    /// Demes this event touches (source first).
    pub fn lineages(&self) -> impl Iterator<Item = Deme> {
        self.source.into_iter().chain(self.sink)
    }

    /// Every variable referenced by this record.
    pub fn variables(&self) -> impl Iterator<Item = Variable> {
        self.time.variable().into_iter().chain(self.resize.variable())
    }

    /// Serialize as a single record line for a model of `deme_count` demes.
    pub fn to_record(&self, deme_count: usize) -> String {
        let deme = |d: Option<Deme>| match d {
            Some(d) => d.index(deme_count).to_string(),
            None => "-1".to_string(),
        };
        format!(
            "{} {} {} {} {} {} {}",
            self.time,
            deme(self.source),
            deme(self.sink),
            self.migrants,
            self.resize,
            self.growth_rate,
            self.matrix_index
        )
    }
}
