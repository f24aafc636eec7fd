//! Parameter derivation: the `.est` companion of a topology.
//!
//! Every variable of a [`Topology`] is declared exactly once, either as a
//! *simple* parameter sampled from a prior or as a *complex* parameter defined
//! by an expression over other declared parameters.

mod format;

use crate::errors::{ConfigError, Error, GenerationError, Result};
use crate::model::{Prior, ResizeVar, SizeVar, Symbol, Variable};
use crate::topology::Topology;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Default cap on the spacing between two consecutive event times.
pub const DEFAULT_MAX_TIME_BETWEEN_EVENTS: f64 = 1000.0;

fn default_max_time_between_events() -> f64 {
    DEFAULT_MAX_TIME_BETWEEN_EVENTS
}

/// Priors used when deriving parameters (`MODEL_PARAMS` in the user config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPriors {
    #[serde(rename = "mutation_rate_dist")]
    pub mutation_rate: Prior,
    #[serde(rename = "effective_pop_size_dist")]
    pub effective_size: Prior,
    #[serde(rename = "migration_dist")]
    pub migration: Prior,
    #[serde(rename = "time_dist")]
    pub time: Prior,
    #[serde(default = "default_max_time_between_events")]
    pub max_time_between_events: f64,
}

impl ParameterPriors {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.mutation_rate.validate("mutation_rate_dist")?;
        self.effective_size.validate("effective_pop_size_dist")?;
        self.migration.validate("migration_dist")?;
        self.time.validate("time_dist")?;
        if !self.max_time_between_events.is_finite() || self.max_time_between_events < 1.0 {
            return Err(ConfigError::InvalidValue(format!(
                "max_time_between_events must be at least 1 (got {})",
                self.max_time_between_events
            )));
        }
        Ok(())
    }

    /// Prior of the hidden spacing between consecutive events.
    pub fn time_gap(&self) -> Prior {
        self.time.with_bounds(1.0, self.max_time_between_events)
    }
}

/// Whether the simulator reports a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Output,
    Hide,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output => write!(f, "output"),
            Self::Hide => write!(f, "hide"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleParameter {
    pub is_int: bool,
    pub name: Symbol,
    pub prior: Prior,
    pub visibility: Visibility,
}

/// Right-hand side of a complex parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `a + b`
    Sum(Symbol, Symbol),
    /// `a/b`
    Ratio(Symbol, Symbol),
}

impl Expression {
    pub fn operands(&self) -> [&Symbol; 2] {
        match self {
            Self::Sum(a, b) | Self::Ratio(a, b) => [a, b],
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum(a, b) => write!(f, "{a} + {b}"),
            Self::Ratio(a, b) => write!(f, "{a}/{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexParameter {
    pub is_int: bool,
    pub name: Symbol,
    pub expression: Expression,
    pub visibility: Visibility,
}

/// The declarations of a `.est` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    pub simple: Vec<SimpleParameter>,
    pub complex: Vec<ComplexParameter>,
}

/// Collects declarations in insertion order; the first declaration of a name
/// wins.
#[derive(Default)]
struct Declarations {
    simple: IndexMap<String, SimpleParameter>,
    complex: IndexMap<String, ComplexParameter>,
}

impl Declarations {
    fn simple(&mut self, is_int: bool, name: Variable, prior: Prior, visibility: Visibility) {
        self.simple
            .entry(name.to_string())
            .or_insert_with(|| SimpleParameter {
                is_int,
                name: Symbol::Var(name),
                prior,
                visibility,
            });
    }

    fn complex(&mut self, is_int: bool, name: Variable, expression: Expression) {
        self.complex
            .entry(name.to_string())
            .or_insert_with(|| ComplexParameter {
                is_int,
                name: Symbol::Var(name),
                expression,
                visibility: Visibility::Output,
            });
    }

    fn finish(self) -> ParameterSet {
        ParameterSet {
            simple: self.simple.into_values().collect(),
            complex: self.complex.into_values().collect(),
        }
    }
}

fn ratio(a: impl Into<Variable>, b: impl Into<Variable>) -> Expression {
    Expression::Ratio(Symbol::Var(a.into()), Symbol::Var(b.into()))
}

impl ParameterSet {
    /// Derive the declarations for `topology` and verify that they close over
    /// every variable it references.
    pub fn derive(
        topology: &Topology,
        priors: &ParameterPriors,
    ) -> std::result::Result<Self, GenerationError> {
        let mut decl = Declarations::default();

        decl.simple(false, Variable::MutationRate, priors.mutation_rate, Visibility::Output);

        for size in topology.sizes.iter().filter_map(Symbol::variable) {
            decl.simple(true, size, priors.effective_size, Visibility::Output);
        }

        for rate in topology.matrices.iter().flat_map(|m| m.variables()) {
            decl.simple(false, rate, priors.migration, Visibility::Output);
        }

        // Event times: the first is sampled directly, each later one is the
        // previous time plus a hidden positive gap.
        let times: Vec<Variable> = topology
            .events
            .iter()
            .filter_map(|e| e.time.variable())
            .collect();
        let mut time_rules = Vec::new();
        if let Some(&first) = times.first() {
            decl.simple(true, first, priors.time, Visibility::Output);
            for (i, pair) in times.windows(2).enumerate() {
                let gap = Variable::TimeGap(i + 1);
                decl.simple(true, gap, priors.time_gap(), Visibility::Hide);
                time_rules.push((
                    pair[1],
                    Expression::Sum(Symbol::Var(gap), Symbol::Var(pair[0])),
                ));
            }
        }

        // Resize ratios, with the sizes they introduce.
        let resizes: Vec<ResizeVar> = topology
            .events
            .iter()
            .filter_map(|e| match e.resize.variable() {
                Some(Variable::Resize(r)) => Some(r),
                _ => None,
            })
            .collect();
        let mut hidden_sizes: Vec<SizeVar> = Vec::new();
        let mut resize_rules = Vec::new();

        let mut first_ancestral = true;
        for r in &resizes {
            if let ResizeVar::Ancestral { source, sink } = *r {
                let ancestor = SizeVar::Ancestral(source, sink);
                if first_ancestral {
                    resize_rules.push((*r, ratio(SizeVar::AncestralRoot, ancestor)));
                    hidden_sizes.extend([SizeVar::AncestralRoot, ancestor]);
                    first_ancestral = false;
                } else {
                    resize_rules.push((*r, ratio(ancestor, SizeVar::Population(sink))));
                    hidden_sizes.push(ancestor);
                }
            }
        }
        for r in &resizes {
            if let ResizeVar::BottleneckStart(d) = *r {
                resize_rules.push((*r, ratio(SizeVar::Bottleneck(d), SizeVar::Current(d))));
                hidden_sizes.extend([SizeVar::Bottleneck(d), SizeVar::Current(d)]);
            }
        }
        for r in &resizes {
            if let ResizeVar::BottleneckEnd(d) = *r {
                resize_rules.push((*r, ratio(SizeVar::Ancestral(d, d), SizeVar::Bottleneck(d))));
                hidden_sizes.push(SizeVar::Ancestral(d, d));
            }
        }

        for size in hidden_sizes {
            decl.simple(true, size.into(), priors.effective_size, Visibility::Hide);
        }
        for (name, expression) in resize_rules {
            decl.complex(false, name.into(), expression);
        }
        for (name, expression) in time_rules {
            decl.complex(true, name, expression);
        }

        let params = decl.finish();
        debug!(
            simple = params.simple.len(),
            complex = params.complex.len(),
            "Derived parameters"
        );
        params.verify_closure(topology)?;
        Ok(params)
    }

    /// Names of every declaration, simple first.
    pub fn declared_names(&self) -> impl Iterator<Item = String> + '_ {
        self.simple
            .iter()
            .map(|p| p.name.to_string())
            .chain(self.complex.iter().map(|p| p.name.to_string()))
    }

    /// Check that every variable of `topology` is declared exactly once, no
    /// name is declared twice and every expression operand is declared.
    pub fn verify_closure(&self, topology: &Topology) -> std::result::Result<(), GenerationError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in self.declared_names() {
            *counts.entry(name).or_default() += 1;
        }

        let mut problems = Vec::new();
        let mut duplicates: Vec<&String> = counts
            .iter()
            .filter(|(_, &n)| n > 1)
            .map(|(name, _)| name)
            .collect();
        duplicates.sort();
        for name in duplicates {
            problems.push(format!("{name} declared more than once"));
        }

        let mut seen = Vec::new();
        for var in topology.variables() {
            let name = var.to_string();
            if !counts.contains_key(&name) && !seen.contains(&name) {
                problems.push(format!("{name} is never declared"));
                seen.push(name);
            }
        }

        for param in &self.complex {
            for operand in param.expression.operands() {
                let name = operand.to_string();
                if !counts.contains_key(&name) {
                    problems.push(format!(
                        "{} uses undeclared {name}",
                        param.name
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::Closure(problems.join("; ")))
        }
    }

    /// Write the `.est` text to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).map_err(|e| Error::io(path, e))
    }

    /// Read a `.est` file, resolving names against the variables `topology`
    /// can give rise to.
    pub fn read(path: impl AsRef<Path>, topology: &Topology) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(&text, topology)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deme, DistributionKind, HistoricalEvent, TimeVar};
    use crate::topology::{MigrationFamily, TopologyGenerator, TopologyOptions};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    pub(crate) fn priors() -> ParameterPriors {
        ParameterPriors {
            mutation_rate: Prior::new(DistributionKind::LogUniform, 1e-9, 1e-7),
            effective_size: Prior::uniform(100.0, 100_000.0),
            migration: Prior::new(DistributionKind::LogUniform, 1e-5, 1e-2),
            time: Prior::uniform(100.0, 10_000.0),
            max_time_between_events: DEFAULT_MAX_TIME_BETWEEN_EVENTS,
        }
    }

    fn lines(params: &ParameterSet) -> (Vec<String>, Vec<String>) {
        let text = params.to_string();
        let mut simple = Vec::new();
        let mut complex = Vec::new();
        let mut in_complex = false;
        for line in text.lines() {
            if line == "[COMPLEX PARAMETERS]" {
                in_complex = true;
            } else if line.starts_with(['0', '1']) {
                if in_complex {
                    complex.push(line.to_string());
                } else {
                    simple.push(line.to_string());
                }
            }
        }
        (simple, complex)
    }

    fn topology(options: TopologyOptions, pops: usize, seed: u64) -> Topology {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        TopologyGenerator::new(options)
            .generate(pops, &vec![10; pops], &mut rng)
            .unwrap()
    }

    #[test]
    fn test_minimal_two_population_parameters() {
        let topo = topology(
            TopologyOptions::new()
                .ghost(false)
                .migration(false)
                .admixture(false)
                .bottleneck(false)
                .ancestral_resize(false),
            2,
            42,
        );
        let params = ParameterSet::derive(&topo, &priors()).unwrap();
        let (simple, complex) = lines(&params);
        let div = topo.events[0].time.to_string();
        assert_eq!(
            simple,
            vec![
                "0 MUTRATE$ logunif 0.000000001 0.0000001 output".to_string(),
                "1 N_POP0$ unif 100 100000 output".to_string(),
                "1 N_POP1$ unif 100 100000 output".to_string(),
                format!("1 {div} unif 100 10000 output"),
            ]
        );
        assert!(complex.is_empty());
    }

    #[test]
    fn test_later_times_are_chained_through_hidden_gaps() {
        let mut topo = topology(TopologyOptions::new().ghost(false).migration(false), 3, 1);
        topo.events = vec![
            HistoricalEvent::divergence(Deme::Sampled(0), Deme::Sampled(1), false),
            HistoricalEvent::switch(TimeVar::MigrationStop, 1),
            HistoricalEvent::divergence(Deme::Sampled(1), Deme::Sampled(2), false),
        ];
        let params = ParameterSet::derive(&topo, &priors()).unwrap();
        let (simple, complex) = lines(&params);
        assert!(simple.contains(&"1 T_DIV01$ unif 100 10000 output".to_string()));
        assert!(simple.contains(&"1 T_1_2$ unif 1 1000 hide".to_string()));
        assert!(simple.contains(&"1 T_2_3$ unif 1 1000 hide".to_string()));
        assert_eq!(
            complex,
            vec![
                "1 T_MIGSTOP$ = T_1_2$ + T_DIV01$ output",
                "1 T_DIV12$ = T_2_3$ + T_MIGSTOP$ output",
            ]
        );
    }

    #[test]
    fn test_resize_ratios_register_hidden_sizes() {
        let mut topo = topology(TopologyOptions::new().ghost(false).migration(false), 3, 1);
        let [bot, bot_end] = HistoricalEvent::bottleneck(Deme::Sampled(2));
        topo.events = vec![
            HistoricalEvent::divergence(Deme::Sampled(0), Deme::Sampled(1), true),
            bot,
            bot_end,
            HistoricalEvent::divergence(Deme::Sampled(1), Deme::Sampled(2), true),
        ];
        let params = ParameterSet::derive(&topo, &priors()).unwrap();
        let (simple, complex) = lines(&params);

        assert_eq!(
            complex[..4].to_vec(),
            vec![
                "0 RELANC01$ = N_ANCALL$/N_ANC01$ output",
                "0 RELANC12$ = N_ANC12$/N_POP2$ output",
                "0 RESBOT22$ = N_BOT22$/N_CUR22$ output",
                "0 RESBOTEND22$ = N_ANC22$/N_BOT22$ output",
            ]
        );
        let hidden: Vec<&str> = simple
            .iter()
            .filter(|l| l.ends_with("hide") && l.contains("N_"))
            .map(|l| l.split(' ').nth(1).unwrap())
            .collect();
        assert_eq!(
            hidden,
            vec!["N_ANCALL$", "N_ANC01$", "N_ANC12$", "N_BOT22$", "N_CUR22$", "N_ANC22$"]
        );
    }

    #[test]
    fn test_shared_rates_are_declared_once() {
        let topo = topology(
            TopologyOptions::new()
                .ghost(false)
                .family(MigrationFamily::Pulse)
                .per_matrix_rates(false),
            2,
            3,
        );
        let params = ParameterSet::derive(&topo, &priors()).unwrap();
        let migs: Vec<String> = params
            .declared_names()
            .filter(|n| n.starts_with("MIG"))
            .collect();
        assert_eq!(migs, vec!["MIG01$", "MIG10$"]);
    }

    #[test]
    fn test_closure_holds_for_random_topologies() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
        let generator = TopologyGenerator::default();
        for pops in 1..=5 {
            for _ in 0..40 {
                let topo = generator.generate(pops, &vec![20; pops], &mut rng).unwrap();
                let params = ParameterSet::derive(&topo, &priors()).unwrap();
                let declared: Vec<String> = params.declared_names().collect();
                for var in topo.variables() {
                    assert!(declared.contains(&var.to_string()), "{var} undeclared");
                }
            }
        }
    }

    #[test]
    fn test_closure_reports_missing_and_duplicate_names() {
        let topo = topology(TopologyOptions::new().ghost(false).migration(false), 2, 5);
        let mut params = ParameterSet::derive(&topo, &priors()).unwrap();
        let dup = params.simple[0].clone();
        params.simple.push(dup);
        params.simple.retain(|p| p.name.to_string() != "N_POP1$");
        let err = params.verify_closure(&topo).unwrap_err().to_string();
        assert!(err.contains("MUTRATE$ declared more than once"));
        assert!(err.contains("N_POP1$ is never declared"));
    }

    #[test]
    fn test_priors_validation() {
        assert!(priors().validate().is_ok());
        let mut bad = priors();
        bad.max_time_between_events = 0.5;
        assert!(bad.validate().is_err());
        let mut inverted = priors();
        inverted.time = Prior::uniform(10.0, 1.0);
        assert!(inverted.validate().is_err());
    }
}
