//! Text form of a parameter set (`.est`).

use super::{ComplexParameter, Expression, ParameterSet, SimpleParameter, Visibility};
use crate::errors::ParseError;
use crate::model::{Prior, SizeVar, Symbol, Variable};
use crate::topology::Topology;
use std::collections::HashMap;
use std::fmt;

const HEADER: [&str; 6] = [
    "// Priors and rules file",
    "// *********************",
    "",
    "[PARAMETERS]",
    "//#isInt? #name #dist. #min #max",
    "//all Ns are in number of haploid individuals",
];

const PARAMETERS: &str = "[PARAMETERS]";
const RULES: &str = "[RULES]";
const COMPLEX: &str = "[COMPLEX PARAMETERS]";

impl fmt::Display for SimpleParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            u8::from(self.is_int),
            self.name,
            self.prior.kind,
            self.prior.min,
            self.prior.max,
            self.visibility
        )
    }
}

impl fmt::Display for ComplexParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            u8::from(self.is_int),
            self.name,
            self.expression,
            self.visibility
        )
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in HEADER {
            writeln!(f, "{line}")?;
        }
        for param in &self.simple {
            writeln!(f, "{param}")?;
        }
        writeln!(f)?;
        writeln!(f, "{RULES}")?;
        writeln!(f)?;
        writeln!(f, "{COMPLEX}")?;
        writeln!(f)?;
        for param in &self.complex {
            writeln!(f, "{param}")?;
        }
        Ok(())
    }
}

/// Canonical names of every variable a parameter file for `topology` may
/// declare.
fn known_names(topology: &Topology) -> HashMap<String, Variable> {
    let demes: Vec<_> = topology.demes.iter().collect();
    let mut vars: Vec<Variable> = vec![Variable::MutationRate, SizeVar::AncestralRoot.into()];
    vars.extend(topology.variables());
    for &a in &demes {
        vars.push(SizeVar::Bottleneck(a).into());
        vars.push(SizeVar::Current(a).into());
        for &b in &demes {
            vars.push(SizeVar::Ancestral(a, b).into());
        }
    }
    vars.extend((1..topology.events.len()).map(Variable::TimeGap));
    vars.into_iter().map(|v| (v.to_string(), v)).collect()
}

fn resolve(token: &str, known: &HashMap<String, Variable>) -> Symbol {
    known
        .get(token)
        .map(|v| Symbol::Var(*v))
        .unwrap_or_else(|| Symbol::fixed(token))
}

fn unexpected(line: usize, expected: &'static str, found: &str) -> ParseError {
    ParseError::Unexpected {
        line,
        expected,
        found: found.to_string(),
    }
}

fn parse_flag(line: usize, token: &str) -> Result<bool, ParseError> {
    match token {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(unexpected(line, "integer flag 0 or 1", token)),
    }
}

fn parse_visibility(line: usize, token: &str) -> Result<Visibility, ParseError> {
    match token {
        "output" => Ok(Visibility::Output),
        "hide" => Ok(Visibility::Hide),
        _ => Err(unexpected(line, "output or hide", token)),
    }
}

fn parse_bound(line: usize, token: &str) -> Result<f64, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn parse_simple(
    line: usize,
    text: &str,
    known: &HashMap<String, Variable>,
) -> Result<SimpleParameter, ParseError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [is_int, name, kind, min, max, visibility] = fields[..] else {
        return Err(unexpected(line, "simple parameter", text));
    };
    let kind = kind
        .parse()
        .map_err(|_| unexpected(line, "distribution type", kind))?;
    Ok(SimpleParameter {
        is_int: parse_flag(line, is_int)?,
        name: resolve(name, known),
        prior: Prior::new(kind, parse_bound(line, min)?, parse_bound(line, max)?),
        visibility: parse_visibility(line, visibility)?,
    })
}

fn parse_complex(
    line: usize,
    text: &str,
    known: &HashMap<String, Variable>,
) -> Result<ComplexParameter, ParseError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 5 || fields[2] != "=" {
        return Err(unexpected(line, "complex parameter", text));
    }
    let rhs = fields[3..fields.len() - 1].concat();
    let expression = if let Some((a, b)) = rhs.split_once('+') {
        Expression::Sum(resolve(a, known), resolve(b, known))
    } else if let Some((a, b)) = rhs.split_once('/') {
        Expression::Ratio(resolve(a, known), resolve(b, known))
    } else {
        return Err(unexpected(line, "sum or ratio expression", &rhs));
    };
    Ok(ComplexParameter {
        is_int: parse_flag(line, fields[0])?,
        name: resolve(fields[1], known),
        expression,
        visibility: parse_visibility(line, fields[fields.len() - 1])?,
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Parameters,
    Rules,
    Complex,
}

impl ParameterSet {
    /// Parse `.est` text. Names are resolved against the variables `topology`
    /// can give rise to; anything else is kept as a literal.
    pub fn parse(text: &str, topology: &Topology) -> Result<Self, ParseError> {
        let known = known_names(topology);
        let mut params = ParameterSet::default();
        let mut section = Section::Preamble;

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.trim();
            match content {
                PARAMETERS => section = Section::Parameters,
                RULES => section = Section::Rules,
                COMPLEX => section = Section::Complex,
                _ if content.is_empty() || content.starts_with("//") => {}
                _ => match section {
                    Section::Parameters => params.simple.push(parse_simple(line, content, &known)?),
                    Section::Complex => params.complex.push(parse_complex(line, content, &known)?),
                    Section::Rules => {}
                    Section::Preamble => {
                        return Err(unexpected(line, "[PARAMETERS] section", content))
                    }
                },
            }
        }

        if section != Section::Complex {
            return Err(ParseError::UnexpectedEnd {
                expected: "[COMPLEX PARAMETERS] section",
            });
        }
        Ok(params)
    }
}
