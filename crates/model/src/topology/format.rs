//! Text form of a topology (`.tpl`).
//!
//! Writing is a single `Display` pass over the structure. Reading walks the
//! same fixed section order and resolves every token against the canonical
//! names that the record's own fields allow; tokens that match none of them
//! are kept as literals.

use super::migration::MigrationFamily;
use super::Topology;
use crate::errors::ParseError;
use crate::model::{
    Deme, DemeList, HistoricalEvent, MigrationMatrix, ResizeVar, SizeVar, Symbol, TimeVar,
    Variable,
};
use std::fmt;
use std::str::FromStr;

const DEMES_HEADER: &str = "//Number of population samples (demes)";
const SIZES_HEADER: &str = "//Population effective sizes (number of genes)";
const SAMPLES_HEADER: &str = "//Sample Sizes";
const GROWTH_HEADER: &str = "//Growth rates : negative growth implies population expansion";
const MATRICES_HEADER: &str =
    "//Number of migration matrices : 0 implies no migration between demes";
const EVENTS_HEADER: &str =
    "//historical event: time, source, sink, migrants, new deme size, growth rate, migr mat index";

const TRAILER: [&str; 6] = [
    "//Number of independent loci [chromosome]",
    "1 0",
    "//Per chromosome: Number of contiguous linkage Block: a block is a set of contiguous loci",
    "1",
    "//per Block:data type, number of loci, per gen recomb and mut rates",
    "FREQ 1 0 MUTRATE$ OUTEXP",
];

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.demes.len();
        writeln!(f, "{DEMES_HEADER}")?;
        writeln!(f, "{n}")?;
        writeln!(f, "{SIZES_HEADER}")?;
        for size in &self.sizes {
            writeln!(f, "{size}")?;
        }
        writeln!(f, "{SAMPLES_HEADER}")?;
        for sample in &self.sample_sizes {
            writeln!(f, "{sample}")?;
        }
        writeln!(f, "{GROWTH_HEADER}")?;
        for rate in &self.growth_rates {
            writeln!(f, "{rate}")?;
        }
        writeln!(f, "{MATRICES_HEADER}")?;
        writeln!(f, "{}", self.matrices.len())?;
        for matrix in &self.matrices {
            for line in matrix.to_lines() {
                writeln!(f, "{line}")?;
            }
        }
        writeln!(f, "{EVENTS_HEADER}")?;
        writeln!(f, "{} historical event", self.events.len())?;
        for event in &self.events {
            writeln!(f, "{}", event.to_record(n))?;
        }
        for line in TRAILER {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Line cursor that remembers 1-based line numbers for error messages.
struct Cursor<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        self.lines
            .next()
            .map(|(i, line)| (i + 1, line.trim()))
            .ok_or(ParseError::UnexpectedEnd { expected })
    }

    fn comment(&mut self, expected: &'static str) -> Result<(), ParseError> {
        let (line, text) = self.next(expected)?;
        if text.starts_with("//") {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                line,
                expected,
                found: text.to_string(),
            })
        }
    }

    fn number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let (line, text) = self.next(expected)?;
        parse_number(line, text)
    }
}

fn parse_number<T: FromStr>(line: usize, token: &str) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn split_fields<'a>(
    line: usize,
    text: &'a str,
    count: usize,
    expected: &'static str,
) -> Result<Vec<&'a str>, ParseError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() == count {
        Ok(fields)
    } else {
        Err(ParseError::Unexpected {
            line,
            expected,
            found: text.to_string(),
        })
    }
}

fn parse_deme(line: usize, token: &str, demes: &DemeList) -> Result<Option<Deme>, ParseError> {
    if token == "-1" {
        return Ok(None);
    }
    let index: usize = parse_number(line, token)?;
    demes.get(index).map(Some).ok_or(ParseError::Unexpected {
        line,
        expected: "deme index",
        found: token.to_string(),
    })
}

fn time_candidates(source: Option<Deme>, sink: Option<Deme>) -> Vec<Variable> {
    match (source, sink) {
        (Some(s), Some(k)) => {
            let mut vars = vec![
                TimeVar::Divergence { source: s, sink: k }.into(),
                TimeVar::Admixture { source: s, sink: k }.into(),
            ];
            if s == k {
                vars.push(TimeVar::BottleneckStart(s).into());
                vars.push(TimeVar::BottleneckEnd(s).into());
            }
            vars
        }
        _ => [
            TimeVar::MigrationStop,
            TimeVar::Contact,
            TimeVar::PulseStart,
            TimeVar::PulseEnd,
        ]
        .into_iter()
        .map(Variable::from)
        .collect(),
    }
}

fn resize_candidates(source: Option<Deme>, sink: Option<Deme>) -> Vec<Variable> {
    let (Some(s), Some(k)) = (source, sink) else {
        return Vec::new();
    };
    let mut vars = vec![ResizeVar::Ancestral { source: s, sink: k }.into()];
    if s == k {
        vars.push(ResizeVar::BottleneckStart(s).into());
        vars.push(ResizeVar::BottleneckEnd(s).into());
    }
    vars
}

fn parse_event(line: usize, text: &str, demes: &DemeList) -> Result<HistoricalEvent, ParseError> {
    let fields = split_fields(line, text, 7, "historical event record")?;
    let source = parse_deme(line, fields[1], demes)?;
    let sink = parse_deme(line, fields[2], demes)?;
    Ok(HistoricalEvent {
        time: Symbol::recognize(fields[0], time_candidates(source, sink)),
        source,
        sink,
        migrants: parse_number(line, fields[3])?,
        resize: Symbol::recognize(fields[4], resize_candidates(source, sink)),
        growth_rate: parse_number(line, fields[5])?,
        matrix_index: parse_number(line, fields[6])?,
    })
}

fn parse_matrix(cursor: &mut Cursor<'_>, demes: &DemeList) -> Result<MigrationMatrix, ParseError> {
    let (line, header) = cursor.next("migration matrix header")?;
    let index = header
        .strip_prefix("//Migration matrix")
        .map(str::trim)
        .ok_or_else(|| ParseError::Unexpected {
            line,
            expected: "migration matrix header",
            found: header.to_string(),
        })
        .and_then(|token| parse_number(line, token))?;

    let mut cells = Vec::with_capacity(demes.len());
    for from in demes.iter() {
        let (line, row) = cursor.next("migration matrix row")?;
        let tokens = split_fields(line, row, demes.len(), "migration matrix row")?;
        cells.push(
            tokens
                .iter()
                .zip(demes.iter())
                .map(|(token, to)| {
                    let shared = Variable::MigrationRate { from, to, matrix: None };
                    let owned = Variable::MigrationRate {
                        from,
                        to,
                        matrix: Some(index),
                    };
                    Symbol::recognize(token, [shared, owned])
                })
                .collect(),
        );
    }
    Ok(MigrationMatrix { index, cells })
}

impl FromStr for Topology {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);

        cursor.comment("deme count header")?;
        let n: usize = cursor.number("deme count")?;

        cursor.comment("effective sizes header")?;
        let mut size_tokens = Vec::with_capacity(n);
        for _ in 0..n {
            size_tokens.push(cursor.next("effective size")?.1);
        }
        let ghost_name = SizeVar::Population(Deme::Ghost).to_string();
        let has_ghost = n > 0 && size_tokens[n - 1] == ghost_name;
        let demes = DemeList::new(if has_ghost { n - 1 } else { n }, has_ghost);
        let sizes = size_tokens
            .iter()
            .zip(demes.iter())
            .map(|(token, deme)| Symbol::recognize(token, [SizeVar::Population(deme).into()]))
            .collect();

        cursor.comment("sample sizes header")?;
        let sample_sizes = (0..n)
            .map(|_| cursor.number("sample size"))
            .collect::<Result<Vec<u32>, _>>()?;

        cursor.comment("growth rates header")?;
        let growth_rates = (0..n)
            .map(|_| cursor.number("growth rate"))
            .collect::<Result<Vec<f64>, _>>()?;

        cursor.comment("migration matrix count header")?;
        let matrix_count: usize = cursor.number("migration matrix count")?;
        let matrices = (0..matrix_count)
            .map(|_| parse_matrix(&mut cursor, &demes))
            .collect::<Result<Vec<_>, _>>()?;

        cursor.comment("historical events header")?;
        let (line, count_line) = cursor.next("historical event count")?;
        let count_token = count_line.split_whitespace().next().unwrap_or_default();
        let event_count: usize = parse_number(line, count_token)?;
        let mut events = Vec::with_capacity(event_count);
        for _ in 0..event_count {
            let (line, record) = cursor.next("historical event record")?;
            events.push(parse_event(line, record, &demes)?);
        }

        let family = MigrationFamily::infer(&events, matrices.len());
        Ok(Topology {
            demes,
            sizes,
            sample_sizes,
            growth_rates,
            matrices,
            events,
            family,
        })
    }
}
