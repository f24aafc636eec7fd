//! Migration matrices.

use super::{DemeList, Symbol, Variable};

/// Literal written for a cell without migration.
pub const ZERO_RATE: &str = "0.000";

/// One N×N migration matrix. Cell `[i][j]` is the rate from deme `i` to
/// deme `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationMatrix {
    pub index: usize,
    pub cells: Vec<Vec<Symbol>>,
}

impl MigrationMatrix {
    /// Matrix with a free rate between every pair of distinct demes.
    ///
    /// With `per_matrix_rates` the rate names carry this matrix's index so no
    /// two matrices share a sampled rate.
    pub fn full(demes: &DemeList, index: usize, per_matrix_rates: bool) -> Self {
        let cells = demes
            .iter()
            .enumerate()
            .map(|(i, from)| {
                demes
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            Symbol::fixed(ZERO_RATE)
                        } else {
                            Symbol::Var(Variable::MigrationRate {
                                from,
                                to,
                                matrix: per_matrix_rates.then_some(index),
                            })
                        }
                    })
                    .collect()
            })
            .collect();
        Self { index, cells }
    }

    /// Matrix with no migration at all.
    pub fn zero(deme_count: usize, index: usize) -> Self {
        Self {
            index,
            cells: vec![vec![Symbol::fixed(ZERO_RATE); deme_count]; deme_count],
        }
    }

    pub fn dimension(&self) -> usize {
        self.cells.len()
    }

    /// Whether every cell is the fixed zero rate.
    pub fn is_zero(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .all(|c| matches!(c, Symbol::Fixed(s) if s == ZERO_RATE))
    }

    /// Rate variables in row-major order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.cells.iter().flatten().filter_map(Symbol::variable)
    }

    /// Header line followed by one line per row.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.cells.len() + 1);
        lines.push(format!("//Migration matrix {}", self.index));
        for row in &self.cells {
            let row: Vec<String> = row.iter().map(ToString::to_string).collect();
            lines.push(row.join(" "));
        }
        lines
    }
}
