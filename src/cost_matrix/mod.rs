use std::fmt::{self, Display};

use anyhow::bail;
use hashbrown::HashMap;
use lazy_static::lazy_static;
use log::{debug, info};
use nalgebra::DMatrix;

use crate::alphabets::{dna_alphabet, Alphabet, ParsimonySet, GAP};
use crate::errors::DolloError;
use crate::sequences::Sequences;
use crate::Result;

lazy_static! {
    // Rows and columns in ACGT- order: transitions 1, transversions 1.5, indels 10.
    static ref NUCLEOTIDE_COSTS: DMatrix<f64> = DMatrix::from_row_slice(
        5,
        5,
        &[
            0.0, 1.5, 1.0, 1.5, 10.0, //
            1.5, 0.0, 1.5, 1.0, 10.0, //
            1.0, 1.5, 0.0, 1.5, 10.0, //
            1.5, 1.0, 1.5, 0.0, 10.0, //
            10.0, 10.0, 10.0, 10.0, 0.0,
        ],
    );
}

/// Substitution and indel costs over an alphabet, gap included. Entry `(i, j)` is the cost of
/// changing the symbol with alphabet index `i` into the symbol with index `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    alphabet: Alphabet,
    costs: DMatrix<f64>,
}

impl CostMatrix {
    pub fn new(alphabet: Alphabet, costs: DMatrix<f64>) -> Result<CostMatrix> {
        if costs.nrows() != alphabet.size() || costs.ncols() != alphabet.size() {
            bail!(
                "Cost matrix is {}x{}, expected {}x{} for the alphabet and the gap",
                costs.nrows(),
                costs.ncols(),
                alphabet.size(),
                alphabet.size()
            );
        }
        Ok(CostMatrix { alphabet, costs })
    }

    /// Builds a matrix from nested `from -> to -> cost` maps. Every symbol, the gap included,
    /// needs a full row.
    ///
    /// # Example
    /// ```
    /// use hashbrown::HashMap;
    /// use dollo::cost_matrix::CostMatrix;
    /// let mut map = HashMap::new();
    /// map.insert(b'H', HashMap::from([(b'H', 0.0), (b'P', 2.0), (b'-', 5.0)]));
    /// map.insert(b'P', HashMap::from([(b'H', 2.0), (b'P', 0.0), (b'-', 5.0)]));
    /// map.insert(b'-', HashMap::from([(b'H', 5.0), (b'P', 5.0), (b'-', 0.0)]));
    /// let costs = CostMatrix::from_map(&map).unwrap();
    /// assert_eq!(costs.cost(b'H', b'P'), 2.0);
    /// assert_eq!(costs.cost(b'P', b'-'), 5.0);
    /// ```
    pub fn from_map(map: &HashMap<u8, HashMap<u8, f64>>) -> Result<CostMatrix> {
        if !map.contains_key(&GAP) {
            bail!(DolloError::IncompleteCostMatrix {
                symbol: GAP as char,
                context: "the gap has no row".to_string(),
            });
        }
        let mut symbols: Vec<u8> = map.keys().copied().filter(|&c| c != GAP).collect();
        symbols.sort_unstable();
        let alphabet = Alphabet::new(&symbols)?;
        let all_symbols = alphabet.all_symbols();

        let mut costs = DMatrix::<f64>::zeros(alphabet.size(), alphabet.size());
        for (i, from) in all_symbols.iter().enumerate() {
            let row = &map[from];
            for to in row.keys() {
                if !alphabet.contains(*to) {
                    bail!(DolloError::IncompleteCostMatrix {
                        symbol: *to as char,
                        context: format!("used in row '{}' but has no row", *from as char),
                    });
                }
            }
            for (j, to) in all_symbols.iter().enumerate() {
                match row.get(to) {
                    Some(&cost) => costs[(i, j)] = cost,
                    None => bail!(DolloError::IncompleteCostMatrix {
                        symbol: *to as char,
                        context: format!("missing from row '{}'", *from as char),
                    }),
                }
            }
        }
        debug!("Built a {}x{} cost matrix.", costs.nrows(), costs.ncols());
        CostMatrix::new(alphabet, costs)
    }

    /// Zero for identical symbols, one otherwise.
    pub fn unit(alphabet: &Alphabet) -> CostMatrix {
        let size = alphabet.size();
        CostMatrix {
            alphabet: alphabet.clone(),
            costs: DMatrix::from_fn(size, size, |i, j| if i == j { 0.0 } else { 1.0 }),
        }
    }

    /// DNA costs with transitions at 1, transversions at 1.5 and insertions or deletions at 10.
    pub fn nucleotide_default() -> CostMatrix {
        CostMatrix {
            alphabet: dna_alphabet(),
            costs: NUCLEOTIDE_COSTS.clone(),
        }
    }

    /// Replaces every residue-to-gap and gap-to-residue cost.
    pub fn with_gap_cost(mut self, cost: f64) -> CostMatrix {
        let gap = self.alphabet.gap_index();
        for i in 0..self.alphabet.size() {
            if i != gap {
                self.costs[(i, gap)] = cost;
                self.costs[(gap, i)] = cost;
            }
        }
        self
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    pub fn costs(&self) -> &DMatrix<f64> {
        &self.costs
    }

    pub fn cost_idx(&self, i: usize, j: usize) -> f64 {
        self.costs[(i, j)]
    }

    /// Cost of changing `from` into `to`, infinite for symbols outside the alphabet.
    pub fn cost(&self, from: u8, to: u8) -> f64 {
        match (self.alphabet.index(from), self.alphabet.index(to)) {
            (Some(i), Some(j)) => self.costs[(i, j)],
            _ => f64::INFINITY,
        }
    }

    /// Minimum cost over every pair drawn from the two sets.
    pub fn min_cost(&self, from: &ParsimonySet, to: &ParsimonySet) -> f64 {
        from.iter()
            .flat_map(|a| to.iter().map(move |b| (a, b)))
            .map(|(a, b)| self.cost(a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Cheapest cost of replacing any symbol of the set by a gap.
    pub fn gap_cost(&self, set: &ParsimonySet) -> f64 {
        set.iter()
            .map(|c| self.cost(c, GAP))
            .fold(f64::INFINITY, f64::min)
    }

    /// Fails on the first residue with no row in the matrix.
    pub fn validate_symbols(&self, seqs: &Sequences) -> Result<()> {
        for rec in seqs.iter() {
            if let Some((column, &symbol)) = rec
                .seq()
                .iter()
                .enumerate()
                .find(|&(_, &c)| !self.alphabet.contains(c))
            {
                bail!(DolloError::IncompleteCostMatrix {
                    symbol: symbol as char,
                    context: format!("sequence {} column {}", rec.id(), column),
                });
            }
        }
        info!("All sequence symbols are covered by the cost matrix.");
        Ok(())
    }
}

impl Display for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.alphabet.all_symbols();
        for &c in &symbols {
            write!(f, "\t{}", c as char)?;
        }
        writeln!(f)?;
        for (i, &c) in symbols.iter().enumerate() {
            write!(f, "{}", c as char)?;
            for j in 0..symbols.len() {
                write!(f, "\t{}", self.costs[(i, j)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
