use anyhow::bail;
use log::info;

use crate::alphabets::GAP;
use crate::cost_matrix::CostMatrix;
use crate::errors::DolloError;
use crate::sequences::Sequences;
use crate::tree::{NodeIdx, Tree};
use crate::Result;

pub mod clade_fitch;
pub use clade_fitch::*;
pub mod dollo;
pub use dollo::*;
pub mod insertions;
pub use insertions::*;
pub mod sites;
pub use sites::*;
pub mod weighted;
pub use weighted::*;

/// Leaf rows of a fixed alignment matched to the leaves of a tree. Every row has the same
/// length and only ASCII symbols.
#[derive(Debug, Clone)]
pub struct FixedAlignment<'a> {
    tree: &'a Tree,
    rows: Vec<(NodeIdx, &'a [u8])>,
    len: usize,
}

impl<'a> FixedAlignment<'a> {
    pub fn new(tree: &'a Tree, seqs: &'a Sequences) -> Result<FixedAlignment<'a>> {
        let rows = seqs.leaf_rows(tree)?;
        let len = rows.first().map_or(0, |(_, seq)| seq.len());
        for (idx, seq) in &rows {
            if seq.len() != len {
                bail!(DolloError::SequenceLengthMismatch {
                    id: tree.node(idx).label(),
                    expected: len,
                    found: seq.len(),
                });
            }
            if let Some(&symbol) = seq.iter().find(|c| !c.is_ascii()) {
                bail!(DolloError::UnsupportedSymbol { symbol });
            }
        }
        Ok(FixedAlignment { tree, rows, len })
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn rows(&self) -> &[(NodeIdx, &'a [u8])] {
        &self.rows
    }

    /// Leaves with a residue at `column`.
    pub fn residue_leaves(&self, column: usize) -> Vec<NodeIdx> {
        self.rows
            .iter()
            .filter(|(_, seq)| seq[column] != GAP)
            .map(|(idx, _)| *idx)
            .collect()
    }
}

/// Scores a fixed alignment on a tree under Dollo parsimony.
///
/// Without a cost matrix every substitution and every insertion costs 1. With a cost matrix
/// columns are scored with Sankoff tables restricted to the clade that carries the residue,
/// and every residue must have a row in the matrix.
///
/// # Example
/// ```
/// use dollo::{record_wo_desc as record, score_fixed_alignment, tree};
/// use dollo::cost_matrix::CostMatrix;
/// use dollo::sequences::Sequences;
/// let tree = tree!("((A,B),C);");
/// let seqs = Sequences::new(vec![
///     record!("A", b"AT"),
///     record!("B", b"A-"),
///     record!("C", b"C-"),
/// ]);
/// assert_eq!(score_fixed_alignment(&tree, &seqs, None).unwrap(), 1.0);
/// let costs = CostMatrix::nucleotide_default();
/// assert_eq!(score_fixed_alignment(&tree, &seqs, Some(&costs)).unwrap(), 1.5);
/// ```
pub fn score_fixed_alignment(
    tree: &Tree,
    seqs: &Sequences,
    cost_matrix: Option<&CostMatrix>,
) -> Result<f64> {
    info!(
        "Scoring a fixed alignment of {} sequences on a tree with {} leaves.",
        seqs.len(),
        tree.n
    );
    if let Some(costs) = cost_matrix {
        costs.validate_symbols(seqs)?;
    }
    let aln = FixedAlignment::new(tree, seqs)?;
    let points = InsertionPoints::locate(&aln);
    let score = match cost_matrix {
        Some(costs) => WeightedDolloParsimony::new(&aln, &points, costs).score(),
        None => DolloParsimony::new(&aln, &points).score(),
    };
    info!("Finished scoring {} columns with total score {}.", aln.len(), score);
    Ok(score)
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
