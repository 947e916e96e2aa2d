use anyhow::bail;
use fixedbitset::FixedBitSet;
use log::debug;

use crate::errors::DolloError;
use crate::parsimony::FixedAlignment;
use crate::tree::{NodeIdx, Tree};
use crate::Result;

/// Per column, the minimal clade whose leaves could carry the residue. A column where no leaf
/// has a residue has no clade.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionPoints {
    clades: Vec<Option<NodeIdx>>,
}

impl InsertionPoints {
    /// Locates the clade of every column: the single leaf with a residue, or the minimal common
    /// ancestor of all leaves with a residue.
    pub fn locate(aln: &FixedAlignment) -> InsertionPoints {
        let clades = locate_clades(aln);
        let empty = clades.iter().filter(|clade| clade.is_none()).count();
        if empty > 0 {
            debug!("{empty} columns carry no residue and are scored as no-ops.");
        }
        InsertionPoints { clades }
    }

    pub fn len(&self) -> usize {
        self.clades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clades.is_empty()
    }

    pub fn clade(&self, column: usize) -> Result<NodeIdx> {
        match self.clades[column] {
            Some(clade) => Ok(clade),
            None => bail!(DolloError::EmptyLeafSet { column }),
        }
    }

    /// Subtree root a column is scored in: its clade, or the tree root for all-gap columns.
    pub fn anchor(&self, tree: &Tree, column: usize) -> NodeIdx {
        match self.clade(column) {
            Ok(clade) => clade,
            Err(e) => {
                debug!("{e}, using the root.");
                tree.root
            }
        }
    }

    /// Node directly above the clade of a column, where the insertion happened. None if the clade
    /// is the root or the column has no residues.
    pub fn insertion_node(&self, tree: &Tree, column: usize) -> Option<NodeIdx> {
        self.clades[column].and_then(|clade| tree.parent(&clade).copied())
    }

    /// Insertion flags of every node, indexed by node position, one bit per column.
    pub fn flags(&self, tree: &Tree) -> Vec<FixedBitSet> {
        let mut flags = vec![FixedBitSet::with_capacity(self.len()); tree.len()];
        for column in 0..self.len() {
            if let Some(node) = self.insertion_node(tree, column) {
                flags[usize::from(node)].insert(column);
            }
        }
        flags
    }
}

fn column_clade(aln: &FixedAlignment, column: usize) -> Option<NodeIdx> {
    let leaves = aln.residue_leaves(column);
    match leaves.as_slice() {
        [leaf] => Some(*leaf),
        _ => aln.tree().mrca(&leaves),
    }
}

cfg_if::cfg_if! {
if #[cfg(feature = "par-columns")] {
fn locate_clades(aln: &FixedAlignment) -> Vec<Option<NodeIdx>> {
    use rayon::prelude::*;
    (0..aln.len())
        .into_par_iter()
        .map(|column| column_clade(aln, column))
        .collect()
}
} else {
fn locate_clades(aln: &FixedAlignment) -> Vec<Option<NodeIdx>> {
    (0..aln.len())
        .map(|column| column_clade(aln, column))
        .collect()
}
}
}
