use std::fmt::{self, Debug};

use bio::io::fasta::Record;
use fixedbitset::FixedBitSet;

use crate::alphabets::{Alphabet, ParsimonySet, GAP};
use crate::tree::{NodeIdx, Tree};

/// Sets, scores and insertion flags of one node, one entry per alignment column.
#[derive(Clone, PartialEq)]
pub struct NodeSites {
    pub sets: Vec<ParsimonySet>,
    pub scores: Vec<u32>,
    pub insertion_flags: FixedBitSet,
}

impl Debug for NodeSites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (column, (set, score)) in self.sets.iter().zip(&self.scores).enumerate() {
            let flag = if self.insertion_flags[column] { "*" } else { "" };
            write!(f, "{set}:{score}{flag} ")?;
        }
        Ok(())
    }
}

impl NodeSites {
    /// Singleton sets of the observed symbols at zero score.
    pub fn leaf(seq: &[u8], insertion_flags: FixedBitSet) -> NodeSites {
        NodeSites {
            sets: seq.iter().map(|&c| ParsimonySet::single(c)).collect(),
            scores: vec![0; seq.len()],
            insertion_flags,
        }
    }

    /// Empty sets to be filled by a bottom-up pass.
    pub fn empty(len: usize, insertion_flags: FixedBitSet) -> NodeSites {
        NodeSites {
            sets: vec![ParsimonySet::empty(); len],
            scores: vec![0; len],
            insertion_flags,
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn is_flagged(&self, column: usize) -> bool {
        self.insertion_flags[column]
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().map(|&s| f64::from(s)).sum()
    }
}

/// Sankoff tables of every node for one column. Each node owns a row of alphabet size holding
/// the minimal cost of its subtree given each ancestral symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTables {
    size: usize,
    values: Vec<f64>,
    insertion_flags: FixedBitSet,
}

impl ColumnTables {
    pub(crate) fn new(nodes: usize, size: usize) -> ColumnTables {
        ColumnTables {
            size,
            values: vec![f64::INFINITY; nodes * size],
            insertion_flags: FixedBitSet::with_capacity(nodes),
        }
    }

    pub fn table(&self, node: &NodeIdx) -> &[f64] {
        let start = usize::from(node) * self.size;
        &self.values[start..start + self.size]
    }

    pub(crate) fn table_mut(&mut self, node: &NodeIdx) -> &mut [f64] {
        let start = usize::from(node) * self.size;
        &mut self.values[start..start + self.size]
    }

    /// Overwrites the table of `to` with the table of `from`.
    pub(crate) fn copy_table(&mut self, from: &NodeIdx, to: &NodeIdx) {
        let from = usize::from(from) * self.size;
        let to = usize::from(to) * self.size;
        self.values.copy_within(from..from + self.size, to);
    }

    pub(crate) fn flag(&mut self, node: &NodeIdx) {
        self.insertion_flags.insert(usize::from(node));
    }

    pub fn is_flagged(&self, node: &NodeIdx) -> bool {
        self.insertion_flags[usize::from(node)]
    }

    pub fn min(&self, node: &NodeIdx) -> f64 {
        self.table(node).iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// One sequence per internal node in preorder: '-' for empty or gap-only sets, otherwise the
/// first member of the set in alphabet order. Unnamed nodes are keyed by their index.
pub fn ancestral_sequences(tree: &Tree, sites: &[NodeSites], alphabet: &Alphabet) -> Vec<Record> {
    tree.preorder()
        .iter()
        .filter(|idx| !tree.is_leaf(idx))
        .map(|idx| {
            let seq: Vec<u8> = sites[usize::from(idx)]
                .sets
                .iter()
                .map(|set| alphabet.representative(set).unwrap_or(GAP))
                .collect();
            Record::with_attrs(&tree.node(idx).label(), None, &seq)
        })
        .collect()
}
