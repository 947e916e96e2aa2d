use log::{debug, info};

use crate::cost_matrix::CostMatrix;
use crate::parsimony::{ColumnTables, FixedAlignment, InsertionPoints};
use crate::tree::Tree;

/// Dollo parsimony weighted by a cost matrix. Per column, Sankoff tables are computed only
/// inside the clade carrying the residue; every node outside that clade takes over the clade
/// root's table and is flagged as lacking the residue.
#[derive(Debug, Clone)]
pub struct WeightedDolloParsimony<'a> {
    tree: &'a Tree,
    columns: Vec<ColumnTables>,
}

impl<'a> WeightedDolloParsimony<'a> {
    /// Symbols of the alignment must be covered by the matrix, see
    /// [`CostMatrix::validate_symbols`].
    pub fn new(
        aln: &FixedAlignment<'a>,
        points: &InsertionPoints,
        costs: &CostMatrix,
    ) -> WeightedDolloParsimony<'a> {
        info!("Starting weighted Dollo parsimony on {} columns.", aln.len());
        let parsimony = WeightedDolloParsimony {
            tree: aln.tree(),
            columns: score_columns(aln, points, costs),
        };
        info!("Finished weighted Dollo parsimony with score {}.", parsimony.score());
        parsimony
    }

    pub fn score(&self) -> f64 {
        self.column_scores().iter().sum()
    }

    /// Minimum of the root table of every column.
    pub fn column_scores(&self) -> Vec<f64> {
        self.columns
            .iter()
            .map(|tables| tables.min(&self.tree.root))
            .collect()
    }

    pub fn column(&self, column: usize) -> &ColumnTables {
        &self.columns[column]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn score_column(
    aln: &FixedAlignment,
    points: &InsertionPoints,
    costs: &CostMatrix,
    column: usize,
) -> ColumnTables {
    let tree = aln.tree();
    let size = costs.size();
    let mut tables = ColumnTables::new(tree.len(), size);
    for (idx, seq) in aln.rows() {
        if let Some(observed) = costs.alphabet().index(seq[column]) {
            tables.table_mut(idx)[observed] = 0.0;
        }
    }

    let anchor = points.anchor(tree, column);
    for node_idx in tree.postorder_subroot(&anchor) {
        if tree.is_leaf(&node_idx) {
            continue;
        }
        let children = tree.children(&node_idx);
        let table: Vec<f64> = (0..size)
            .map(|c| {
                cheapest_change(costs, c, tables.table(&children[0]))
                    + cheapest_change(costs, c, tables.table(&children[1]))
            })
            .collect();
        tables.table_mut(&node_idx).copy_from_slice(&table);
    }

    for node_idx in tree.postorder() {
        if !tree.is_in_subtree(&anchor, node_idx) {
            tables.copy_table(&anchor, node_idx);
            tables.flag(node_idx);
        }
    }
    debug!(
        "Column {} scored inside {} with minimum {}.",
        column,
        anchor,
        tables.min(&tree.root)
    );
    tables
}

/// `min_k(child[k] + cost[c][k])`
fn cheapest_change(costs: &CostMatrix, c: usize, child: &[f64]) -> f64 {
    child
        .iter()
        .enumerate()
        .map(|(k, score)| score + costs.cost_idx(c, k))
        .fold(f64::INFINITY, f64::min)
}

cfg_if::cfg_if! {
if #[cfg(feature = "par-columns")] {
fn score_columns(
    aln: &FixedAlignment,
    points: &InsertionPoints,
    costs: &CostMatrix,
) -> Vec<ColumnTables> {
    use rayon::prelude::*;
    (0..aln.len())
        .into_par_iter()
        .map(|column| score_column(aln, points, costs, column))
        .collect()
}
} else {
fn score_columns(
    aln: &FixedAlignment,
    points: &InsertionPoints,
    costs: &CostMatrix,
) -> Vec<ColumnTables> {
    (0..aln.len())
        .map(|column| score_column(aln, points, costs, column))
        .collect()
}
}
}

