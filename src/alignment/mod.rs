use anyhow::bail;
use bio::io::fasta::Record;
use log::{debug, info};

use crate::alphabets::{ParsimonySet, GAP};
use crate::cost_matrix::CostMatrix;
use crate::errors::DolloError;
use crate::sequences::Sequences;
use crate::tree::{NodeIdx, NodeIdx::Internal as Int, NodeIdx::Leaf, Tree};
use crate::Result;

pub mod matrices;
pub(crate) use matrices::*;
pub mod scoring;
pub use scoring::*;

pub type Mapping = Vec<Option<usize>>;

/// Column mapping of two profiles into their merged profile: entry `k` names the column of each
/// side that lands in merged column `k`, or `None` for a gap.
#[derive(Clone, Debug, PartialEq)]
pub struct PairwiseAlignment {
    pub map_x: Mapping,
    pub map_y: Mapping,
}

impl PairwiseAlignment {
    pub fn new(map_x: Mapping, map_y: Mapping) -> PairwiseAlignment {
        PairwiseAlignment { map_x, map_y }
    }

    pub fn len(&self) -> usize {
        self.map_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map_x.is_empty()
    }
}

/// Sub-alignment of the leaves below a node together with one character set per column.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    leaves: Vec<NodeIdx>,
    rows: Vec<Vec<u8>>,
    sets: Vec<ParsimonySet>,
}

impl Profile {
    /// Single row holding the sequence without its gaps.
    pub fn leaf(idx: NodeIdx, seq: &[u8]) -> Profile {
        let row: Vec<u8> = seq.iter().copied().filter(|&c| c != GAP).collect();
        Profile {
            leaves: vec![idx],
            sets: row.iter().map(|&c| ParsimonySet::single(c)).collect(),
            rows: vec![row],
        }
    }

    /// Stacks the rows of `x` on top of the rows of `y`, laid out by `alignment`.
    pub fn merge(
        x: Profile,
        y: Profile,
        alignment: &PairwiseAlignment,
        sets: Vec<ParsimonySet>,
    ) -> Profile {
        let mut rows = Vec::with_capacity(x.rows.len() + y.rows.len());
        rows.extend(x.rows.iter().map(|row| spread(row, &alignment.map_x)));
        rows.extend(y.rows.iter().map(|row| spread(row, &alignment.map_y)));
        let mut leaves = x.leaves;
        leaves.extend(y.leaves);
        Profile { leaves, rows, sets }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[ParsimonySet] {
        &self.sets
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn leaves(&self) -> &[NodeIdx] {
        &self.leaves
    }
}

fn spread(row: &[u8], map: &Mapping) -> Vec<u8> {
    map.iter()
        .map(|site| site.map_or(GAP, |col| row[col]))
        .collect()
}

/// Result of aligning all leaf sequences up the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct DolloAlignment {
    score: f64,
    root: Profile,
    node_scores: Vec<f64>,
    node_sets: Vec<Vec<ParsimonySet>>,
}

impl DolloAlignment {
    /// Sum of the alignment scores of every internal node.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Leaves in row order.
    pub fn leaf_order(&self) -> &[NodeIdx] {
        self.root.leaves()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        self.root.rows()
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Score of the pairwise alignment made at `idx`, 0 for leaves.
    pub fn node_score(&self, idx: &NodeIdx) -> f64 {
        self.node_scores[usize::from(idx)]
    }

    /// Column sets of the profile built at `idx`.
    pub fn node_sets(&self, idx: &NodeIdx) -> &[ParsimonySet] {
        &self.node_sets[usize::from(idx)]
    }

    /// Aligned rows as FASTA records named after their leaves.
    pub fn records(&self, tree: &Tree) -> Vec<Record> {
        self.leaf_order()
            .iter()
            .zip(self.rows())
            .map(|(idx, row)| Record::with_attrs(tree.node_id(idx), None, row))
            .collect()
    }
}

pub trait Aligner {
    fn align(&self, tree: &Tree, seqs: &Sequences) -> Result<DolloAlignment>;
}

/// Aligns leaf sequences bottom-up: every internal node aligns the profiles of its two children
/// with a profile-profile dynamic program.
#[derive(Clone, Debug)]
pub struct ProgressiveAligner<S: ProfileScoring> {
    pub scoring: S,
}

impl Default for ProgressiveAligner<UnitScoring> {
    fn default() -> Self {
        ProgressiveAligner {
            scoring: UnitScoring::default(),
        }
    }
}

impl<S: ProfileScoring> ProgressiveAligner<S> {
    pub fn new(scoring: S) -> ProgressiveAligner<S> {
        ProgressiveAligner { scoring }
    }

    pub fn pairwise_align(
        &self,
        x_sets: &[ParsimonySet],
        y_sets: &[ParsimonySet],
    ) -> (Vec<ParsimonySet>, PairwiseAlignment, f64) {
        let mut mats = ProfileAlignmentMatrices::new(x_sets, y_sets, &self.scoring);
        mats.fill_matrices();
        mats.traceback()
    }
}

impl<S: ProfileScoring> Aligner for ProgressiveAligner<S> {
    fn align(&self, tree: &Tree, seqs: &Sequences) -> Result<DolloAlignment> {
        info!("Starting the progressive Dollo alignment of {} leaves.", tree.n);
        let mut profiles: Vec<Option<Profile>> = vec![None; tree.len()];
        for (idx, seq) in seqs.leaf_rows(tree)? {
            if let Some(&symbol) = seq.iter().find(|c| !c.is_ascii()) {
                bail!(DolloError::UnsupportedSymbol { symbol });
            }
            profiles[usize::from(idx)] = Some(Profile::leaf(idx, seq));
        }

        let mut node_scores = vec![0.0; tree.len()];
        let mut node_sets = vec![Vec::new(); tree.len()];
        for &node_idx in tree.postorder() {
            match node_idx {
                Int(idx) => {
                    let children = tree.children(&node_idx);
                    let (x, y) = match (
                        profiles[usize::from(children[0])].take(),
                        profiles[usize::from(children[1])].take(),
                    ) {
                        (Some(x), Some(y)) => (x, y),
                        _ => bail!(DolloError::MalformedTree {
                            node: tree.node(&node_idx).label(),
                            reason: "child profile is missing".to_string(),
                        }),
                    };
                    debug!(
                        "Aligning profiles of {} and {} columns at {}",
                        x.len(),
                        y.len(),
                        node_idx
                    );
                    let (sets, alignment, score) = self.pairwise_align(x.sets(), y.sets());
                    debug!("Alignment at {} complete with score {}", node_idx, score);
                    node_sets[idx] = sets.clone();
                    node_scores[idx] = score;
                    profiles[idx] = Some(Profile::merge(x, y, &alignment, sets));
                }
                Leaf(idx) => {
                    if let Some(profile) = &profiles[idx] {
                        node_sets[idx] = profile.sets().to_vec();
                    }
                }
            }
        }

        let root = match profiles[usize::from(tree.root)].take() {
            Some(root) => root,
            None => bail!("No profile was built at the root"),
        };
        let score = tree.postorder().iter().map(|idx| node_scores[usize::from(idx)]).sum();
        info!(
            "Finished the progressive Dollo alignment with {} columns and score {}.",
            root.len(),
            score
        );
        Ok(DolloAlignment {
            score,
            root,
            node_scores,
            node_sets,
        })
    }
}

/// Aligns the leaf sequences of `seqs` on `tree`. Gaps in the input are ignored.
///
/// Without a cost matrix every mismatch and every gap column costs 1. With a cost matrix costs
/// are read from it and extending a gap is free.
///
/// # Example
/// ```
/// use dollo::{build_alignment, record_wo_desc as record, tree};
/// use dollo::sequences::Sequences;
/// let tree = tree!("((A,B),C);");
/// let seqs = Sequences::new(vec![
///     record!("A", b"ACGT"),
///     record!("B", b"AGT"),
///     record!("C", b"ACG-T"),
/// ]);
/// let alignment = build_alignment(&tree, &seqs, None).unwrap();
/// assert_eq!(alignment.score(), 1.0);
/// assert_eq!(alignment.rows(), [b"ACGT".to_vec(), b"A-GT".to_vec(), b"ACGT".to_vec()]);
/// ```
pub fn build_alignment(
    tree: &Tree,
    seqs: &Sequences,
    cost_matrix: Option<&CostMatrix>,
) -> Result<DolloAlignment> {
    if let Some(costs) = cost_matrix {
        costs.validate_symbols(seqs)?;
    }
    ProgressiveAligner::new(profile_scoring(cost_matrix, None)).align(tree, seqs)
}
