use bio::io::fasta::Record;
use log::{debug, info};

use crate::alphabets::{Alphabet, ParsimonySet};
use crate::parsimony::{ancestral_sequences, FixedAlignment, InsertionPoints, NodeSites};
use crate::tree::{
    NodeIdx::{self, Internal as Int},
    Tree,
};

/// Unweighted Dollo parsimony on a fixed alignment. Every substitution costs 1, as does every
/// insertion that is not explained by the column's insertion point.
#[derive(Debug, Clone)]
pub struct DolloParsimony<'a> {
    tree: &'a Tree,
    sites: Vec<NodeSites>,
}

impl<'a> DolloParsimony<'a> {
    /// Runs the bottom-up pass over the whole tree.
    pub fn new(aln: &FixedAlignment<'a>, points: &InsertionPoints) -> DolloParsimony<'a> {
        let tree = aln.tree();
        info!("Starting unweighted Dollo parsimony on {} columns.", aln.len());
        let mut sites: Vec<NodeSites> = points
            .flags(tree)
            .into_iter()
            .map(|flags| NodeSites::empty(aln.len(), flags))
            .collect();
        for (idx, seq) in aln.rows() {
            let pos = usize::from(idx);
            let insertion_flags = std::mem::take(&mut sites[pos].insertion_flags);
            sites[pos] = NodeSites::leaf(seq, insertion_flags);
        }

        for &node_idx in tree.postorder() {
            if let Int(idx) = node_idx {
                let children = tree.children(&node_idx);
                let merged = merge_sites(
                    &sites[usize::from(children[0])],
                    &sites[usize::from(children[1])],
                    &sites[idx],
                );
                debug!("Sites at {}: {:?}", node_idx, merged);
                sites[idx] = merged;
            }
        }
        let parsimony = DolloParsimony { tree, sites };
        info!("Finished unweighted Dollo parsimony with score {}.", parsimony.score());
        parsimony
    }

    /// Sum of the root's column scores.
    pub fn score(&self) -> f64 {
        self.sites[usize::from(self.tree.root)].total()
    }

    pub fn column_scores(&self) -> &[u32] {
        &self.sites[usize::from(self.tree.root)].scores
    }

    pub fn node_sites(&self, idx: &NodeIdx) -> &NodeSites {
        &self.sites[usize::from(idx)]
    }

    pub fn ancestral_sequences(&self, alphabet: &Alphabet) -> Vec<Record> {
        ancestral_sequences(self.tree, &self.sites, alphabet)
    }

    pub fn tree(&self) -> &Tree {
        self.tree
    }
}

fn merge_sites(left: &NodeSites, right: &NodeSites, node: &NodeSites) -> NodeSites {
    let mut merged = node.clone();
    for column in 0..node.len() {
        (merged.sets[column], merged.scores[column]) = merge_site(
            (left.sets[column], left.scores[column]),
            (right.sets[column], right.scores[column]),
            node.is_flagged(column),
        );
    }
    merged
}

/// Combines the set and score of two children at one column. A gap on one side is an
/// insertion on the other side unless the node sits directly above the insertion point, in
/// which case the node itself had no residue.
pub fn merge_site(
    (left_set, left_score): (ParsimonySet, u32),
    (right_set, right_score): (ParsimonySet, u32),
    insertion_flag: bool,
) -> (ParsimonySet, u32) {
    let score = left_score + right_score;
    match (left_set.is_gap(), right_set.is_gap()) {
        (true, true) => (ParsimonySet::gap(), score),
        (true, false) | (false, true) if insertion_flag => (ParsimonySet::gap(), score),
        (true, false) => (right_set, score + 1),
        (false, true) => (left_set, score + 1),
        (false, false) if left_set.is_disjoint(&right_set) => (left_set | right_set, score + 1),
        (false, false) => (left_set & right_set, score),
    }
}
