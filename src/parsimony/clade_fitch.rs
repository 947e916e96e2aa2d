use bio::io::fasta::Record;
use log::info;

use crate::alphabets::{Alphabet, ParsimonySet};
use crate::parsimony::{ancestral_sequences, FixedAlignment, InsertionPoints, NodeSites};
use crate::tree::{NodeIdx, Tree};

/// Fitch parsimony run per column only inside the clade carrying the residue. The clade root's
/// set and score are carried up to the tree root, nodes between them keep empty sets.
#[derive(Debug, Clone)]
pub struct CladeFitchParsimony<'a> {
    tree: &'a Tree,
    sites: Vec<NodeSites>,
}

impl<'a> CladeFitchParsimony<'a> {
    pub fn new(aln: &FixedAlignment<'a>, points: &InsertionPoints) -> CladeFitchParsimony<'a> {
        let tree = aln.tree();
        info!("Starting clade restricted Fitch parsimony on {} columns.", aln.len());
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

        for column in 0..aln.len() {
            let anchor = match points.clade(column) {
                Ok(clade) => clade,
                Err(_) => {
                    sites[usize::from(tree.root)].sets[column] = ParsimonySet::gap();
                    continue;
                }
            };
            for node_idx in tree.postorder_subroot(&anchor) {
                if tree.is_leaf(&node_idx) {
                    continue;
                }
                let children = tree.children(&node_idx);
                let (left, right) = (usize::from(children[0]), usize::from(children[1]));
                let (set, score) = fitch_site(
                    (sites[left].sets[column], sites[left].scores[column]),
                    (sites[right].sets[column], sites[right].scores[column]),
                );
                let node = &mut sites[usize::from(node_idx)];
                node.sets[column] = set;
                node.scores[column] = score;
            }
            let (set, score) = {
                let clade = &sites[usize::from(anchor)];
                (clade.sets[column], clade.scores[column])
            };
            let root = &mut sites[usize::from(tree.root)];
            root.sets[column] = set;
            root.scores[column] = score;
        }

        let parsimony = CladeFitchParsimony { tree, sites };
        info!("Finished clade restricted Fitch parsimony with score {}.", parsimony.score());
        parsimony
    }

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
}

/// Intersection at no cost, union at cost 1 when the children disagree.
pub fn fitch_site(
    (left_set, left_score): (ParsimonySet, u32),
    (right_set, right_score): (ParsimonySet, u32),
) -> (ParsimonySet, u32) {
    let score = left_score + right_score;
    if left_set.is_disjoint(&right_set) {
        (left_set | right_set, score + 1)
    } else {
        (left_set & right_set, score)
    }
}
