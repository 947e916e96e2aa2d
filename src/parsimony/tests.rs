use approx::assert_relative_eq;
use assert_matches::assert_matches;
use rstest::rstest;

use crate::alphabets::{dna_alphabet, ParsimonySet};
use crate::cost_matrix::CostMatrix;
use crate::errors::DolloError;
use crate::parsimony::{
    fitch_site, merge_site, score_fixed_alignment, CladeFitchParsimony, DolloParsimony,
    FixedAlignment, InsertionPoints, NodeSites, WeightedDolloParsimony,
};
use crate::record_wo_desc as record;
use crate::sequences::Sequences;
use crate::tree::NodeIdx::{Internal as I, Leaf as L};
use crate::{set, tree};

// Arena of "((A,B),(C,D));": I0 root, I1 (A,B), L2 A, L3 B, I4 (C,D), L5 C, L6 D.
const BALANCED: &str = "((A,B),(C,D));";

fn balanced_seqs() -> Sequences {
    Sequences::new(vec![
        record!("A", b"ACGT--"),
        record!("B", b"ACG---"),
        record!("C", b"TC--T-"),
        record!("D", b"TC--G-"),
    ])
}

#[rstest]
#[case::two_gaps(b"-", 0, b"-", 0, false, b"-", 0)]
#[case::two_gaps_score_on_first(b"-", 1, b"-", 0, false, b"-", 1)]
#[case::two_gaps_score_on_second(b"-", 0, b"-", 2, false, b"-", 2)]
#[case::two_gaps_scores_on_both(b"-", 1, b"-", 2, false, b"-", 3)]
#[case::first_single_residue(b"A", 1, b"-", 0, false, b"A", 2)]
#[case::first_single_residue_flagged(b"A", 1, b"-", 0, true, b"-", 1)]
#[case::first_two_residues(b"AT", 1, b"-", 0, false, b"AT", 2)]
#[case::first_two_residues_flagged(b"AT", 1, b"-", 0, true, b"-", 1)]
#[case::second_two_residues(b"-", 1, b"TC", 0, false, b"TC", 2)]
#[case::second_two_residues_flagged(b"-", 1, b"TC", 0, true, b"-", 1)]
#[case::shared_single(b"A", 1, b"AT", 2, false, b"A", 3)]
#[case::shared_single_second(b"T", 3, b"AT", 2, false, b"T", 5)]
#[case::shared_many(b"ATCG-", 3, b"ATCG-", 2, false, b"ATCG-", 5)]
#[case::disjoint_pair(b"A", 1, b"T", 1, false, b"AT", 3)]
#[case::disjoint_all(b"A", 1, b"TCG-", 2, false, b"ATCG-", 4)]
fn merge_one_site(
    #[case] left_set: &[u8],
    #[case] left_score: u32,
    #[case] right_set: &[u8],
    #[case] right_score: u32,
    #[case] insertion_flag: bool,
    #[case] expected_set: &[u8],
    #[case] expected_score: u32,
) {
    let merged = merge_site(
        (set!(left_set), left_score),
        (set!(right_set), right_score),
        insertion_flag,
    );
    assert_eq!(merged, (set!(expected_set), expected_score));
}

#[rstest]
#[case::one_char(b"A".as_slice())]
#[case::gap(b"-".as_slice())]
#[case::many_chars(b"ATCG-".as_slice())]
#[case::long(&[b'A'; 200])]
fn leaf_sites(#[case] seq: &[u8]) {
    let sites = NodeSites::leaf(seq, Default::default());
    assert_eq!(sites.len(), seq.len());
    assert!(sites.scores.iter().all(|&s| s == 0));
    for (set, &c) in sites.sets.iter().zip(seq) {
        assert_eq!(*set, ParsimonySet::single(c));
    }
}

#[test]
fn fitch_ignores_gaps() {
    assert_eq!(
        fitch_site((set!(b"A"), 0), (set!(b"-"), 0)),
        (set!(b"A-"), 1)
    );
    assert_eq!(fitch_site((set!(b"AC"), 1), (set!(b"C"), 0)), (set!(b"C"), 1));
}

#[test]
fn insertion_points() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let points = InsertionPoints::locate(&aln);
    assert_eq!(points.len(), 6);

    let clades: Vec<_> = (0..5).map(|i| points.clade(i).unwrap()).collect();
    assert_eq!(clades, [I(0), I(0), I(1), L(2), I(4)]);
    assert_eq!(
        points.clade(5).unwrap_err().downcast_ref::<DolloError>(),
        Some(&DolloError::EmptyLeafSet { column: 5 })
    );
    assert_eq!(points.anchor(&tree, 5), I(0));

    let insertion_nodes: Vec<_> = (0..6).map(|i| points.insertion_node(&tree, i)).collect();
    assert_eq!(
        insertion_nodes,
        [None, None, Some(I(0)), Some(I(1)), Some(I(0)), None]
    );
}

#[test]
fn insertion_flags_are_unique() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let flags = InsertionPoints::locate(&aln).flags(&tree);
    assert_eq!(flags.len(), tree.len());
    for column in 0..aln.len() {
        assert!(flags.iter().filter(|f| f[column]).count() <= 1);
    }
    assert_eq!(flags[0].ones().collect::<Vec<_>>(), [2, 4]);
    assert_eq!(flags[1].ones().collect::<Vec<_>>(), [3]);
    assert!(flags[4].is_clear());
}

#[test]
fn cherry_with_single_residue() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"T"), record!("B", b"-"), record!("C", b"-")]);
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let points = InsertionPoints::locate(&aln);
    assert_eq!(points.insertion_node(&tree, 0), Some(I(1)));

    let parsimony = DolloParsimony::new(&aln, &points);
    assert!(parsimony.node_sites(&I(1)).is_flagged(0));
    assert!(!parsimony.node_sites(&I(0)).is_flagged(0));
    assert_eq!(parsimony.node_sites(&I(1)).sets[0], ParsimonySet::gap());
    assert_eq!(parsimony.column_scores(), [0]);
    assert_eq!(parsimony.score(), 0.0);
}

#[test]
fn shared_pair_with_outgroup() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"A"), record!("B", b"A"), record!("C", b"C")]);
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = DolloParsimony::new(&aln, &InsertionPoints::locate(&aln));
    assert_eq!(parsimony.node_sites(&I(1)).sets[0], set!(b"A"));
    assert_eq!(parsimony.node_sites(&I(0)).sets[0], set!(b"AC"));
    assert_eq!(parsimony.score(), 1.0);
}

#[test]
fn unweighted_balanced_tree() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = DolloParsimony::new(&aln, &InsertionPoints::locate(&aln));
    assert_eq!(parsimony.column_scores(), [1, 0, 0, 0, 1, 0]);
    assert_eq!(parsimony.score(), 2.0);
    assert_eq!(parsimony.node_sites(&I(4)).sets[4], set!(b"GT"));
    assert_eq!(parsimony.node_sites(&I(0)).sets[4], ParsimonySet::gap());
}

#[test]
fn scoring_is_idempotent() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let points = InsertionPoints::locate(&aln);
    let first = DolloParsimony::new(&aln, &points);
    let second = DolloParsimony::new(&aln, &InsertionPoints::locate(&aln));
    for node in tree.postorder() {
        assert_eq!(first.node_sites(node), second.node_sites(node));
    }
    assert_eq!(first.score(), second.score());
}

#[rstest]
#[case::balanced(BALANCED, balanced_seqs())]
#[case::ladder(
    "(((A,B),C),D);",
    Sequences::new(vec![
        record!("A", b"AAT-G"),
        record!("B", b"AC--G"),
        record!("C", b"GC--T"),
        record!("D", b"GT--A"),
    ])
)]
#[case::residues_everywhere(
    "((A,B),(C,D));",
    Sequences::new(vec![
        record!("A", b"ACGT"),
        record!("B", b"TCGA"),
        record!("C", b"ACCA"),
        record!("D", b"GCTA"),
    ])
)]
fn unit_matrix_matches_unweighted(#[case] newick: &str, #[case] seqs: Sequences) {
    let tree = tree!(newick);
    let unit = CostMatrix::unit(&dna_alphabet());
    let unweighted = score_fixed_alignment(&tree, &seqs, None).unwrap();
    let weighted = score_fixed_alignment(&tree, &seqs, Some(&unit)).unwrap();
    assert_relative_eq!(unweighted, weighted);
}

#[test]
fn weighted_transition_at_root() {
    let tree = tree!("(A,B);");
    let seqs = Sequences::new(vec![record!("A", b"T"), record!("B", b"C")]);
    let score = score_fixed_alignment(&tree, &seqs, Some(&CostMatrix::nucleotide_default()));
    assert_relative_eq!(score.unwrap(), 1.0);
}

#[test]
fn weighted_tables_outside_clade() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let costs = CostMatrix::unit(&dna_alphabet());
    let parsimony = WeightedDolloParsimony::new(&aln, &InsertionPoints::locate(&aln), &costs);
    assert_eq!(parsimony.len(), 6);
    assert_eq!(parsimony.column_scores(), [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

    let column = parsimony.column(2);
    assert_eq!(column.table(&I(1)), [2.0, 2.0, 0.0, 2.0, 2.0]);
    for node in [I(0), I(4), L(5), L(6)] {
        assert!(column.is_flagged(&node));
        assert_eq!(column.table(&node), column.table(&I(1)));
    }
    for node in [I(1), L(2), L(3)] {
        assert!(!column.is_flagged(&node));
    }
    assert_eq!(column.table(&L(2)), [f64::INFINITY, f64::INFINITY, 0.0, f64::INFINITY, f64::INFINITY]);

    let all_gaps = parsimony.column(5);
    assert!(!all_gaps.is_flagged(&I(0)));
    assert_eq!(all_gaps.min(&I(0)), 0.0);
}

#[test]
fn weighted_all_gap_column_uses_gap_costs() {
    let tree = tree!("(A,B);");
    let seqs = Sequences::new(vec![record!("A", b"A-"), record!("B", b"A-")]);
    let costs = CostMatrix::nucleotide_default();
    assert_relative_eq!(score_fixed_alignment(&tree, &seqs, Some(&costs)).unwrap(), 0.0);
}

#[test]
fn clade_fitch_scores() {
    let tree = tree!(BALANCED);
    let seqs = balanced_seqs();
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = CladeFitchParsimony::new(&aln, &InsertionPoints::locate(&aln));
    assert_eq!(parsimony.column_scores(), [1, 0, 0, 0, 1, 0]);
    assert_eq!(parsimony.score(), 2.0);
    assert_eq!(parsimony.node_sites(&I(0)).sets[2], set!(b"G"));
    assert_eq!(parsimony.node_sites(&I(0)).sets[3], set!(b"T"));
    assert_eq!(parsimony.node_sites(&I(0)).sets[5], ParsimonySet::gap());
    assert!(parsimony.node_sites(&I(4)).sets[2].is_empty());
}

#[test]
fn clade_fitch_counts_gaps_inside_clade() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"A"), record!("B", b"-"), record!("C", b"A")]);
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = CladeFitchParsimony::new(&aln, &InsertionPoints::locate(&aln));
    assert_eq!(parsimony.node_sites(&I(1)).sets[0], set!(b"A-"));
    assert_eq!(parsimony.node_sites(&I(0)).sets[0], set!(b"A"));
    assert_eq!(parsimony.score(), 1.0);
}

#[test]
fn ancestral_sequences_are_deterministic() {
    let tree = tree!("((A,B)X,C)R;");
    let seqs = Sequences::new(vec![
        record!("A", b"AT"),
        record!("B", b"A-"),
        record!("C", b"C-"),
    ]);
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = DolloParsimony::new(&aln, &InsertionPoints::locate(&aln));
    let ancestors = parsimony.ancestral_sequences(&dna_alphabet());
    assert_eq!(ancestors.len(), 2);
    assert_eq!(ancestors[0].id(), "R");
    assert_eq!(ancestors[0].seq(), b"A-");
    assert_eq!(ancestors[1].id(), "X");
    assert_eq!(ancestors[1].seq(), b"A-");
}

#[test]
fn unnamed_ancestors_use_index() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"G"), record!("B", b"T"), record!("C", b"T")]);
    let aln = FixedAlignment::new(&tree, &seqs).unwrap();
    let parsimony = DolloParsimony::new(&aln, &InsertionPoints::locate(&aln));
    let ids: Vec<_> = parsimony
        .ancestral_sequences(&dna_alphabet())
        .iter()
        .map(|rec| rec.id().to_string())
        .collect();
    assert_eq!(ids, ["I0", "I1"]);
}

#[test]
fn length_mismatch() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"AC"), record!("B", b"A"), record!("C", b"AC")]);
    let err = score_fixed_alignment(&tree, &seqs, None).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DolloError>(),
        Some(&DolloError::SequenceLengthMismatch {
            id: "B".to_string(),
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn leaf_without_sequence() {
    let tree = tree!("((A,B),C);");
    let seqs = Sequences::new(vec![record!("A", b"AC"), record!("C", b"AC")]);
    let err = score_fixed_alignment(&tree, &seqs, None).unwrap_err();
    assert_matches!(
        err.downcast_ref::<DolloError>(),
        Some(DolloError::MalformedTree { .. })
    );
}

#[test]
fn symbol_missing_from_cost_matrix() {
    let tree = tree!("(A,B);");
    let seqs = Sequences::new(vec![record!("A", b"AN"), record!("B", b"AC")]);
    let err = score_fixed_alignment(&tree, &seqs, Some(&CostMatrix::nucleotide_default()))
        .unwrap_err();
    assert_matches!(
        err.downcast_ref::<DolloError>(),
        Some(DolloError::IncompleteCostMatrix { symbol: 'N', .. })
    );
}

#[test]
fn non_ascii_symbol() {
    let tree = tree!("(A,B);");
    let seqs = Sequences::new(vec![
        record!("A", "Aé".as_bytes()),
        record!("B", b"ACG"),
    ]);
    let err = score_fixed_alignment(&tree, &seqs, None).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DolloError>(),
        Some(&DolloError::UnsupportedSymbol { symbol: 0xC3 })
    );
}

#[test]
fn empty_alignment() {
    let tree = tree!("(A,B);");
    let seqs = Sequences::new(vec![record!("A", b""), record!("B", b"")]);
    assert_eq!(score_fixed_alignment(&tree, &seqs, None).unwrap(), 0.0);
}
