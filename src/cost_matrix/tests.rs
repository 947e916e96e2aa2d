use approx::assert_relative_eq;
use assert_matches::assert_matches;
use hashbrown::HashMap;
use nalgebra::DMatrix;
use rstest::rstest;

use crate::alphabets::{dna_alphabet, Alphabet, GAP};
use crate::cost_matrix::CostMatrix;
use crate::errors::DolloError;
use crate::record_wo_desc as record;
use crate::sequences::Sequences;
use crate::set;

fn hp_map() -> HashMap<u8, HashMap<u8, f64>> {
    let mut map = HashMap::new();
    map.insert(b'P', HashMap::from([(b'H', 3.0), (b'P', 0.0), (GAP, 4.0)]));
    map.insert(b'H', HashMap::from([(b'H', 0.0), (b'P', 2.0), (GAP, 5.0)]));
    map.insert(GAP, HashMap::from([(b'H', 6.0), (b'P', 7.0), (GAP, 0.0)]));
    map
}

#[test]
fn from_map_sorts_symbols() {
    let costs = CostMatrix::from_map(&hp_map()).unwrap();
    assert_eq!(costs.alphabet().symbols(), b"HP");
    assert_eq!(costs.size(), 3);
    assert_eq!(costs.cost(b'H', b'P'), 2.0);
    assert_eq!(costs.cost(b'P', b'H'), 3.0);
    assert_eq!(costs.cost(b'H', GAP), 5.0);
    assert_eq!(costs.cost(GAP, b'P'), 7.0);
    assert_eq!(costs.cost_idx(0, 2), 5.0);
    assert_eq!(costs.cost(b'A', b'H'), f64::INFINITY);
}

#[test]
fn from_map_without_gap_row() {
    let mut map = hp_map();
    map.remove(&GAP);
    let err = CostMatrix::from_map(&map).unwrap_err();
    assert_matches!(
        err.downcast_ref::<DolloError>(),
        Some(DolloError::IncompleteCostMatrix { symbol: '-', .. })
    );
}

#[test]
fn from_map_missing_entry() {
    let mut map = hp_map();
    map.get_mut(&b'P').unwrap().remove(&b'H');
    let err = CostMatrix::from_map(&map).unwrap_err();
    assert_matches!(
        err.downcast_ref::<DolloError>(),
        Some(DolloError::IncompleteCostMatrix { symbol: 'H', .. })
    );
}

#[test]
fn from_map_column_without_row() {
    let mut map = hp_map();
    map.get_mut(&b'H').unwrap().insert(b'W', 1.0);
    let err = CostMatrix::from_map(&map).unwrap_err();
    assert_matches!(
        err.downcast_ref::<DolloError>(),
        Some(DolloError::IncompleteCostMatrix { symbol: 'W', .. })
    );
}

#[test]
fn wrong_dimensions() {
    assert!(CostMatrix::new(dna_alphabet(), DMatrix::zeros(4, 4)).is_err());
    assert!(CostMatrix::new(dna_alphabet(), DMatrix::zeros(5, 5)).is_ok());
}

#[test]
fn unit_matrix() {
    let alphabet = Alphabet::new(b"XY").unwrap();
    let costs = CostMatrix::unit(&alphabet);
    assert_eq!(costs.cost(b'X', b'X'), 0.0);
    assert_eq!(costs.cost(b'X', b'Y'), 1.0);
    assert_eq!(costs.cost(b'Y', GAP), 1.0);
    assert_eq!(costs.cost(GAP, GAP), 0.0);
}

#[rstest]
#[case::transition(b'A', b'G', 1.0)]
#[case::transition_pyrimidines(b'T', b'C', 1.0)]
#[case::transversion(b'A', b'T', 1.5)]
#[case::transversion_reverse(b'C', b'G', 1.5)]
#[case::identity(b'G', b'G', 0.0)]
#[case::deletion(b'T', b'-', 10.0)]
#[case::insertion(b'-', b'A', 10.0)]
fn nucleotide_default_costs(#[case] from: u8, #[case] to: u8, #[case] cost: f64) {
    let costs = CostMatrix::nucleotide_default();
    assert_eq!(costs.cost(from, to), cost);
    assert_eq!(costs.cost(to, from), cost);
}

#[test]
fn replace_gap_costs() {
    let costs = CostMatrix::nucleotide_default().with_gap_cost(0.0);
    assert_eq!(costs.cost(b'A', GAP), 0.0);
    assert_eq!(costs.cost(GAP, b'T'), 0.0);
    assert_eq!(costs.cost(b'A', b'T'), 1.5);
    assert_eq!(costs.cost(GAP, GAP), 0.0);
}

#[rstest]
#[case::shared_symbol(b"AC".as_slice(), b"CT".as_slice(), 0.0)]
#[case::transition(b"A".as_slice(), b"GT".as_slice(), 1.0)]
#[case::transversion(b"CT".as_slice(), b"G".as_slice(), 1.5)]
#[case::empty(b"".as_slice(), b"A".as_slice(), f64::INFINITY)]
fn cheapest_pair(#[case] x: &[u8], #[case] y: &[u8], #[case] cost: f64) {
    let costs = CostMatrix::nucleotide_default();
    assert_eq!(costs.min_cost(&set!(x), &set!(y)), cost);
}

#[test]
fn cheapest_gap() {
    let mut costs = CostMatrix::nucleotide_default();
    assert_relative_eq!(costs.gap_cost(&set!(b"AC")), 10.0);
    costs = CostMatrix::new(
        dna_alphabet(),
        DMatrix::from_fn(5, 5, |i, j| if j == 4 { (i + 1) as f64 } else { 0.0 }),
    )
    .unwrap();
    assert_relative_eq!(costs.gap_cost(&set!(b"CG")), 2.0);
    assert_relative_eq!(costs.gap_cost(&set!(b"T")), 4.0);
}

#[test]
fn validate_covered_sequences() {
    let seqs = Sequences::new(vec![record!("A", b"AC-T"), record!("B", b"GG--")]);
    assert!(CostMatrix::nucleotide_default()
        .validate_symbols(&seqs)
        .is_ok());
}

#[test]
fn validate_uncovered_symbol() {
    let seqs = Sequences::new(vec![record!("A", b"AC-T"), record!("B", b"GN--")]);
    let err = CostMatrix::nucleotide_default()
        .validate_symbols(&seqs)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<DolloError>(),
        Some(&DolloError::IncompleteCostMatrix {
            symbol: 'N',
            context: "sequence B column 1".to_string()
        })
    );
}

#[test]
fn display_lists_symbols() {
    let costs = CostMatrix::unit(&Alphabet::new(b"X").unwrap());
    assert_eq!(format!("{}", costs), "\tX\t-\nX\t0\t1\n-\t1\t0\n");
}
