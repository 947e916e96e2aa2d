use anyhow::Error;

pub mod alignment;
pub mod alphabets;
pub mod cost_matrix;
pub mod errors;
pub mod io;
pub mod macros;
pub mod parsimony;
pub mod sequences;
pub mod tree;

pub use alignment::{build_alignment, DolloAlignment};
pub use errors::DolloError;
pub use parsimony::score_fixed_alignment;

pub type Result<T> = std::result::Result<T, Error>;

pub fn assert_float_relative_slice_eq(actual: &[f64], expected: &[f64], epsilon: f64) {
    use approx::relative_eq;
    assert_eq!(
        actual.len(),
        expected.len(),
        "Must have the same number of entries."
    );
    for (i, (&act, &exp)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            relative_eq!(act, exp, epsilon = epsilon),
            "Entries at position {} do not match, actual: {}, expected: {}",
            i,
            act,
            exp,
        );
    }
}
