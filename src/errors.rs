use std::error::Error;
use std::fmt;

/// Failures of a scoring or alignment run.
///
/// Raised through `anyhow::bail!`, so callers recover the kind with
/// `err.downcast_ref::<DolloError>()`.
#[derive(Debug, Clone, PartialEq)]
pub enum DolloError {
    /// A node has a number of children other than 0 or 2, the topology has a cycle, or a leaf
    /// cannot be matched to a sequence.
    MalformedTree { node: String, reason: String },
    /// Fixed-alignment scoring received leaves of differing lengths.
    SequenceLengthMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
    /// A column has no leaf carrying a residue. Scorers treat it as a no-op column.
    EmptyLeafSet { column: usize },
    /// A symbol used by the sequences (or the gap) has no row in the cost matrix.
    IncompleteCostMatrix { symbol: char, context: String },
    /// Character sets only cover 7-bit ASCII symbols.
    UnsupportedSymbol { symbol: u8 },
}

impl fmt::Display for DolloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DolloError::MalformedTree { node, reason } => {
                write!(f, "Malformed tree at node {node}: {reason}")
            }
            DolloError::SequenceLengthMismatch {
                id,
                expected,
                found,
            } => write!(
                f,
                "Sequence {id} has length {found}, expected aligned length {expected}"
            ),
            DolloError::EmptyLeafSet { column } => {
                write!(f, "No leaf carries a residue in column {column}")
            }
            DolloError::IncompleteCostMatrix { symbol, context } => {
                write!(f, "Cost matrix has no entry for symbol '{symbol}' ({context})")
            }
            DolloError::UnsupportedSymbol { symbol } => {
                write!(f, "Unsupported non-ASCII symbol 0x{symbol:02x}")
            }
        }
    }
}

impl Error for DolloError {}
