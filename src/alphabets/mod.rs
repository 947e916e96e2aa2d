use anyhow::bail;
use lazy_static::lazy_static;

use crate::errors::DolloError;
use crate::sequences::Sequences;
use crate::Result;

mod parsimony_set;
pub use parsimony_set::*;

pub static NUCLEOTIDES: &[u8] = b"ACGT";
pub static GAP: u8 = b'-';
pub static POSSIBLE_GAPS: &[u8] = b"-._~";

const ASCII: usize = 128;

/// Ordered residue symbols plus the gap, which always takes the last index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    index: [Option<usize>; ASCII],
}

lazy_static! {
    static ref DNA_ALPHABET: Alphabet = Alphabet::build(NUCLEOTIDES);
}

pub fn dna_alphabet() -> Alphabet {
    DNA_ALPHABET.clone()
}

impl Alphabet {
    /// Creates an alphabet from distinct ASCII residue symbols. The gap symbol is added
    /// implicitly and must not be listed.
    ///
    /// # Example
    /// ```
    /// use dollo::alphabets::Alphabet;
    /// let alphabet = Alphabet::new(b"HPX").unwrap();
    /// assert_eq!(alphabet.size(), 4);
    /// assert_eq!(alphabet.index(b'-'), Some(3));
    /// assert!(Alphabet::new(b"AA").is_err());
    /// ```
    pub fn new(symbols: &[u8]) -> Result<Alphabet> {
        for (i, &symbol) in symbols.iter().enumerate() {
            if !symbol.is_ascii() {
                bail!(DolloError::UnsupportedSymbol { symbol });
            }
            if symbol == GAP {
                bail!("The gap symbol is part of every alphabet and must not be listed");
            }
            if symbols[..i].contains(&symbol) {
                bail!("Alphabet symbol '{}' is listed twice", symbol as char);
            }
        }
        Ok(Alphabet::build(symbols))
    }

    fn build(symbols: &[u8]) -> Alphabet {
        let mut index = [None; ASCII];
        for (i, &symbol) in symbols.iter().enumerate() {
            index[symbol as usize] = Some(i);
        }
        index[GAP as usize] = Some(symbols.len());
        Alphabet {
            symbols: symbols.to_vec(),
            index,
        }
    }

    /// Infers the alphabet of a set of sequences: DNA if every residue is a nucleotide,
    /// otherwise the sorted distinct residues.
    pub fn from_sequences(seqs: &Sequences) -> Result<Alphabet> {
        if seqs.iter().all(|rec| DNA_ALPHABET.is_word(rec.seq())) {
            return Ok(dna_alphabet());
        }
        let mut symbols: Vec<u8> = seqs
            .iter()
            .flat_map(|rec| rec.seq().iter().copied())
            .filter(|&c| c != GAP)
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        Alphabet::new(&symbols)
    }

    /// Residue symbols, without the gap.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Residue symbols followed by the gap.
    pub fn all_symbols(&self) -> Vec<u8> {
        let mut symbols = self.symbols.clone();
        symbols.push(GAP);
        symbols
    }

    /// Number of symbols including the gap.
    pub fn size(&self) -> usize {
        self.symbols.len() + 1
    }

    pub fn gap_index(&self) -> usize {
        self.symbols.len()
    }

    pub fn index(&self, symbol: u8) -> Option<usize> {
        self.index.get(symbol as usize).copied().flatten()
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.index(symbol).is_some()
    }

    pub fn is_word(&self, word: &[u8]) -> bool {
        word.iter().all(|&c| self.contains(c))
    }

    /// First member of the set in alphabet order, falling back to byte order for symbols
    /// outside the alphabet.
    pub fn representative(&self, set: &ParsimonySet) -> Option<u8> {
        self.symbols
            .iter()
            .copied()
            .find(|&c| set.contains(c))
            .or_else(|| (*set - ParsimonySet::gap()).iter().next())
    }
}
