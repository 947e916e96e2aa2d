use std::fmt::{self, Debug, Display};
use std::ops::{BitAnd, BitOr, Sub};

use itertools::join;

use crate::alphabets::GAP;

/// Character-possibility set over 7-bit ASCII symbols, stored as a bitmask indexed by the
/// symbol's byte value.
#[repr(transparent)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct ParsimonySet(u128);

impl ParsimonySet {
    pub const fn empty() -> Self {
        ParsimonySet(0)
    }

    pub fn gap() -> Self {
        ParsimonySet::single(GAP)
    }

    /// Symbols outside ASCII are ignored; alphabets reject them before sets are built.
    pub fn single(symbol: u8) -> Self {
        debug_assert!(symbol.is_ascii());
        ParsimonySet(1u128.checked_shl(symbol as u32).unwrap_or(0))
    }

    pub fn from_slice(symbols: &[u8]) -> Self {
        symbols.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(&self, symbol: u8) -> bool {
        !(*self & ParsimonySet::single(symbol)).is_empty()
    }

    pub fn insert(&mut self, symbol: u8) {
        *self = *self | ParsimonySet::single(symbol);
    }

    /// True only for the set holding exactly the gap symbol.
    pub fn is_gap(&self) -> bool {
        *self == ParsimonySet::gap()
    }

    pub fn is_disjoint(&self, other: &ParsimonySet) -> bool {
        (*self & *other).is_empty()
    }

    /// Iterates the symbols in increasing byte order.
    pub fn iter(&self) -> SetIter {
        SetIter { bits: self.0 }
    }
}

pub struct SetIter {
    bits: u128,
}

impl Iterator for SetIter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.bits == 0 {
            return None;
        }
        let symbol = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1;
        Some(symbol)
    }
}

impl FromIterator<u8> for ParsimonySet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ParsimonySet::empty();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}

impl IntoIterator for ParsimonySet {
    type Item = u8;
    type IntoIter = SetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for ParsimonySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(self.iter().map(|c| c as char), " "))
    }
}

impl Debug for ParsimonySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl BitAnd for ParsimonySet {
    type Output = ParsimonySet;

    fn bitand(self, rhs: Self) -> Self::Output {
        ParsimonySet(self.0 & rhs.0)
    }
}

impl BitOr for ParsimonySet {
    type Output = ParsimonySet;

    fn bitor(self, rhs: Self) -> Self::Output {
        ParsimonySet(self.0 | rhs.0)
    }
}

impl Sub for ParsimonySet {
    type Output = ParsimonySet;

    fn sub(self, rhs: Self) -> Self::Output {
        ParsimonySet(self.0 & !rhs.0)
    }
}
