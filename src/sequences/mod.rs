use anyhow::bail;
use bio::io::fasta::Record;
use hashbrown::HashMap;
use log::warn;

use crate::alphabets::GAP;
use crate::errors::DolloError;
use crate::tree::{NodeIdx, Tree};
use crate::Result;

/// Collection of FASTA records. Records of equal length are treated as aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequences {
    s: Vec<Record>,
    aligned: bool,
    msa_len: usize,
}

impl Sequences {
    pub fn new(s: Vec<Record>) -> Sequences {
        let len = s.first().map_or(0, |rec| rec.seq().len());
        let aligned = s.iter().all(|rec| rec.seq().len() == len);
        Sequences {
            s,
            aligned,
            msa_len: if aligned { len } else { 0 },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.s.iter()
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Record {
        &self.s[idx]
    }

    pub fn record_by_id(&self, id: &str) -> Option<&Record> {
        self.s.iter().find(|rec| rec.id() == id)
    }

    /// Alignment length, 0 if the records differ in length.
    pub fn msa_len(&self) -> usize {
        self.msa_len
    }

    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    pub fn into_records(self) -> Vec<Record> {
        self.s
    }

    pub fn without_gaps(&self) -> Sequences {
        let seqs = self
            .s
            .iter()
            .map(|rec| {
                let sequence = rec
                    .seq()
                    .iter()
                    .filter(|&c| c != &GAP)
                    .copied()
                    .collect::<Vec<u8>>();
                Record::with_attrs(rec.id(), rec.desc(), &sequence)
            })
            .collect();
        Sequences::new(seqs)
    }

    /// Matches every tree leaf to the record with the same id, in `tree.leaves()` order.
    /// Records that match no leaf are ignored with a warning.
    ///
    /// # Example
    /// ```
    /// use dollo::{record_wo_desc as record, tree};
    /// use dollo::sequences::Sequences;
    /// let tree = tree!("((A,B),C);");
    /// let seqs = Sequences::new(vec![
    ///     record!("C", b"T"),
    ///     record!("A", b"A"),
    ///     record!("B", b"G"),
    /// ]);
    /// let rows = seqs.leaf_rows(&tree).unwrap();
    /// assert_eq!(rows[0].1, b"A");
    /// assert_eq!(rows[2].1, b"T");
    /// ```
    pub fn leaf_rows(&self, tree: &Tree) -> Result<Vec<(NodeIdx, &[u8])>> {
        let mut by_id: HashMap<&str, &Record> = HashMap::with_capacity(self.s.len());
        for rec in &self.s {
            if by_id.insert(rec.id(), rec).is_some() {
                warn!("Sequence id {} appears more than once, using the last record.", rec.id());
            }
        }
        let mut rows = Vec::with_capacity(tree.n);
        for leaf in tree.leaves() {
            match by_id.remove(leaf.id.as_str()) {
                Some(rec) => rows.push((leaf.idx, rec.seq())),
                None => bail!(DolloError::MalformedTree {
                    node: leaf.label(),
                    reason: "leaf has no sequence".to_string(),
                }),
            }
        }
        for id in by_id.keys() {
            warn!("Sequence {} does not match any leaf of the tree.", id);
        }
        Ok(rows)
    }
}
