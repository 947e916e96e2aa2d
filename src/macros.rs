#[macro_export]
macro_rules! record_wo_desc {
    ($e1:expr,$e2:expr) => {{
        use bio::io::fasta::Record;
        Record::with_attrs($e1, None, $e2)
    }};
}

#[macro_export]
macro_rules! tree {
    ($e:expr) => {{
        use $crate::tree::tree_parser::from_newick;
        from_newick($e).unwrap().pop().unwrap()
    }};
}

#[macro_export]
macro_rules! align {
    ($e:expr) => {{
        use $crate::alphabets::GAP;
        let mut i = 0;
        $e.iter()
            .map(|&byte| {
                if byte == GAP {
                    None
                } else {
                    i += 1;
                    Some(i - 1)
                }
            })
            .collect::<Vec<_>>()
    }};
}

#[macro_export]
macro_rules! set {
    ($s:expr) => {{
        use $crate::alphabets::ParsimonySet;
        ParsimonySet::from_slice($s)
    }};
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
pub mod tests {
    use crate::alphabets::{ParsimonySet, GAP};

    #[test]
    fn test_record_wo_desc_macro() {
        let id = "test_seq";
        let record = record_wo_desc!(id, b"AAAA");
        assert_eq!(record.id(), id);
        assert_eq!(record.seq(), b"AAAA");
        assert_eq!(record.desc(), None);
    }

    #[test]
    fn test_tree_macro() {
        let tree = tree!("(A,B);");
        assert_eq!(tree.leaves().len(), 2);

        let tree = tree!("((A,B),(C,D));");
        assert_eq!(tree.leaves().len(), 4);
        assert_eq!(tree.len(), 7);

        let newick_str = "(seq1:0.1,seq2:0.2);";
        let tree = tree!(newick_str);
        assert_eq!(tree.leaves().len(), 2);
    }

    #[test]
    fn test_align_macro() {
        assert_eq!(align!(b"01-2"), vec![Some(0), Some(1), None, Some(2)]);
        assert_eq!(align!(b"---"), vec![None, None, None]);
        let input = [0u8, GAP, 1];
        assert_eq!(align!(input), vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn test_set_macro() {
        let set = set!(b"CA");
        assert_eq!(set, ParsimonySet::from_iter([b'A', b'C']));
        assert_eq!(set!(b"-"), ParsimonySet::gap());
        assert!(set!(b"").is_empty());
    }
}
