use std::fmt::{self, Debug, Display};

use approx::relative_eq;

use crate::tree::NodeIdx::{self, Internal, Leaf};

/// Arena entry of a [`Tree`](crate::tree::Tree). Leaves have no children, internal nodes have
/// two once the tree is validated.
#[derive(Clone)]
pub struct Node {
    pub idx: NodeIdx,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
    pub blen: f64,
    pub id: String,
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)?;
        if !self.id.is_empty() {
            write!(f, " with id {}", self.id)?;
        }
        Ok(())
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [blen {}] parent {:?} children {:?}",
            self, self.blen, self.parent, self.children
        )
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
            && self.parent == other.parent
            && self.children == other.children
            && self.id == other.id
            && relative_eq!(self.blen, other.blen)
    }
}

impl Node {
    pub fn new_leaf(idx: usize, parent: Option<NodeIdx>, blen: f64, id: String) -> Self {
        Self {
            idx: Leaf(idx),
            parent,
            children: Vec::new(),
            blen,
            id,
        }
    }

    pub fn new_internal(
        idx: usize,
        parent: Option<NodeIdx>,
        children: Vec<NodeIdx>,
        blen: f64,
        id: String,
    ) -> Self {
        Self {
            idx: Internal(idx),
            parent,
            children,
            blen,
            id,
        }
    }

    /// Unnamed internal node, linked up by the newick parser.
    pub(crate) fn new_empty_internal(idx: usize) -> Self {
        Self::new_internal(idx, None, Vec::new(), 0.0, String::new())
    }

    /// Node id, or the index for unnamed nodes.
    pub fn label(&self) -> String {
        if self.id.is_empty() {
            self.idx.to_string()
        } else {
            self.id.clone()
        }
    }
}
