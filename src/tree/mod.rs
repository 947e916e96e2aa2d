use std::fmt::{self, Display};

use anyhow::bail;
use fixedbitset::FixedBitSet;
use hashbrown::HashSet;
use log::debug;

use crate::errors::DolloError;
use crate::Result;
use NodeIdx::{Internal as Int, Leaf};

mod tree_node;
pub use tree_node::*;
pub mod tree_parser;

#[derive(Debug, PartialEq, Clone, Copy, PartialOrd, Eq, Ord, Hash)]
pub enum NodeIdx {
    Internal(usize),
    Leaf(usize),
}

impl From<NodeIdx> for usize {
    fn from(node_idx: NodeIdx) -> usize {
        match node_idx {
            Int(idx) => idx,
            Leaf(idx) => idx,
        }
    }
}

impl From<&NodeIdx> for usize {
    fn from(node_idx: &NodeIdx) -> usize {
        usize::from(*node_idx)
    }
}

impl Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Int(idx) => write!(f, "I{}", idx),
            Leaf(idx) => write!(f, "L{}", idx),
        }
    }
}

/// Rooted binary tree stored as an arena of nodes. A node's position in `nodes` equals the
/// index inside its `NodeIdx`.
///
/// The topology is validated on construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Tree {
    pub root: NodeIdx,
    nodes: Vec<Node>,
    postorder: Vec<NodeIdx>,
    preorder: Vec<NodeIdx>,
    /// Number of leaves.
    pub n: usize,
}

impl Tree {
    /// Builds a tree from an arena of nodes, checking that every internal node has exactly two
    /// children, parent links agree with child links, and every node is reachable from the root
    /// exactly once.
    ///
    /// # Example
    /// ```
    /// use dollo::tree::{Node, NodeIdx::{Internal as I, Leaf as L}, Tree};
    /// let nodes = vec![
    ///     Node::new_internal(0, None, vec![L(1), L(2)], 0.0, "root".to_string()),
    ///     Node::new_leaf(1, Some(I(0)), 1.0, "A".to_string()),
    ///     Node::new_leaf(2, Some(I(0)), 1.0, "B".to_string()),
    /// ];
    /// let tree = Tree::with_nodes(I(0), nodes).unwrap();
    /// assert_eq!(tree.postorder(), &[L(1), L(2), I(0)]);
    /// ```
    pub fn with_nodes(root: NodeIdx, nodes: Vec<Node>) -> Result<Tree> {
        let mut tree = Tree {
            root,
            n: nodes.iter().filter(|n| matches!(n.idx, Leaf(_))).count(),
            nodes,
            postorder: Vec::new(),
            preorder: Vec::new(),
        };
        tree.validate()?;
        tree.compute_preorder();
        tree.compute_postorder();
        debug!("Built tree with {} leaves", tree.n);
        Ok(tree)
    }

    fn malformed(&self, idx: &NodeIdx, reason: impl Into<String>) -> DolloError {
        let node = match self.nodes.get(usize::from(idx)) {
            Some(node) => node.label(),
            None => idx.to_string(),
        };
        DolloError::MalformedTree {
            node,
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            bail!(self.malformed(&self.root, "tree has no nodes"));
        }
        for (pos, node) in self.nodes.iter().enumerate() {
            if usize::from(node.idx) != pos {
                bail!(self.malformed(&node.idx, format!("stored at position {pos}")));
            }
            match (node.idx, node.children.len()) {
                (Leaf(_), 0) | (Int(_), 2) => {}
                (_, count) => bail!(self.malformed(
                    &node.idx,
                    format!("has {count} children, expected 0 or 2")
                )),
            }
            for child in &node.children {
                match self.nodes.get(usize::from(child)) {
                    Some(c) if c.idx == *child && c.parent == Some(node.idx) => {}
                    _ => bail!(self.malformed(
                        &node.idx,
                        format!("child {child} does not point back to it")
                    )),
                }
            }
        }
        if self.node_opt(&self.root).is_none_or(|root| root.parent.is_some()) {
            bail!(self.malformed(&self.root, "root is missing or has a parent"));
        }

        let mut visited = FixedBitSet::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if visited.put(usize::from(idx)) {
                bail!(self.malformed(&idx, "reached twice, the topology has a cycle"));
            }
            stack.extend(self.nodes[usize::from(idx)].children.iter().copied());
        }
        if let Some(pos) = visited.zeroes().next() {
            bail!(self.malformed(&self.nodes[pos].idx, "not reachable from the root"));
        }

        let mut ids = HashSet::with_capacity(self.n);
        for leaf in self.leaves() {
            if !leaf.id.is_empty() && !ids.insert(leaf.id.as_str()) {
                bail!(self.malformed(&leaf.idx, "duplicate leaf id"));
            }
        }
        Ok(())
    }

    fn compute_postorder(&mut self) {
        let mut order = Vec::<NodeIdx>::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children(&idx).iter().copied());
        }
        order.reverse();
        self.postorder = order;
    }

    fn compute_preorder(&mut self) {
        self.preorder = self.preorder_subroot(&self.root);
    }

    /// Preorder of the subtree rooted at `subroot`, left child before right child.
    pub fn preorder_subroot(&self, subroot: &NodeIdx) -> Vec<NodeIdx> {
        let mut order = Vec::<NodeIdx>::with_capacity(self.nodes.len());
        let mut stack = vec![*subroot];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for child in self.children(&idx).iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Postorder of the subtree rooted at `subroot`, children before parents.
    pub fn postorder_subroot(&self, subroot: &NodeIdx) -> Vec<NodeIdx> {
        let mut order = Vec::<NodeIdx>::with_capacity(self.nodes.len());
        let mut stack = vec![*subroot];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children(&idx).iter().copied());
        }
        order.reverse();
        order
    }

    pub fn postorder(&self) -> &[NodeIdx] {
        &self.postorder
    }

    pub fn preorder(&self) -> &[NodeIdx] {
        &self.preorder
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: &NodeIdx) -> &Node {
        &self.nodes[usize::from(idx)]
    }

    fn node_opt(&self, idx: &NodeIdx) -> Option<&Node> {
        self.nodes.get(usize::from(idx))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_id(&self, idx: &NodeIdx) -> &str {
        &self.node(idx).id
    }

    /// Leaves in arena order.
    pub fn leaves(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.idx, Leaf(_)))
            .collect()
    }

    pub fn internals(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.idx, Int(_)))
            .collect()
    }

    pub fn is_leaf(&self, idx: &NodeIdx) -> bool {
        matches!(idx, Leaf(_))
    }

    pub fn children(&self, idx: &NodeIdx) -> &[NodeIdx] {
        &self.node(idx).children
    }

    pub fn parent(&self, idx: &NodeIdx) -> Option<&NodeIdx> {
        self.node(idx).parent.as_ref()
    }

    pub fn idx(&self, id: &str) -> Result<NodeIdx> {
        match self.nodes.iter().find(|node| node.id == id) {
            Some(node) => Ok(node.idx),
            None => bail!("No node with id {} found in the tree", id),
        }
    }

    /// True if `node` is `subroot` or one of its descendants.
    pub fn is_in_subtree(&self, subroot: &NodeIdx, node: &NodeIdx) -> bool {
        let mut cur = Some(node);
        while let Some(idx) = cur {
            if idx == subroot {
                return true;
            }
            cur = self.parent(idx);
        }
        false
    }

    /// Minimal common ancestor of a set of nodes; a single node is its own ancestor.
    /// Walks each node up to the first node on the path from the first node to the root, so
    /// the cost is proportional to the number of nodes times the tree height.
    ///
    /// # Example
    /// ```
    /// use dollo::tree::tree_parser::from_newick;
    /// let tree = from_newick("((A,B)E,(C,D)F)G;").unwrap().pop().unwrap();
    /// let a = tree.idx("A").unwrap();
    /// let b = tree.idx("B").unwrap();
    /// let c = tree.idx("C").unwrap();
    /// assert_eq!(tree.mrca(&[a, b]), Some(tree.idx("E").unwrap()));
    /// assert_eq!(tree.mrca(&[a, c]), Some(tree.root));
    /// assert_eq!(tree.mrca(&[c]), Some(c));
    /// assert_eq!(tree.mrca(&[]), None);
    /// ```
    pub fn mrca(&self, nodes: &[NodeIdx]) -> Option<NodeIdx> {
        let (first, rest) = nodes.split_first()?;
        let path = self.path_to_root(first);
        let mut on_path = vec![None; self.nodes.len()];
        for (pos, idx) in path.iter().enumerate() {
            on_path[usize::from(idx)] = Some(pos);
        }
        let mut highest = 0;
        for node in rest {
            let mut cur = Some(node);
            while let Some(idx) = cur {
                if let Some(pos) = on_path[usize::from(idx)] {
                    highest = highest.max(pos);
                    break;
                }
                cur = self.parent(idx);
            }
        }
        Some(path[highest])
    }

    fn path_to_root(&self, idx: &NodeIdx) -> Vec<NodeIdx> {
        let mut path = vec![*idx];
        let mut cur = idx;
        while let Some(parent) = self.parent(cur) {
            path.push(*parent);
            cur = parent;
        }
        path
    }

    /// Leaves of the subtree rooted at `subroot`, left to right.
    pub fn subtree_leaves(&self, subroot: &NodeIdx) -> Vec<NodeIdx> {
        self.preorder_subroot(subroot)
            .into_iter()
            .filter(|idx| self.is_leaf(idx))
            .collect()
    }

    pub fn to_newick(&self) -> String {
        format!("{};", self.subtree_to_newick(&self.root))
    }

    fn subtree_to_newick(&self, idx: &NodeIdx) -> String {
        let node = self.node(idx);
        match idx {
            Leaf(_) => format!("{}:{}", node.id, node.blen),
            Int(_) => format!(
                "({},{}){}:{}",
                self.subtree_to_newick(&node.children[0]),
                self.subtree_to_newick(&node.children[1]),
                node.id,
                node.blen
            ),
        }
    }
}
