use std::fmt;

use anyhow::bail;
use log::{info, warn};
use pest::{error::Error as PestError, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::tree::{
    Node,
    NodeIdx::{self, Internal as Int, Leaf},
    Tree,
};
use crate::Result;

#[derive(Parser)]
#[grammar = "./tree/newick.pest"]
pub struct NewickParser;

#[derive(Debug)]
pub struct ParsingError(pub(crate) Box<PestError<Rule>>);

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Malformed newick string")?;
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParsingError {}

/// Nodes collected while walking the parse tree, in preorder.
#[derive(Default)]
struct NodeArena {
    nodes: Vec<Node>,
}

/// Parses one or more `;`-terminated newick trees.
///
/// Unrooted trees (a trifurcation at the top level) are rooted at the trifurcation with zero
/// length branches. Polytomies and unary nodes are rejected as malformed trees.
///
/// # Example
/// ```
/// use dollo::tree::tree_parser::from_newick;
/// let trees = from_newick("((A:1.0,B:2.0)E:1.0,C:1.0)R;(X,(Y,Z));").unwrap();
/// assert_eq!(trees.len(), 2);
/// assert_eq!(trees[0].leaves().len(), 3);
/// assert!(from_newick("(A,(B),C,D);").is_err());
/// ```
pub fn from_newick(newick_string: &str) -> Result<Vec<Tree>> {
    info!("Parsing newick trees.");
    let newick_rule = match NewickParser::parse(Rule::newick, newick_string) {
        Ok(mut pairs) => pairs.next(),
        Err(e) => bail!(ParsingError(Box::new(e))),
    };
    let mut trees = Vec::new();
    for tree_rule in newick_rule.into_iter().flat_map(|rule| rule.into_inner()) {
        if let Some(rule) = tree_rule.into_inner().next() {
            let mut arena = NodeArena::default();
            let root = match rule.as_rule() {
                Rule::rooted => arena.parse_rooted_rule(rule),
                Rule::unrooted => arena.parse_unrooted_rule(rule),
                _ => unreachable!(),
            };
            trees.push(Tree::with_nodes(root, arena.nodes)?);
        }
    }
    info!("Finished parsing {} newick trees successfully.", trees.len());
    Ok(trees)
}

impl NodeArena {
    fn parse_rooted_rule(&mut self, rooted_rule: Pair<Rule>) -> NodeIdx {
        rooted_rule
            .into_inner()
            .next()
            .map_or(Int(0), |rule| self.parse_subtree_rule(rule))
    }

    fn parse_unrooted_rule(&mut self, unrooted_rule: Pair<Rule>) -> NodeIdx {
        warn!("Found unrooted tree, will root at the trifurcation.");
        let mut children: Vec<NodeIdx> = Vec::new();
        for rule in unrooted_rule.into_inner() {
            match rule.as_rule() {
                Rule::leaf | Rule::internal => children.push(self.parse_subtree_rule(rule)),
                _ => {}
            }
        }

        let inner_idx = self.nodes.len();
        self.nodes.push(Node::new_empty_internal(inner_idx));
        self.adopt(inner_idx, children[0..2].to_vec());

        let root_idx = self.nodes.len();
        self.nodes.push(Node::new_empty_internal(root_idx));
        self.adopt(root_idx, vec![Int(inner_idx), children[2]]);
        Int(root_idx)
    }

    fn adopt(&mut self, parent_idx: usize, children: Vec<NodeIdx>) {
        for child in &children {
            self.nodes[usize::from(child)].parent = Some(Int(parent_idx));
        }
        self.nodes[parent_idx].children = children;
    }

    fn parse_subtree_rule(&mut self, rule: Pair<Rule>) -> NodeIdx {
        match rule.as_rule() {
            Rule::internal => self.parse_internal_rule(rule),
            _ => self.parse_leaf_rule(rule),
        }
    }

    fn parse_internal_rule(&mut self, internal_rule: Pair<Rule>) -> NodeIdx {
        let idx = self.nodes.len();
        self.nodes.push(Node::new_empty_internal(idx));
        let mut children: Vec<NodeIdx> = Vec::new();
        for rule in internal_rule.into_inner() {
            match rule.as_rule() {
                Rule::label => self.nodes[idx].id = parse_label_rule(rule),
                Rule::branch_length => self.nodes[idx].blen = parse_branch_length_rule(rule),
                Rule::internal | Rule::leaf => children.push(self.parse_subtree_rule(rule)),
                _ => unreachable!(),
            }
        }
        self.adopt(idx, children);
        Int(idx)
    }

    fn parse_leaf_rule(&mut self, leaf_rule: Pair<Rule>) -> NodeIdx {
        let mut id = String::from("");
        let mut blen = 0.0;
        for rule in leaf_rule.into_inner() {
            match rule.as_rule() {
                Rule::label => id = parse_label_rule(rule),
                Rule::branch_length => blen = parse_branch_length_rule(rule),
                _ => unreachable!(),
            }
        }
        let idx = self.nodes.len();
        self.nodes.push(Node::new_leaf(idx, None, blen, id));
        Leaf(idx)
    }
}

fn parse_branch_length_rule(rule: Pair<Rule>) -> f64 {
    rule.into_inner()
        .next()
        .and_then(|float| float.as_str().trim().parse::<f64>().ok())
        .unwrap_or_default()
}

fn parse_label_rule(rule: Pair<Rule>) -> String {
    rule.as_str().to_string()
}
