//! Normalized object graph model.
//!
//! The reader flattens every payload into this closed shape: an ordered
//! object array plus a root index. Reference markers, however they were
//! encoded, are already normalized to [`Node::Reference`] by the time a
//! graph exists; nothing downstream branches on marker representation.

use std::collections::BTreeMap;

/// Reference chains longer than this are treated as unresolved (cycles).
const MAX_REFERENCE_HOPS: usize = 16;

/// A leaf value in the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string value.
    Text(String),
    /// A numeric value (integers are widened).
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// A node kind the extractor never interprets (null, dates, raw data,
    /// nested collections). Resolves to nothing.
    Null,
}

/// A single node in the object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A scalar leaf.
    Scalar(Scalar),
    /// A keyed collection; values are indices into the object array.
    Dict(BTreeMap<String, usize>),
    /// A reference to another node by index.
    Reference(usize),
}

/// A decoded, reference-normalized object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGraph {
    /// All nodes, in archive order.
    pub objects: Vec<Node>,
    /// Index of the root node.
    pub root: usize,
}

impl ObjectGraph {
    /// Look up a node by index. Out-of-bounds indices yield `None`.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.objects.get(index)
    }

    /// Look up a node, following reference indirection.
    ///
    /// Out-of-bounds references and over-long (cyclic) chains yield `None`;
    /// a well-formed result is never itself a `Reference`.
    pub fn resolve(&self, index: usize) -> Option<&Node> {
        let mut current = index;
        for _ in 0..MAX_REFERENCE_HOPS {
            match self.objects.get(current)? {
                Node::Reference(next) => current = *next,
                node => return Some(node),
            }
        }
        None
    }

    /// Resolve a node to its string value, if it has one.
    pub fn resolve_text(&self, index: usize) -> Option<&str> {
        match self.resolve(index)? {
            Node::Scalar(Scalar::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// All string values stored anywhere in the graph, in archive order.
    ///
    /// This is the candidate pool for image scoring: the archive stores
    /// every object exactly once, so scanning the flat array covers strings
    /// reachable through any structure.
    pub fn text_pool(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().filter_map(|node| match node {
            Node::Scalar(Scalar::Text(s)) => Some(s.as_str()),
            _ => None,
        })
    }

    /// All dict nodes with their indices, in archive order.
    pub fn dicts(&self) -> impl Iterator<Item = (usize, &BTreeMap<String, usize>)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                Node::Dict(map) => Some((i, map)),
                _ => None,
            })
    }
}
