use std::collections::HashMap;

use crate::{empty_tree_hash, Element};

mod append;
mod error;
mod witness;

pub use error::{Error, Result};
pub use witness::{verify, MerkleWitness};

#[cfg(any(test, feature = "proptest"))]
mod arbitrary_impls;

/// An append-only sparse Merkle tree of fixed depth
///
/// Leaves are appended left to right, and the index of a leaf never changes. A tree of depth
/// `DEPTH` can hold `2^DEPTH` leaves:
///
/// ```rust
/// # use smirk::*;
/// let mut tree = Tree::<2>::new();
///
/// tree.extend([1, 2, 3, 4].map(Element::new)).unwrap();
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.leaf(2), Some(Element::new(3)));
/// assert_eq!(tree.index_of(Element::new(4)), Some(3));
///
/// let error = tree.append(Element::new(5)).unwrap_err();
/// assert_eq!(error, Error::CapacityExceeded { capacity: 4 });
/// ```
///
/// `DEPTH` must be between 1 and 63 (inclusive), which is checked at compile time.
#[derive(Debug, Clone)]
pub struct Tree<const DEPTH: usize> {
    leaves: Vec<Element>,
    /// Non-empty internal nodes, keyed by `(level, index)` with level 1 directly above the leaves
    nodes: HashMap<(usize, u64), Element>,
    /// The first position of each leaf
    positions: HashMap<Element, u64>,
    root: Element,
}

impl<const DEPTH: usize> PartialEq for Tree<DEPTH> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.leaves == other.leaves
    }
}

impl<const DEPTH: usize> Eq for Tree<DEPTH> {}

impl<const DEPTH: usize> Default for Tree<DEPTH> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> Tree<DEPTH> {
    /// Creates a new, empty tree
    ///
    /// ```rust
    /// # use smirk::*;
    /// let tree = Tree::<32>::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.root(), empty_tree_hash(32));
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        const { assert!(DEPTH >= 1 && DEPTH <= 63, "tree depth must be in 1..=63") };

        Self {
            leaves: Vec::new(),
            nodes: HashMap::new(),
            positions: HashMap::new(),
            root: empty_tree_hash(DEPTH),
        }
    }

    /// Creates a tree by appending every leaf of `leaves` in order
    ///
    /// ```rust
    /// # use smirk::*;
    /// let tree = Tree::<8>::from_leaves([1, 2, 3].map(Element::new)).unwrap();
    ///
    /// let mut other = Tree::<8>::new();
    /// other.append(Element::new(1)).unwrap();
    /// other.append(Element::new(2)).unwrap();
    /// other.append(Element::new(3)).unwrap();
    ///
    /// assert_eq!(tree.root(), other.root());
    /// ```
    pub fn from_leaves(leaves: impl IntoIterator<Item = Element>) -> Result<Self> {
        let mut tree = Self::new();
        tree.extend(leaves)?;
        Ok(tree)
    }

    /// The number of leaf slots in this tree, `2^DEPTH`
    #[inline]
    #[must_use]
    pub const fn capacity() -> u64 {
        1 << DEPTH
    }

    /// The root hash of the tree
    ///
    /// The root is cached, so this is a cheap operation
    #[inline]
    #[must_use]
    pub fn root(&self) -> Element {
        self.root
    }

    /// The number of leaves that have been appended
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// Whether no leaf has been appended yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The leaf at `index`, if one has been appended there
    #[inline]
    #[must_use]
    pub fn leaf(&self, index: u64) -> Option<Element> {
        let index = usize::try_from(index).ok()?;
        self.leaves.get(index).copied()
    }

    /// The first index at which `leaf` was appended
    #[inline]
    #[must_use]
    pub fn index_of(&self, leaf: Element) -> Option<u64> {
        self.positions.get(&leaf).copied()
    }

    /// An iterator over the leaves, in the order they were appended
    #[inline]
    pub fn leaves(&self) -> impl Iterator<Item = Element> + '_ {
        self.leaves.iter().copied()
    }

    /// The hash of the node at `(level, index)`, where level 0 is the leaves and level `DEPTH`
    /// is the root
    fn node(&self, level: usize, index: u64) -> Element {
        if level == 0 {
            return self.leaf(index).unwrap_or(Element::NULL_HASH);
        }

        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or_else(|| empty_tree_hash(level))
    }
}
