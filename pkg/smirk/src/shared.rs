use std::{ops::Deref, ops::Range, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard};

use crate::{Element, MerkleWitness, Result, Tree};

/// A [`Tree`] shared between a single writer and many readers
///
/// Appends take the write lock, so they are serialized. Everything else takes the read lock,
/// which means a witness is always produced against the root the tree had while it was taken.
///
/// Cloning a [`SharedTree`] gives another handle to the same tree. Separate calls to
/// [`SharedTree::new`] share nothing.
///
/// ```rust
/// # use smirk::*;
/// let tree = SharedTree::<32>::new();
/// let handle = tree.clone();
///
/// let index = handle.append(Element::new(1)).unwrap();
///
/// let witness = tree.witness_for(index).unwrap();
/// assert!(witness.verify(Element::new(1), tree.root()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedTree<const DEPTH: usize> {
    inner: Arc<RwLock<Tree<DEPTH>>>,
}

/// A handle to a [`SharedTree`] that can read but never append
///
/// Hand this out when a single owner must stay in control of appends:
///
/// ```rust
/// # use smirk::*;
/// let tree = SharedTree::<32>::new();
/// let reader = tree.reader();
///
/// tree.append(Element::new(3)).unwrap();
///
/// assert_eq!(reader.len(), 1);
/// assert_eq!(reader.root(), tree.root());
/// assert_eq!(reader.index_of(Element::new(3)), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct TreeReader<const DEPTH: usize> {
    inner: Arc<RwLock<Tree<DEPTH>>>,
}

/// A read-locked view of a [`SharedTree`]
///
/// Appends block until this is dropped, so keep it short-lived
#[derive(Debug)]
pub struct Snapshot<'a, const DEPTH: usize> {
    guard: RwLockReadGuard<'a, Tree<DEPTH>>,
}

impl<const DEPTH: usize> Deref for Snapshot<'_, DEPTH> {
    type Target = Tree<DEPTH>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<const DEPTH: usize> From<Tree<DEPTH>> for SharedTree<DEPTH> {
    fn from(tree: Tree<DEPTH>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }
}

impl<const DEPTH: usize> SharedTree<DEPTH> {
    /// Create a new, empty shared tree
    #[must_use]
    pub fn new() -> Self {
        Self::from(Tree::new())
    }

    /// See [`Tree::append`]
    pub fn append(&self, leaf: Element) -> Result<u64> {
        self.inner.write().append(leaf)
    }

    /// See [`Tree::extend`]
    pub fn extend(&self, leaves: impl IntoIterator<Item = Element>) -> Result<Range<u64>> {
        self.inner.write().extend(leaves)
    }

    /// The current root hash
    #[must_use]
    pub fn root(&self) -> Element {
        self.inner.read().root()
    }

    /// The current number of leaves
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.read().len()
    }

    /// Whether no leaf has been appended yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`Tree::witness_for`]
    ///
    /// The returned witness carries the root it was taken against in [`MerkleWitness::root`]
    pub fn witness_for(&self, index: u64) -> Result<MerkleWitness<DEPTH>> {
        self.inner.read().witness_for(index)
    }

    /// Take a consistent read-only view of the tree
    ///
    /// ```rust
    /// # use smirk::*;
    /// let tree = SharedTree::<32>::new();
    /// tree.append(Element::new(5)).unwrap();
    ///
    /// let snapshot = tree.snapshot();
    /// let index = snapshot.index_of(Element::new(5)).unwrap();
    /// let witness = snapshot.witness_for(index).unwrap();
    /// assert_eq!(witness.root, snapshot.root());
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_, DEPTH> {
        Snapshot {
            guard: self.inner.read(),
        }
    }

    /// Clone the current state of the tree
    #[must_use]
    pub fn to_tree(&self) -> Tree<DEPTH> {
        self.inner.read().clone()
    }

    /// A read-only handle to the same tree
    #[must_use]
    pub fn reader(&self) -> TreeReader<DEPTH> {
        TreeReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<const DEPTH: usize> TreeReader<DEPTH> {
    /// The current root hash
    #[must_use]
    pub fn root(&self) -> Element {
        self.inner.read().root()
    }

    /// The current number of leaves
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.read().len()
    }

    /// Whether no leaf has been appended yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`Tree::index_of`]
    #[must_use]
    pub fn index_of(&self, leaf: Element) -> Option<u64> {
        self.inner.read().index_of(leaf)
    }

    /// See [`SharedTree::witness_for`]
    pub fn witness_for(&self, index: u64) -> Result<MerkleWitness<DEPTH>> {
        self.inner.read().witness_for(index)
    }

    /// See [`SharedTree::snapshot`]
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_, DEPTH> {
        Snapshot {
            guard: self.inner.read(),
        }
    }
}
