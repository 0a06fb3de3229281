use crate::{compute_merkle_root, Element};

use super::{Error, Result, Tree};

/// A Merkle authentication path from a leaf to the root of a [`Tree`]
///
/// `path_elements[i]` is the sibling at level `i` (0 is the level of the leaves), and
/// `path_directions[i]` is bit `i` of the leaf index: `false` when the running hash is the left
/// child at that level.
///
/// ```rust
/// # use smirk::*;
/// let mut tree = Tree::<16>::new();
/// let index = tree.append(Element::new(7)).unwrap();
/// let witness = tree.witness_for(index).unwrap();
///
/// // more appends change the root, so the witness needs to be taken again
/// tree.append(Element::new(8)).unwrap();
/// assert!(!witness.verify(Element::new(7), tree.root()));
///
/// let witness = tree.witness_for(index).unwrap();
/// assert!(witness.verify(Element::new(7), tree.root()));
/// assert!(!witness.verify(Element::new(8), tree.root()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleWitness<const DEPTH: usize> {
    /// The leaf this witness was taken for
    pub leaf: Element,
    /// The root of the tree at the time the witness was taken
    pub root: Element,
    /// The sibling hashes, deepest first
    pub path_elements: [Element; DEPTH],
    /// The direction bits, deepest first
    pub path_directions: [bool; DEPTH],
}

impl<const DEPTH: usize> MerkleWitness<DEPTH> {
    /// Fold `leaf` up this path and return the resulting root
    #[must_use]
    pub fn compute_root(&self, leaf: Element) -> Element {
        compute_merkle_root(leaf, self.siblings())
    }

    /// Whether `leaf` folds up this path to `claimed_root`
    #[inline]
    #[must_use]
    pub fn verify(&self, leaf: Element, claimed_root: Element) -> bool {
        self.compute_root(leaf) == claimed_root
    }

    /// The `(sibling, direction)` pairs of this path, deepest first
    pub fn siblings(&self) -> impl Iterator<Item = (Element, bool)> + '_ {
        self.path_elements
            .iter()
            .copied()
            .zip(self.path_directions.iter().copied())
    }

    /// The index of the leaf, reconstructed from the direction bits
    #[must_use]
    pub fn leaf_index(&self) -> u64 {
        self.path_directions
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .fold(0, |index, (level, _)| index | (1u64 << level))
    }
}

/// Whether `leaf` folds up `witness` to `claimed_root`
///
/// This is the check the spend circuit performs on its private inputs:
/// ```rust
/// # use smirk::*;
/// let tree = Tree::<8>::from_leaves([1, 2, 3].map(Element::new)).unwrap();
/// let witness = tree.witness_for(1).unwrap();
///
/// assert!(verify(Element::new(2), &witness, tree.root()));
/// assert!(!verify(Element::new(2), &witness, Element::new(1234)));
/// ```
#[must_use]
pub fn verify<const DEPTH: usize>(
    leaf: Element,
    witness: &MerkleWitness<DEPTH>,
    claimed_root: Element,
) -> bool {
    witness.verify(leaf, claimed_root)
}

impl<const DEPTH: usize> Tree<DEPTH> {
    /// Produce the authentication path for the leaf at `index`
    ///
    /// Returns [`Error::LeafNotFound`] if nothing has been appended at `index`
    pub fn witness_for(&self, index: u64) -> Result<MerkleWitness<DEPTH>> {
        let leaf = self.leaf(index).ok_or(Error::LeafNotFound {
            index,
            len: self.len(),
        })?;

        let mut path_elements = [Element::NULL_HASH; DEPTH];
        let mut path_directions = [false; DEPTH];

        let mut position = index;
        for level in 0..DEPTH {
            path_elements[level] = self.node(level, position ^ 1);
            path_directions[level] = position & 1 == 1;
            position >>= 1;
        }

        Ok(MerkleWitness {
            leaf,
            root: self.root(),
            path_elements,
            path_directions,
        })
    }
}
