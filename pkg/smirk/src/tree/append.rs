use std::ops::Range;

use crate::{hash_merge, Element};

use super::{Error, Result, Tree};

impl<const DEPTH: usize> Tree<DEPTH> {
    /// Append `leaf` in the next free slot, returning its index
    ///
    /// This recomputes the `DEPTH` nodes on the path from the new leaf to the root, so costs
    /// exactly `DEPTH` hashes.
    ///
    /// ```rust
    /// # use smirk::*;
    /// let mut tree = Tree::<32>::new();
    ///
    /// assert_eq!(tree.append(Element::new(10)).unwrap(), 0);
    /// assert_eq!(tree.append(Element::new(20)).unwrap(), 1);
    ///
    /// // leaves must be canonical field elements
    /// assert_eq!(tree.append(Element::MAX).unwrap_err(), Error::NonCanonicalLeaf);
    /// ```
    pub fn append(&mut self, leaf: Element) -> Result<u64> {
        self.check_room(1)?;

        if !leaf.is_canonical() {
            return Err(Error::NonCanonicalLeaf);
        }

        let index = self.push_unchecked(leaf);
        tracing::debug!(index, depth = DEPTH, "appended leaf");

        Ok(index)
    }

    /// Append every leaf of `leaves` in order, returning the range of indices they were given
    ///
    /// Either every leaf is appended, or (if any is non-canonical, or there is not enough room)
    /// none are:
    ///
    /// ```rust
    /// # use smirk::*;
    /// let mut tree = Tree::<4>::new();
    ///
    /// let error = tree.extend([Element::ONE, Element::MAX]).unwrap_err();
    /// assert_eq!(error, Error::NonCanonicalLeaf);
    /// assert!(tree.is_empty());
    ///
    /// let indices = tree.extend([1, 2, 3].map(Element::new)).unwrap();
    /// assert_eq!(indices, 0..3);
    /// ```
    pub fn extend(&mut self, leaves: impl IntoIterator<Item = Element>) -> Result<Range<u64>> {
        let leaves: Vec<_> = leaves.into_iter().collect();

        self.check_room(leaves.len() as u64)?;

        if leaves.iter().any(|leaf| !leaf.is_canonical()) {
            return Err(Error::NonCanonicalLeaf);
        }

        let start = self.len();
        for leaf in leaves {
            self.push_unchecked(leaf);
        }
        let end = self.len();

        tracing::debug!(start, end, depth = DEPTH, "appended leaves");

        Ok(start..end)
    }

    fn check_room(&self, additional: u64) -> Result<()> {
        let capacity = Self::capacity();

        match self.len().checked_add(additional) {
            Some(total) if total <= capacity => Ok(()),
            _ => {
                tracing::warn!(capacity, len = self.len(), "tree is full");
                Err(Error::CapacityExceeded { capacity })
            }
        }
    }

    /// Caller must check capacity and canonical form
    fn push_unchecked(&mut self, leaf: Element) -> u64 {
        let index = self.len();
        self.leaves.push(leaf);
        self.positions.entry(leaf).or_insert(index);

        let mut hash = leaf;
        let mut position = index;

        for level in 0..DEPTH {
            let sibling = self.node(level, position ^ 1);

            hash = match position & 1 == 1 {
                false => hash_merge([hash, sibling]),
                true => hash_merge([sibling, hash]),
            };

            position >>= 1;
            self.nodes.insert((level + 1, position), hash);
        }

        self.root = hash;
        index
    }
}
