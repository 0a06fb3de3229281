/// Errors returned by [`Tree`] operations
///
/// [`Tree`]: crate::Tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Every leaf slot of the tree has been used
    #[error("the tree is full (capacity {capacity})")]
    CapacityExceeded {
        /// The number of leaves the tree can hold
        capacity: u64,
    },

    /// A witness was requested for a slot that has not been appended to
    ///
    /// ```rust
    /// # use smirk::*;
    /// let tree: Tree<32> = smirk! { 1, 2 };
    /// let error = tree.witness_for(2).unwrap_err();
    /// assert_eq!(error, Error::LeafNotFound { index: 2, len: 2 });
    /// ```
    #[error("no leaf at index {index} (the tree has {len} leaves)")]
    LeafNotFound {
        /// The requested index
        index: u64,
        /// The number of leaves in the tree
        len: u64,
    },

    /// A leaf was not a canonical field element
    #[error("leaf is not a canonical field element")]
    NonCanonicalLeaf,
}

/// Result alias for [`Tree`] operations
///
/// [`Tree`]: crate::Tree
pub type Result<T, E = Error> = std::result::Result<T, E>;
