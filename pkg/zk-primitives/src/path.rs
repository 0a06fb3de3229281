use crate::{hash_merge, Element};

/// Compute the root hash of a merkle tree by folding a leaf with its siblings
///
/// `siblings` is an [`Iterator`] that yields tuples containing the sibling, and the direction bit
/// for that level. `false` means the running hash is the *left* child (so the sibling is on the
/// right), `true` means the running hash is the *right* child (so the sibling is on the left).
///
/// The elements of `siblings` are in "deepest-first" order, so a tree with `N` levels below the
/// root has `N` siblings.
///
/// For example, consider the following tree:
/// ```text
///            C
///          /   \
///         A     B
///        / \   / \
///       0   1 2   3
/// ```
/// Here:
///  - `A` is [`hash_merge(0, 1)`][crate::hash_merge]
///  - `B` is [`hash_merge(2, 3)`][crate::hash_merge]
///  - `C` is [`hash_merge(hash_merge(0, 1), hash_merge(2, 3))`][crate::hash_merge] (i.e. the root
///  hash of the tree)
///
/// If you wanted to prove that `2` was in the tree with this function, you would do the
/// following:
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(0), Element::new(1)]);
/// let b = hash_merge([Element::new(2), Element::new(3)]);
/// let c = hash_merge([a, b]);
///
/// let siblings = [
///   (
///     Element::new(3),
///     false,  // `2` is the left child, its sibling is on the right
///   ),
///   (
///     a,
///     true,  // `B` is the right child, its sibling is on the left
///   ),
/// ];
///
/// let root_hash = compute_merkle_root(Element::new(2), siblings);
/// assert_eq!(root_hash, c);  // the hashes match, proving that `2` is in the tree
///
/// // a different leaf in the same slot gives a different root
/// let root_hash_if_null = compute_merkle_root(Element::NULL_HASH, siblings);
/// assert_ne!(root_hash_if_null, c);
/// ```
pub fn compute_merkle_root<I: IntoIterator<Item = (Element, bool)>>(
    mut leaf: Element,
    siblings: I,
) -> Element {
    for (sibling, bit) in siblings {
        match bit {
            // bit is 0, this element is on the left
            false => leaf = hash_merge([leaf, sibling]),

            // bit is 1, this element is on the right
            true => leaf = hash_merge([sibling, leaf]),
        }
    }

    leaf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_level_directions_change_the_root() {
        let leaf = Element::new(12345);
        let siblings = [Element::new(67890), Element::new(111_222)];

        let left_left = compute_merkle_root(leaf, siblings.into_iter().zip([false, false]));
        let right_right = compute_merkle_root(leaf, siblings.into_iter().zip([true, true]));

        let expected_left_left = hash_merge([hash_merge([leaf, siblings[0]]), siblings[1]]);
        let expected_right_right = hash_merge([siblings[1], hash_merge([siblings[0], leaf])]);

        assert_eq!(left_left, expected_left_left);
        assert_eq!(right_right, expected_right_right);
        assert_ne!(left_left, right_right);
    }

    #[test]
    fn no_siblings_is_identity() {
        let leaf = Element::new(7);
        assert_eq!(compute_merkle_root(leaf, []), leaf);
    }
}
