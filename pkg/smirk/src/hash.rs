use std::sync::OnceLock;

use crate::Element;

/// Number of levels precomputed, enough for any tree whose index fits in a `u64`
const COMPUTE_LEVELS: usize = 64;

/// The hash of an empty subtree whose root sits `level` levels above the leaves
///
/// This function can be defined recursively:
///  - `empty_tree_hash(0) = Element::NULL_HASH` (an empty leaf slot)
///  - `empty_tree_hash(n) = hash_merge(empty_tree_hash(n - 1), empty_tree_hash(n - 1))`
///
/// The first 64 levels are computed once and cached, so calls are essentially free after the
/// initial setup. Larger levels fall back to hashing on top of the cache.
///
/// ```rust
/// # use smirk::*;
/// assert_eq!(empty_tree_hash(0), Element::NULL_HASH);
/// assert_eq!(
///     empty_tree_hash(1),
///     hash_merge([Element::NULL_HASH, Element::NULL_HASH]),
/// );
/// ```
#[inline]
#[must_use]
pub fn empty_tree_hash(level: usize) -> Element {
    get_cache()
        .get(level)
        .copied()
        .unwrap_or_else(|| fallback(level))
}

fn fallback(level: usize) -> Element {
    match level {
        0..COMPUTE_LEVELS => get_cache()[level],
        other => {
            tracing::warn!(level = other, "using slow fallback for `empty_tree_hash`");
            let hash = fallback(other - 1);
            crate::hash_merge([hash, hash])
        }
    }
}

fn get_cache() -> &'static [Element] {
    static CACHE: OnceLock<Vec<Element>> = OnceLock::new();

    CACHE.get_or_init(|| {
        let mut vec = Vec::with_capacity(COMPUTE_LEVELS);
        let mut hash = Element::NULL_HASH;
        vec.push(hash);

        for _ in 1..COMPUTE_LEVELS {
            hash = crate::hash_merge([hash, hash]);
            vec.push(hash);
        }

        vec
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_merge;

    #[test]
    fn each_level_hashes_the_one_below() {
        for level in 1..8 {
            let below = empty_tree_hash(level - 1);
            assert_eq!(empty_tree_hash(level), hash_merge([below, below]));
        }
    }

    #[test]
    fn fallback_agrees_with_cache() {
        let top = empty_tree_hash(COMPUTE_LEVELS - 1);
        assert_eq!(empty_tree_hash(COMPUTE_LEVELS), hash_merge([top, top]));
    }
}
