use std::cell::RefCell;

use light_poseidon::{Poseidon, PoseidonHasher};

use crate::{Base, Element};

/// The largest number of elements [`hash_merge`] accepts in a single call
///
/// This is the widest circom-compatible Poseidon instance
pub const MAX_HASH_ARITY: usize = 12;

#[cfg(feature = "test-api")]
pub use counters::{hash_count, hash_element_count, reset_hash_count, reset_hash_element_count};

thread_local! {
    /// One Poseidon instance per arity, built on first use
    ///
    /// `Poseidon::hash` clears its state after every call, so an instance can be reused
    static INSTANCES: RefCell<[Option<Poseidon<Base>>; MAX_HASH_ARITY]> =
        RefCell::new(Default::default());
}

/// Global counters of hashing work, for benchmarks and tests
#[cfg(feature = "test-api")]
mod counters {
    use core::sync::atomic::{AtomicUsize, Ordering::Relaxed};

    static CALLS: AtomicUsize = AtomicUsize::new(0);
    static ELEMENTS: AtomicUsize = AtomicUsize::new(0);

    pub(super) fn record(arity: usize) {
        CALLS.fetch_add(1, Relaxed);
        ELEMENTS.fetch_add(arity, Relaxed);
    }

    /// Calls to [`hash_merge`](crate::hash_merge) since the last reset
    pub fn hash_count() -> usize {
        CALLS.load(Relaxed)
    }

    /// Reset [`hash_count`] to 0
    pub fn reset_hash_count() {
        CALLS.store(0, Relaxed);
    }

    /// Elements passed to [`hash_merge`](crate::hash_merge) since the last reset
    pub fn hash_element_count() -> usize {
        ELEMENTS.load(Relaxed)
    }

    /// Reset [`hash_element_count`] to 0
    pub fn reset_hash_element_count() {
        ELEMENTS.store(0, Relaxed);
    }
}

/// Hash `N` elements together with the circom-compatible Poseidon permutation over BN254
///
/// This function is used to calculate the hash of a parent node from the hash of its children,
/// i.e.: `parent_hash = hash_merge([left_hash, right_hash])`, and to derive note commitments and
/// nullifiers.
///
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(1), Element::new(2)]);
/// let b = hash_merge([Element::new(1), Element::new(3)]);
/// let c = hash_merge([Element::new(2), Element::new(3)]);
///
/// assert_ne!(a, b);
/// assert_ne!(a, c);
/// assert_ne!(b, c);
/// ```
/// This operation is not symmetric:
/// ```rust
/// # use zk_primitives::*;
/// let a = Element::new(1);
/// let b = Element::new(2);
///
/// let ab = hash_merge([a, b]);
/// let ba = hash_merge([b, a]);
///
/// assert_ne!(ab, ba);
/// ```
///
/// Inputs are interpreted modulo [`Element::MODULUS`]. Callers that accept untrusted input should
/// reject non-canonical elements before hashing (see [`Element::try_canonical`]).
///
/// `N` must be in the range `1..=MAX_HASH_ARITY`, which is checked at compile time.
#[inline]
#[must_use]
pub fn hash_merge<const N: usize>(elements: [Element; N]) -> Element {
    const { assert!(N >= 1 && N <= MAX_HASH_ARITY, "unsupported poseidon arity") };

    #[cfg(feature = "test-api")]
    counters::record(N);

    let inputs = elements.map(Element::to_base);

    // both calls only fail for an arity outside `1..=12`, which is ruled out above
    #[allow(clippy::expect_used)]
    let hash = INSTANCES.with_borrow_mut(|instances| {
        instances[N - 1]
            .get_or_insert_with(|| {
                Poseidon::<Base>::new_circom(N).expect("arity is checked at compile time")
            })
            .hash(&inputs)
            .expect("input length matches the instance width")
    });

    Element::from_base(hash)
}
