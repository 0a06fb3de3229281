use ethnum::U256;

mod arith;
mod codec;
mod convert;
mod field;
#[cfg(feature = "rand")]
mod rand_impls;

/// A 256-bit unsigned integer that is used as a BN254 field element
///
/// The type can hold any value in `0..2^256`, but hashing and circuits see it as a [`Base`], an
/// integer modulo [`Element::MODULUS`]. Only values below the modulus are "canonical".
///
/// Values that come from outside the pool (user input, proof records, salts) must be checked with
/// [`Element::is_canonical`] before use. The pool never silently reduces them.
///
/// [`Base`]: crate::Base
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Element(#[cfg_attr(feature = "serde", serde(with = "codec::hex_u256"))] pub(crate) U256);

impl Element {
    /// `0`
    pub const ZERO: Self = Self(U256::ZERO);

    /// `1`
    pub const ONE: Self = Self(U256::ONE);

    /// `2^256 - 1`, which is not canonical
    pub const MAX: Self = Self(U256::MAX);

    /// The value of an empty leaf slot in a Merkle tree
    pub const NULL_HASH: Self = Self::ZERO;

    /// Create an [`Element`] from a `u64`
    ///
    /// Every `u64` is canonical, so this can be used in `const` contexts to build protocol
    /// constants
    #[inline]
    #[must_use]
    pub const fn new(i: u64) -> Self {
        Self(U256::new(i as u128))
    }

    /// The integer value of this [`Element`]
    #[inline]
    #[must_use]
    pub fn to_u256(self) -> U256 {
        self.0
    }
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary_impls {
    use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};
    use ethnum::U256;

    use super::Element;

    /// Uniform over all 256-bit values, so most generated elements are NOT canonical
    impl Arbitrary for Element {
        type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
        type Parameters = ();

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            any::<[u8; 32]>().prop_map(|bytes| Self(U256::from_be_bytes(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Element;

    #[test]
    fn constants_are_ordered() {
        assert!(Element::ZERO < Element::ONE);
        assert!(Element::MODULUS < Element::MAX);
        assert_eq!(Element::NULL_HASH, Element::ZERO);
        assert_eq!(Element::default(), Element::ZERO);
    }

    #[test]
    fn debug_and_display_are_lowercase_hex() {
        assert_eq!(Element::new(1).to_string(), "1");
        assert_eq!(Element::new(255).to_string(), "ff");
        assert_eq!(format!("{:?}", Element::new(0xabc)), "abc");
    }
}
