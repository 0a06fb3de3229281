use ark_ff::{BigInteger, PrimeField};
use ethnum::{uint, U256};

use crate::{Base, Element};

impl Element {
    /// The modulus of the underlying prime field (the BN254 scalar field)
    pub const MODULUS: Element = Element(uint!(
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
    ));

    /// Convert this [`Element`] to its equivalent [`Base`] representation
    ///
    /// Non-canonical elements are reduced modulo [`Element::MODULUS`]
    #[inline]
    #[must_use]
    pub fn to_base(self) -> Base {
        Base::from_le_bytes_mod_order(&self.0.to_le_bytes())
    }

    /// Create an [`Element`] from a [`Base`]
    ///
    /// The result is always canonical
    #[inline]
    #[must_use]
    pub fn from_base(base: Base) -> Element {
        let limbs = base.into_bigint().to_bytes_le();

        let mut bytes = [0; 32];
        for (byte, limb) in bytes.iter_mut().zip(limbs) {
            *byte = limb;
        }

        Self(U256::from_le_bytes(bytes))
    }

    /// Reduce this element to its canonical form
    ///
    /// [`Base`]s are integers modulo "some prime number", and as such have a smaller set of
    /// possible values than [`Element`], which is just a 256-bit unsigned integer.
    ///
    /// This function reduces an element to its canonical form by applying this modulus.
    ///
    /// Elements in canonical form are guaranteed to be unchanged when converting to/from a [`Base`]
    #[inline]
    pub fn canonicalize(&mut self) {
        self.0 %= Self::MODULUS.0;
    }

    /// Whether this [`Element`] is in its canonical form
    ///
    /// See the docs for [`Element::canonicalize`] for more details on what the canonical form of
    /// an [`Element`] is
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert!(Element::ZERO.is_canonical());
    /// assert!((Element::MODULUS - 1u64).is_canonical());
    /// assert!(!Element::MODULUS.is_canonical());
    /// assert!(!Element::MAX.is_canonical());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.0 < Self::MODULUS.0
    }

    /// Returns `Some(self)` if this element is canonical, otherwise `None`
    ///
    /// This is the check used at every site where the pool accepts an element from outside
    #[inline]
    #[must_use]
    pub fn try_canonical(self) -> Option<Self> {
        self.is_canonical().then_some(self)
    }

    /// Multiply two elements in the field
    ///
    /// Unlike `*`, which operates on the 256-bit integer representation, this reduces the result
    /// modulo [`Element::MODULUS`]
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let p_minus_one = Element::MODULUS - 1u64;
    /// assert_eq!(p_minus_one.field_mul(p_minus_one), Element::ONE);
    /// ```
    #[inline]
    #[must_use]
    pub fn field_mul(self, other: Element) -> Element {
        Element::from_base(self.to_base() * other.to_base())
    }

    /// Add two elements in the field
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let p_minus_one = Element::MODULUS - 1u64;
    /// assert_eq!(p_minus_one.field_add(Element::new(2)), Element::ONE);
    /// ```
    #[inline]
    #[must_use]
    pub fn field_add(self, other: Element) -> Element {
        Element::from_base(self.to_base() + other.to_base())
    }
}

impl From<Base> for Element {
    fn from(value: Base) -> Self {
        Element::from_base(value)
    }
}

impl From<Element> for Base {
    fn from(value: Element) -> Self {
        value.to_base()
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[proptest]
    fn to_from_base_biject(mut element: Element) {
        element.canonicalize();

        let base = element.to_base();
        let element_again = Element::from_base(base);

        assert_eq!(element, element_again);
    }

    #[proptest]
    fn canonicalize_agrees_with_is_canonical(mut element: Element) {
        element.canonicalize();
        assert!(element.is_canonical());
        assert_eq!(element.try_canonical(), Some(element));
    }

    #[test]
    fn modulus_wraps_to_zero() {
        assert_eq!(Element::from_base(Element::MODULUS.to_base()), Element::ZERO);
        assert_eq!(Element::MODULUS.try_canonical(), None);
    }

    #[test]
    fn field_mul_matches_integer_mul_for_small_values() {
        let a = Element::new(1234);
        let b = Element::new(5678);

        assert_eq!(a.field_mul(b), a * b);
    }
}
