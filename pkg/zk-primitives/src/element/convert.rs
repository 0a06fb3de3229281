use ethnum::U256;

use crate::Element;

macro_rules! from_uint {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Element {
                #[inline]
                fn from(value: $t) -> Self {
                    Self(U256::from(value))
                }
            }
        )*
    };
}

from_uint!(u8, u16, u32, u64, u128);

impl From<bool> for Element {
    #[inline]
    fn from(value: bool) -> Self {
        Self::from(u8::from(value))
    }
}

impl From<U256> for Element {
    #[inline]
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<Element> for U256 {
    #[inline]
    fn from(value: Element) -> Self {
        value.0
    }
}

impl Element {
    /// The 32 big-endian bytes of this [`Element`]
    ///
    /// This is the byte order used by the borsh encoding and by digests over public signals
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let mut expected = [0; 32];
    /// expected[30] = 1;
    /// expected[31] = 2;
    ///
    /// assert_eq!(Element::new(0x0102).to_be_bytes(), expected);
    /// ```
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// The inverse of [`Element::to_be_bytes`]
    ///
    /// The result may not be canonical
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }
}
