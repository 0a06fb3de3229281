//! Integer arithmetic on the 256-bit representation
//!
//! None of these reduce modulo [`Element::MODULUS`]. Use [`Element::field_add`] and
//! [`Element::field_mul`] for field arithmetic.

use crate::Element;

macro_rules! int_op {
    ($trait:ident, $f:ident, $op:tt) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Element {
                Element(self.0 $op rhs.0)
            }
        }

        impl core::ops::$trait<u64> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: u64) -> Element {
                self $op Element::new(rhs)
            }
        }
    };
}

int_op!(Add, add, +);
int_op!(Sub, sub, -);
int_op!(Mul, mul, *);

impl Element {
    /// Integer addition, or `None` if the sum does not fit in 256 bits
    ///
    /// The sum may still exceed [`Element::MODULUS`]
    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Element) -> Option<Element> {
        self.0.checked_add(rhs.0).map(Element)
    }
}
