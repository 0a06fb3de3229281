//! Text and binary encodings of [`Element`]
//!
//! - `Display`/`Debug` print lowercase hex without a prefix
//! - serde uses a 64 digit big-endian hex string, and accepts an optional `0x` prefix and
//!   shorter strings on input (left-padded with zeroes)
//! - borsh uses 32 big-endian bytes

use std::fmt::{Binary, Debug, Display, LowerHex, UpperHex};

use ethnum::U256;

use crate::Element;

macro_rules! fmt_impl {
    ($t:ident, $u:ident) => {
        impl $u for Element {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                <U256 as $t>::fmt(&self.0, f)
            }
        }
    };
    ($t:ident) => {
        fmt_impl!($t, $t);
    };
}

fmt_impl!(LowerHex, Display);
fmt_impl!(LowerHex, Debug);
fmt_impl!(UpperHex);
fmt_impl!(LowerHex);
fmt_impl!(Binary);

/// Parse a big-endian hex string of at most 64 digits
fn parse_hex(s: &str) -> Result<U256, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);

    if digits.is_empty() || digits.len() > 64 {
        return Err(format!("expected 1 to 64 hex digits, got {}", digits.len()));
    }

    let padded = format!("{digits:0>64}");
    let vec = hex::decode(padded).map_err(|e| e.to_string())?;
    let bytes = <[u8; 32]>::try_from(vec).map_err(|_| "invalid length".to_string())?;

    Ok(U256::from_be_bytes(bytes))
}

#[cfg(feature = "serde")]
pub(super) mod hex_u256 {
    use ethnum::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(in crate::element) fn serialize<S>(u: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::serde::serialize(u.to_be_bytes(), serializer)
    }

    pub(in crate::element) fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "borsh")]
mod borsh_impls {
    use borsh::{BorshDeserialize, BorshSerialize};
    use ethnum::U256;

    use crate::Element;

    impl BorshSerialize for Element {
        fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
            self.0.to_be_bytes().serialize(writer)
        }
    }

    impl BorshDeserialize for Element {
        fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
            let bytes = <[u8; 32]>::deserialize_reader(reader)?;
            Ok(Self(U256::from_be_bytes(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn short_and_prefixed_hex_are_accepted() {
        assert_eq!(parse_hex("0x1").unwrap(), U256::ONE);
        assert_eq!(parse_hex("ff").unwrap(), U256::new(255));
        assert!(parse_hex("").is_err());
        assert!(parse_hex(&"1".repeat(65)).is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_full_width_hex() {
        let json = serde_json::to_string(&Element::new(255)).unwrap();
        assert_eq!(json, format!("\"{:0>64}\"", "ff"));

        let element: Element = serde_json::from_str("\"0x0b\"").unwrap();
        assert_eq!(element, Element::new(11));
    }

    #[cfg(feature = "serde")]
    #[proptest]
    fn elements_produce_identical_base_before_after_serialize(element: Element) {
        let value = serde_json::to_value(element).unwrap();
        let element_again: Element = serde_json::from_value(value).unwrap();

        assert_eq!(element, element_again);
        assert_eq!(element.to_base(), element_again.to_base());
    }

    #[cfg(feature = "borsh")]
    #[test]
    fn borsh_is_big_endian() {
        let bytes = borsh::to_vec(&Element::ONE).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert_eq!(borsh::from_slice::<Element>(&bytes).unwrap(), Element::ONE);
    }
}
