use ark_ff::{Field, MontFp, One, Zero};
use ethnum::{uint, U256};
use smirk::{hash_merge, Base, Element};

use crate::{Error, KeyDerivation, OwnerSecret, Result};

/// Curve parameter `a` of Baby Jubjub (`a * x^2 + y^2 = 1 + d * x^2 * y^2`)
const A: Base = MontFp!("168700");

/// Curve parameter `d` of Baby Jubjub
const D: Base = MontFp!("168696");

/// The order of the prime subgroup generated by [`BASE8`]
const SUBGROUP_ORDER: U256 =
    uint!("2736030358979909402780800718157159386076813972158567259200215660948447373041");

/// The standard generator of the prime subgroup (8 times the curve generator)
const BASE8: Point = Point {
    x: MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553"),
    y: MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203"),
};

/// `secret * BASE8` on the Baby Jubjub curve, hashed to a single element
///
/// Recovering the secret from the key is a discrete log problem. Secrets must be in
/// `1..SUBGROUP_ORDER`, so that every key has exactly one secret (and so one nullifier per salt):
///
/// ```rust
/// # use shielded_pool::*;
/// let keys = BabyJubjubKeyDerivation;
///
/// let secret = OwnerSecret::new(Element::new(42)).unwrap();
/// assert!(keys.public_key(&secret).is_ok());
///
/// let zero = OwnerSecret::new(Element::ZERO).unwrap();
/// assert!(keys.public_key(&zero).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BabyJubjubKeyDerivation;

impl KeyDerivation for BabyJubjubKeyDerivation {
    fn public_key(&self, secret: &OwnerSecret) -> Result<Element> {
        let scalar = secret.expose().to_u256();

        if scalar == U256::ZERO || scalar >= SUBGROUP_ORDER {
            return Err(Error::InputMalformed {
                field: "owner_secret",
            });
        }

        let point = BASE8.scalar_mul(scalar).ok_or(Error::InputMalformed {
            field: "owner_secret",
        })?;

        Ok(hash_merge([
            Element::from_base(point.x),
            Element::from_base(point.y),
        ]))
    }
}

/// A point in affine twisted Edwards coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Point {
    x: Base,
    y: Base,
}

impl Point {
    fn identity() -> Self {
        Self {
            x: Base::zero(),
            y: Base::one(),
        }
    }

    /// The addition law is complete on this curve, so `None` only happens for points that are
    /// not on the curve
    fn add_point(self, other: Self) -> Option<Self> {
        let t = D * self.x * other.x * self.y * other.y;

        let x = (self.x * other.y + self.y * other.x) * (Base::one() + t).inverse()?;
        let y = (self.y * other.y - A * self.x * other.x) * (Base::one() - t).inverse()?;

        Some(Self { x, y })
    }

    /// Double-and-add, most significant bit first
    fn scalar_mul(self, scalar: U256) -> Option<Self> {
        let mut acc = Self::identity();

        for bit in (0..256u32).rev() {
            acc = acc.add_point(acc)?;

            if (scalar >> bit) & U256::ONE == U256::ONE {
                acc = acc.add_point(self)?;
            }
        }

        Some(acc)
    }

    fn is_on_curve(self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();

        A * x2 + y2 == Base::one() + D * x2 * y2
    }
}
