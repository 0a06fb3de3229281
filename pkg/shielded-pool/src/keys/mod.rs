//! Owner secrets and the derivation of owner public keys
//!
//! Commitments only see the public key, so the derivation can be swapped without touching the
//! commitment scheme or the accumulator. Circuits pin the derivation they use through their
//! [`CircuitId`](crate::CircuitId) version.

use smirk::{hash_merge, Element};

use crate::{Error, Result, KEY_DOMAIN};

mod baby_jubjub;

pub use baby_jubjub::BabyJubjubKeyDerivation;

/// The secret that authorizes spending a note
///
/// This is supplied by the caller's key material provider, and is never generated or persisted
/// by the pool. The `Debug` impl never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnerSecret(Element);

impl core::fmt::Debug for OwnerSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("OwnerSecret(<redacted>)")
    }
}

impl OwnerSecret {
    /// Wrap a secret, rejecting values that are not canonical field elements
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// assert!(OwnerSecret::new(Element::new(42)).is_ok());
    /// assert!(OwnerSecret::new(Element::MAX).is_err());
    /// ```
    pub fn new(secret: Element) -> Result<Self> {
        match secret.is_canonical() {
            true => Ok(Self(secret)),
            false => Err(Error::InputMalformed {
                field: "owner_secret",
            }),
        }
    }

    /// Access the secret value
    ///
    /// Only hashing and key derivation should need this
    #[inline]
    #[must_use]
    pub fn expose(&self) -> Element {
        self.0
    }
}

/// Derives an owner's public key from their [`OwnerSecret`]
pub trait KeyDerivation: Send + Sync + 'static {
    /// The public key for `secret`
    fn public_key(&self, secret: &OwnerSecret) -> Result<Element>;
}

impl<K: KeyDerivation> KeyDerivation for std::sync::Arc<K> {
    fn public_key(&self, secret: &OwnerSecret) -> Result<Element> {
        K::public_key(self, secret)
    }
}

/// `secret^2 mod p`
///
/// This relation is NOT one-way (anyone can take a square root), and exists for tests and parity
/// with the simplified reference scheme. Use [`PoseidonKeyDerivation`] or
/// [`BabyJubjubKeyDerivation`] for real keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaringKeyDerivation;

impl KeyDerivation for SquaringKeyDerivation {
    fn public_key(&self, secret: &OwnerSecret) -> Result<Element> {
        let secret = secret.expose();
        Ok(secret.field_mul(secret))
    }
}

/// `hash(secret, KEY_DOMAIN)`
///
/// ```rust
/// # use shielded_pool::*;
/// let secret = OwnerSecret::new(Element::new(42)).unwrap();
/// let pk = PoseidonKeyDerivation.public_key(&secret).unwrap();
///
/// assert_eq!(pk, PoseidonKeyDerivation.public_key(&secret).unwrap());
/// assert_ne!(pk, SquaringKeyDerivation.public_key(&secret).unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseidonKeyDerivation;

impl KeyDerivation for PoseidonKeyDerivation {
    fn public_key(&self, secret: &OwnerSecret) -> Result<Element> {
        Ok(hash_merge([secret.expose(), KEY_DOMAIN]))
    }
}
