use borsh::{BorshDeserialize, BorshSerialize};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use smirk::{hash_merge, Element};

use crate::{Error, OwnerSecret, Result};

/// One unit of shielded value
///
/// A note is known only to its owner until it is spent. The pool only sees its
/// [`commitment`](Note::commitment), and spending reveals only its
/// [`nullifier`](Note::nullifier).
///
/// The `Debug` impl does not print the amount or the salt:
/// ```rust
/// # use shielded_pool::*;
/// let note = Note::new(Element::new(1000), Element::new(1), Element::new(2), Element::new(3));
/// let debug = format!("{note:?}");
///
/// assert!(!debug.contains("3e8"));  // 1000 in hex
/// assert!(debug.contains("redacted"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Note {
    /// Quantity of value, in the token's base unit
    pub amount: Element,
    /// Field encoding of the asset identifier
    pub token: Element,
    /// Public key of the owner, derived from their [`OwnerSecret`]
    pub owner_public_key: Element,
    /// Single-use randomness, unique per note
    pub salt: Element,
}

impl core::fmt::Debug for Note {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Note")
            .field("amount", &"<redacted>")
            .field("token", &self.token)
            .field("owner_public_key", &self.owner_public_key)
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl Note {
    /// Create a note from its four fields
    #[must_use]
    pub fn new(amount: Element, token: Element, owner_public_key: Element, salt: Element) -> Self {
        Self {
            amount,
            token,
            owner_public_key,
            salt,
        }
    }

    /// Create a note with a fresh, canonical salt
    pub fn with_random_salt(
        amount: Element,
        token: Element,
        owner_public_key: Element,
        rng: impl RngCore + CryptoRng,
    ) -> Self {
        Self::new(amount, token, owner_public_key, Element::secure_random(rng))
    }

    /// The commitment to this note, `hash(amount, token, salt, owner_public_key)`
    ///
    /// The argument order is a protocol constant
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// # use smirk::hash_merge;
    /// let note = Note::new(Element::new(5), Element::new(6), Element::new(7), Element::new(8));
    ///
    /// assert_eq!(
    ///     note.commitment(),
    ///     hash_merge([Element::new(5), Element::new(6), Element::new(8), Element::new(7)]),
    /// );
    /// ```
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge::<{ crate::COMMITMENT_ARITY }>([
            self.amount,
            self.token,
            self.salt,
            self.owner_public_key,
        ])
    }

    /// The nullifier revealed when this note is spent by the holder of `owner_secret`
    #[must_use]
    pub fn nullifier(&self, owner_secret: &OwnerSecret) -> Element {
        nullify(owner_secret, self.salt)
    }

    /// Check that every field is a canonical field element
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// let note = Note::new(Element::new(1), Element::MAX, Element::new(2), Element::new(3));
    /// let error = note.validate_fields().unwrap_err();
    ///
    /// assert!(matches!(error, Error::InputMalformed { field: "token" }));
    /// ```
    pub fn validate_fields(&self) -> Result<()> {
        check_canonical("amount", self.amount)?;
        check_canonical("token", self.token)?;
        check_canonical("owner_public_key", self.owner_public_key)?;
        check_canonical("salt", self.salt)?;

        Ok(())
    }
}

/// The nullifier of a note with `salt`, owned by `owner_secret`: `hash(owner_secret, salt)`
#[must_use]
pub fn nullify(owner_secret: &OwnerSecret, salt: Element) -> Element {
    hash_merge([owner_secret.expose(), salt])
}

pub(crate) fn check_canonical(field: &'static str, element: Element) -> Result<()> {
    match element.is_canonical() {
        true => Ok(()),
        false => Err(Error::InputMalformed { field }),
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
    use test_strategy::proptest;

    use super::*;

    fn canonical(mut element: Element) -> Element {
        element.canonicalize();
        element
    }

    #[proptest]
    fn commitment_is_deterministic(amount: Element, token: Element, pk: Element, salt: Element) {
        let note = Note::new(canonical(amount), canonical(token), canonical(pk), canonical(salt));
        let same = note.clone();

        assert_eq!(note.commitment(), note.commitment());
        assert_eq!(note.commitment(), same.commitment());
    }

    #[proptest]
    fn nullifier_depends_on_secret_and_salt(secret: u64, salt: Element) {
        let secret = OwnerSecret::new(Element::new(secret)).unwrap();
        let salt = canonical(salt);

        let a = Note::new(Element::new(1), Element::new(2), Element::new(3), salt);
        let b = Note::new(Element::new(9), Element::new(8), Element::new(7), salt);

        // the nullifier only depends on the secret and salt
        assert_eq!(a.nullifier(&secret), b.nullifier(&secret));

        let other_salt = salt.field_add(Element::ONE);
        assert_ne!(nullify(&secret, salt), nullify(&secret, other_salt));

        let other_secret = OwnerSecret::new(secret.expose().field_add(Element::ONE)).unwrap();
        assert_ne!(nullify(&secret, salt), nullify(&other_secret, salt));
    }

    #[test]
    fn fixed_deposit_commitment_is_reproducible() {
        let amount = Element::new(1_000_000_000_000_000_000);
        let token = Element::new(123_456_789);
        let salt = Element::new(0x5a17);
        let pk = Element::new(0x0b0b);

        let commitment = Note::new(amount, token, pk, salt).commitment();

        assert_eq!(commitment, hash_merge([amount, token, salt, pk]));
        assert_eq!(commitment, Note::new(amount, token, pk, salt).commitment());
        assert!(commitment.is_canonical());

        // swapping salt and pk changes the commitment
        assert_ne!(commitment, Note::new(amount, token, salt, pk).commitment());
    }

    #[test]
    fn random_salt_is_canonical_and_fresh() {
        let mut rng = ChaChaRng::from_seed([1; 32]);
        let a = Note::with_random_salt(Element::ONE, Element::ONE, Element::ONE, &mut rng);
        let b = Note::with_random_salt(Element::ONE, Element::ONE, Element::ONE, &mut rng);

        assert!(a.salt.is_canonical());
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.commitment(), b.commitment());
    }

    #[test]
    fn serde_round_trip_keeps_commitment() {
        let note = Note::new(Element::new(10), Element::new(20), Element::new(30), Element::new(40));
        let json = serde_json::to_string(&note).unwrap();
        let back: Note = serde_json::from_str(&json).unwrap();

        assert_eq!(back.commitment(), note.commitment());
    }
}
