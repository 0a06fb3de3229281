//! The relations each circuit enforces, and the witnesses that satisfy them
//!
//! A proving backend is expected to enforce exactly these relations. [`Witness::check`] evaluates
//! them off-circuit, which is what the development backend does instead of proving.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use smirk::{compute_merkle_root, Element};

use crate::{note::check_canonical, nullify, KeyDerivation, Note, OwnerSecret, Result};

/// The kinds of circuit the pool uses
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CircuitKind {
    /// Proves a commitment is well formed
    Deposit,
    /// Proves a note in the tree was consumed to create a new note of equal value
    Spend,
    /// Proves a note in the tree was consumed to release its amount to a plaintext recipient
    Withdraw,
}

/// A versioned circuit identifier
///
/// Any change to the public signal layout or the relations of a circuit needs a new version, so
/// that proofs for the old version are still checked against the old relations
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct CircuitId {
    /// The kind of circuit
    pub kind: CircuitKind,
    /// The version of the circuit
    pub version: u16,
}

impl CircuitId {
    /// Deposit with public signals `(commitment, token, denomination_bucket)`
    pub const DEPOSIT_V1: Self = Self::new(CircuitKind::Deposit, 1);

    /// Spend with public signals `(root, nullifier, token, denomination_bucket, new_commitment)`
    pub const SPEND_V1: Self = Self::new(CircuitKind::Spend, 1);

    /// Withdraw with public signals `(root, nullifier, token, denomination_bucket, amount,
    /// recipient)`
    pub const WITHDRAW_V1: Self = Self::new(CircuitKind::Withdraw, 1);

    /// Create a circuit identifier
    #[must_use]
    pub const fn new(kind: CircuitKind, version: u16) -> Self {
        Self { kind, version }
    }
}

impl core::fmt::Display for CircuitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match self.kind {
            CircuitKind::Deposit => "deposit",
            CircuitKind::Spend => "spend",
            CircuitKind::Withdraw => "withdraw",
        };

        write!(f, "{kind}-v{}", self.version)
    }
}

/// A relation that a witness did not satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Constraint {
    /// The declared commitment is not the hash of the note fields
    #[error("commitment")]
    Commitment,
    /// The owner secret does not derive a valid public key
    #[error("owner key")]
    OwnerKey,
    /// The input commitment does not fold up the path to the root
    #[error("merkle membership")]
    Membership,
    /// The path elements and path directions have different lengths
    #[error("merkle path length")]
    PathLength,
    /// The declared nullifier is not `hash(owner_secret, salt)`
    #[error("nullifier")]
    Nullifier,
    /// The output amount differs from the input amount
    #[error("conservation")]
    Conservation,
    /// The declared new commitment is not the hash of the output note fields
    #[error("output commitment")]
    OutputCommitment,
}

/// Witness for [`CircuitId::DEPOSIT_V1`]
#[derive(Clone, PartialEq, Eq)]
pub struct DepositWitness {
    /// Public
    pub commitment: Element,
    /// Public
    pub token: Element,
    /// Public
    pub denomination_bucket: Element,
    /// Private
    pub amount: Element,
    /// Private
    pub salt: Element,
    /// Private
    pub owner_public_key: Element,
}

impl DepositWitness {
    /// The public signals, in circuit order
    #[must_use]
    pub fn public_signals(&self) -> Vec<Element> {
        vec![self.commitment, self.token, self.denomination_bucket]
    }

    /// Evaluate the circuit relations
    pub fn check(&self) -> Result<(), Constraint> {
        let note = Note::new(self.amount, self.token, self.owner_public_key, self.salt);

        match note.commitment() == self.commitment {
            true => Ok(()),
            false => Err(Constraint::Commitment),
        }
    }

    fn elements(&self) -> [(&'static str, Element); 6] {
        [
            ("commitment", self.commitment),
            ("token", self.token),
            ("denomination_bucket", self.denomination_bucket),
            ("amount", self.amount),
            ("salt", self.salt),
            ("owner_public_key", self.owner_public_key),
        ]
    }
}

/// Witness for [`CircuitId::SPEND_V1`]
#[derive(Clone, PartialEq, Eq)]
pub struct SpendWitness {
    /// Public
    pub root: Element,
    /// Public
    pub nullifier: Element,
    /// Public
    pub token: Element,
    /// Public
    pub denomination_bucket: Element,
    /// Public
    pub new_commitment: Element,
    /// Private
    pub amount: Element,
    /// Private
    pub salt: Element,
    /// Private
    pub owner_secret: OwnerSecret,
    /// Private, deepest first
    pub path_elements: Vec<Element>,
    /// Private, deepest first
    pub path_directions: Vec<bool>,
    /// Private
    pub output_amount: Element,
    /// Private
    pub output_salt: Element,
    /// Private
    pub output_owner_public_key: Element,
}

impl SpendWitness {
    /// The public signals, in circuit order
    #[must_use]
    pub fn public_signals(&self) -> Vec<Element> {
        vec![
            self.root,
            self.nullifier,
            self.token,
            self.denomination_bucket,
            self.new_commitment,
        ]
    }

    /// Evaluate the circuit relations, deriving the owner key with `keys`
    pub fn check(&self, keys: &impl KeyDerivation) -> Result<(), Constraint> {
        let input = Membership {
            amount: self.amount,
            token: self.token,
            salt: self.salt,
            owner_secret: &self.owner_secret,
            path_elements: &self.path_elements,
            path_directions: &self.path_directions,
            root: self.root,
            nullifier: self.nullifier,
        };
        input.check(keys)?;

        if self.output_amount != self.amount {
            return Err(Constraint::Conservation);
        }

        let output = Note::new(
            self.output_amount,
            self.token,
            self.output_owner_public_key,
            self.output_salt,
        );

        match output.commitment() == self.new_commitment {
            true => Ok(()),
            false => Err(Constraint::OutputCommitment),
        }
    }

    fn elements(&self) -> Vec<(&'static str, Element)> {
        let mut elements = vec![
            ("root", self.root),
            ("nullifier", self.nullifier),
            ("token", self.token),
            ("denomination_bucket", self.denomination_bucket),
            ("new_commitment", self.new_commitment),
            ("amount", self.amount),
            ("salt", self.salt),
            ("owner_secret", self.owner_secret.expose()),
            ("output_amount", self.output_amount),
            ("output_salt", self.output_salt),
            ("output_owner_public_key", self.output_owner_public_key),
        ];
        elements.extend(self.path_elements.iter().map(|e| ("path_elements", *e)));
        elements
    }
}

/// Witness for [`CircuitId::WITHDRAW_V1`]
#[derive(Clone, PartialEq, Eq)]
pub struct WithdrawWitness {
    /// Public
    pub root: Element,
    /// Public
    pub nullifier: Element,
    /// Public
    pub token: Element,
    /// Public
    pub denomination_bucket: Element,
    /// Public
    pub amount: Element,
    /// Public
    pub recipient: Element,
    /// Private
    pub salt: Element,
    /// Private
    pub owner_secret: OwnerSecret,
    /// Private, deepest first
    pub path_elements: Vec<Element>,
    /// Private, deepest first
    pub path_directions: Vec<bool>,
}

impl WithdrawWitness {
    /// The public signals, in circuit order
    #[must_use]
    pub fn public_signals(&self) -> Vec<Element> {
        vec![
            self.root,
            self.nullifier,
            self.token,
            self.denomination_bucket,
            self.amount,
            self.recipient,
        ]
    }

    /// Evaluate the circuit relations, deriving the owner key with `keys`
    pub fn check(&self, keys: &impl KeyDerivation) -> Result<(), Constraint> {
        Membership {
            amount: self.amount,
            token: self.token,
            salt: self.salt,
            owner_secret: &self.owner_secret,
            path_elements: &self.path_elements,
            path_directions: &self.path_directions,
            root: self.root,
            nullifier: self.nullifier,
        }
        .check(keys)
    }

    fn elements(&self) -> Vec<(&'static str, Element)> {
        let mut elements = vec![
            ("root", self.root),
            ("nullifier", self.nullifier),
            ("token", self.token),
            ("denomination_bucket", self.denomination_bucket),
            ("amount", self.amount),
            ("recipient", self.recipient),
            ("salt", self.salt),
            ("owner_secret", self.owner_secret.expose()),
        ];
        elements.extend(self.path_elements.iter().map(|e| ("path_elements", *e)));
        elements
    }
}

/// The part of the spend and withdraw circuits that proves ownership of a note in the tree
struct Membership<'a> {
    amount: Element,
    token: Element,
    salt: Element,
    owner_secret: &'a OwnerSecret,
    path_elements: &'a [Element],
    path_directions: &'a [bool],
    root: Element,
    nullifier: Element,
}

impl Membership<'_> {
    fn check(&self, keys: &impl KeyDerivation) -> Result<(), Constraint> {
        let owner_public_key = keys
            .public_key(self.owner_secret)
            .map_err(|_| Constraint::OwnerKey)?;

        let commitment = Note::new(self.amount, self.token, owner_public_key, self.salt).commitment();

        if self.path_elements.len() != self.path_directions.len() {
            return Err(Constraint::PathLength);
        }

        let siblings = self
            .path_elements
            .iter()
            .copied()
            .zip(self.path_directions.iter().copied());

        if compute_merkle_root(commitment, siblings) != self.root {
            return Err(Constraint::Membership);
        }

        if nullify(self.owner_secret, self.salt) != self.nullifier {
            return Err(Constraint::Nullifier);
        }

        Ok(())
    }
}

/// A witness for any of the pool's circuits
#[derive(Clone, PartialEq, Eq)]
pub enum Witness {
    /// See [`DepositWitness`]
    Deposit(DepositWitness),
    /// See [`SpendWitness`]
    Spend(SpendWitness),
    /// See [`WithdrawWitness`]
    Withdraw(WithdrawWitness),
}

impl Witness {
    /// The circuit this witness is for
    #[must_use]
    pub fn circuit(&self) -> CircuitId {
        match self {
            Self::Deposit(_) => CircuitId::DEPOSIT_V1,
            Self::Spend(_) => CircuitId::SPEND_V1,
            Self::Withdraw(_) => CircuitId::WITHDRAW_V1,
        }
    }

    /// The public signals, in circuit order
    #[must_use]
    pub fn public_signals(&self) -> Vec<Element> {
        match self {
            Self::Deposit(w) => w.public_signals(),
            Self::Spend(w) => w.public_signals(),
            Self::Withdraw(w) => w.public_signals(),
        }
    }

    /// Evaluate the circuit relations
    pub fn check(&self, keys: &impl KeyDerivation) -> Result<(), Constraint> {
        match self {
            Self::Deposit(w) => w.check(),
            Self::Spend(w) => w.check(keys),
            Self::Withdraw(w) => w.check(keys),
        }
    }

    /// The merkle path of this witness, if it has one
    #[must_use]
    pub fn path(&self) -> Option<(&[Element], &[bool])> {
        match self {
            Self::Deposit(_) => None,
            Self::Spend(w) => Some((&w.path_elements, &w.path_directions)),
            Self::Withdraw(w) => Some((&w.path_elements, &w.path_directions)),
        }
    }

    /// Check the shape of the witness: every element is canonical, and the merkle path (if any)
    /// has `depth` levels
    pub(crate) fn check_structure(&self, depth: usize) -> Result<()> {
        let elements = match self {
            Self::Deposit(w) => w.elements().to_vec(),
            Self::Spend(w) => w.elements(),
            Self::Withdraw(w) => w.elements(),
        };

        for (field, element) in elements {
            check_canonical(field, element)?;
        }

        if let Some((path_elements, path_directions)) = self.path() {
            if path_elements.len() != depth {
                return Err(crate::Error::InputMalformed {
                    field: "path_elements",
                });
            }

            if path_directions.len() != depth {
                return Err(crate::Error::InputMalformed {
                    field: "path_directions",
                });
            }
        }

        Ok(())
    }
}

/// Only the circuit and public signals are printed, never the private inputs
impl core::fmt::Debug for Witness {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Witness")
            .field("circuit", &self.circuit())
            .field("public_signals", &self.public_signals())
            .finish_non_exhaustive()
    }
}

macro_rules! redacted_debug {
    ($t:ident) => {
        impl core::fmt::Debug for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_struct(stringify!($t))
                    .field("public_signals", &self.public_signals())
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(DepositWitness);
redacted_debug!(SpendWitness);
redacted_debug!(WithdrawWitness);

impl From<DepositWitness> for Witness {
    fn from(witness: DepositWitness) -> Self {
        Self::Deposit(witness)
    }
}

impl From<SpendWitness> for Witness {
    fn from(witness: SpendWitness) -> Self {
        Self::Spend(witness)
    }
}

impl From<WithdrawWitness> for Witness {
    fn from(witness: WithdrawWitness) -> Self {
        Self::Withdraw(witness)
    }
}

#[cfg(test)]
mod tests {
    use smirk::Tree;

    use super::*;
    use crate::{Error, SquaringKeyDerivation};

    fn spend_witness() -> SpendWitness {
        let keys = SquaringKeyDerivation;
        let secret = OwnerSecret::new(Element::new(3)).unwrap();
        let pk = keys.public_key(&secret).unwrap();
        let note = Note::new(Element::new(50), Element::new(1), pk, Element::new(77));

        let tree = Tree::<4>::from_leaves([Element::new(9), note.commitment()]).unwrap();
        let witness = tree.witness_for(1).unwrap();

        let output = Note::new(Element::new(50), Element::new(1), Element::new(5), Element::new(88));

        SpendWitness {
            root: tree.root(),
            nullifier: note.nullifier(&secret),
            token: note.token,
            denomination_bucket: Element::new(1),
            new_commitment: output.commitment(),
            amount: note.amount,
            salt: note.salt,
            owner_secret: secret,
            path_elements: witness.path_elements.to_vec(),
            path_directions: witness.path_directions.to_vec(),
            output_amount: output.amount,
            output_salt: output.salt,
            output_owner_public_key: output.owner_public_key,
        }
    }

    #[test]
    fn valid_spend_witness_satisfies_circuit() {
        assert_eq!(spend_witness().check(&SquaringKeyDerivation), Ok(()));
    }

    #[test]
    fn each_spend_relation_is_named() {
        let mut witness = spend_witness();
        witness.root = Element::new(1);
        assert_eq!(witness.check(&SquaringKeyDerivation), Err(Constraint::Membership));

        let mut witness = spend_witness();
        witness.nullifier = Element::new(1);
        assert_eq!(witness.check(&SquaringKeyDerivation), Err(Constraint::Nullifier));

        let mut witness = spend_witness();
        witness.output_amount = Element::new(49);
        assert_eq!(witness.check(&SquaringKeyDerivation), Err(Constraint::Conservation));

        let mut witness = spend_witness();
        witness.new_commitment = Element::new(1);
        assert_eq!(witness.check(&SquaringKeyDerivation), Err(Constraint::OutputCommitment));

        let mut witness = spend_witness();
        witness.path_directions.pop();
        assert_eq!(witness.check(&SquaringKeyDerivation), Err(Constraint::PathLength));
    }

    #[test]
    fn structure_check_uses_expected_depth() {
        let witness = Witness::from(spend_witness());

        assert!(witness.check_structure(4).is_ok());
        assert!(matches!(
            witness.check_structure(32),
            Err(Error::InputMalformed {
                field: "path_elements"
            })
        ));
    }

    #[test]
    fn witness_debug_hides_private_inputs() {
        let debug = format!("{:?}", Witness::from(spend_witness()));

        assert!(debug.contains("Spend"));
        assert!(!debug.contains("owner_secret"));
        assert!(!debug.contains("output_salt"));
    }

    #[test]
    fn circuit_ids_display_kind_and_version() {
        assert_eq!(CircuitId::DEPOSIT_V1.to_string(), "deposit-v1");
        assert_eq!(CircuitId::new(CircuitKind::Spend, 2).to_string(), "spend-v2");
    }
}
