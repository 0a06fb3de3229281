use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use smirk::{Element, MerkleWitness, Tree};

use crate::{
    note::check_canonical, Error, KeyDerivation, Note, OwnerSecret, Proof, ProofGateway,
    ProvingBackend, Result, SpendRecord, SpendWitness,
};

/// The values of a spend that the ledger sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpendPublicInputs {
    /// Root of the tree the input note was proven against
    pub root: Element,
    /// Nullifier of the input note
    pub nullifier: Element,
    /// Token of both notes
    pub token: Element,
    /// Public grouping of the spend
    pub denomination_bucket: Element,
    /// Commitment of the output note
    pub new_commitment: Element,
}

/// A 1-in-1-out transfer of a note in a tree of depth `D`, built but not checked
///
/// The output note always carries the full amount of the input note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spend<const D: usize> {
    input_note: Note,
    owner_secret: OwnerSecret,
    output_note: Note,
    merkle_witness: MerkleWitness<D>,
    public_inputs: SpendPublicInputs,
}

/// A spend that passed every local check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSpend<const D: usize> {
    inner: Spend<D>,
}

/// A spend with a proof, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvedSpend {
    output_note: Note,
    public_inputs: SpendPublicInputs,
    proof: Proof,
}

impl<const D: usize> Spend<D> {
    /// Build a spend of `input_note` to a new note of `output_amount` owned by
    /// `output_owner_public_key`
    ///
    /// The merkle witness is taken from `tree`. Pass a [`Snapshot`](smirk::Snapshot) of a shared
    /// tree so the witness and root are consistent.
    ///
    /// Errors with [`Error::MerkleWitnessInvalid`] if the input note's commitment is not in `tree`
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(skip_all, fields(token = ?input_note.token, ?denomination_bucket))]
    pub fn build(
        input_note: Note,
        owner_secret: OwnerSecret,
        output_amount: Element,
        output_owner_public_key: Element,
        denomination_bucket: Element,
        tree: &Tree<D>,
        rng: impl RngCore + CryptoRng,
    ) -> Result<Self> {
        let commitment = input_note.commitment();

        let Some(index) = tree.index_of(commitment) else {
            tracing::debug!("input commitment is not in the tree");
            return Err(Error::MerkleWitnessInvalid);
        };

        let merkle_witness = tree.witness_for(index)?;

        let output_note = Note::with_random_salt(
            output_amount,
            input_note.token,
            output_owner_public_key,
            rng,
        );

        let public_inputs = SpendPublicInputs {
            root: merkle_witness.root,
            nullifier: input_note.nullifier(&owner_secret),
            token: input_note.token,
            denomination_bucket,
            new_commitment: output_note.commitment(),
        };

        Ok(Self::new(
            input_note,
            owner_secret,
            output_note,
            merkle_witness,
            public_inputs,
        ))
    }

    /// A spend from parts supplied by the caller
    #[must_use]
    pub fn new(
        input_note: Note,
        owner_secret: OwnerSecret,
        output_note: Note,
        merkle_witness: MerkleWitness<D>,
        public_inputs: SpendPublicInputs,
    ) -> Self {
        Self {
            input_note,
            owner_secret,
            output_note,
            merkle_witness,
            public_inputs,
        }
    }

    /// The note being spent
    #[must_use]
    pub fn input_note(&self) -> &Note {
        &self.input_note
    }

    /// The note being created
    #[must_use]
    pub fn output_note(&self) -> &Note {
        &self.output_note
    }

    /// The merkle witness of the input note
    #[must_use]
    pub fn merkle_witness(&self) -> &MerkleWitness<D> {
        &self.merkle_witness
    }

    /// The public inputs of this spend
    #[must_use]
    pub fn public_inputs(&self) -> &SpendPublicInputs {
        &self.public_inputs
    }

    /// Check the spend before proving, deriving the owner key with `keys`
    ///
    /// Errors, in the order they are checked:
    ///  - [`Error::InputMalformed`] if any field is not canonical, or the notes and public inputs
    ///    disagree on the token
    ///  - [`Error::NullifierMismatch`]
    ///  - [`Error::OwnerKeyMismatch`] if `owner_secret` does not own the input note
    ///  - [`Error::CommitmentMismatch`] if the new commitment is not the output note's commitment
    ///  - [`Error::MerkleWitnessInvalid`] if the witness does not place the input note under the
    ///    claimed root
    ///  - [`Error::ConservationViolated`] if the output amount differs from the input amount
    #[tracing::instrument(skip_all, fields(nullifier = ?self.public_inputs.nullifier))]
    pub fn validate(self, keys: &impl KeyDerivation) -> Result<ValidatedSpend<D>> {
        self.check_fields()?;

        let public = &self.public_inputs;

        if self.input_note.nullifier(&self.owner_secret) != public.nullifier {
            return Err(Error::NullifierMismatch);
        }

        if keys.public_key(&self.owner_secret)? != self.input_note.owner_public_key {
            return Err(Error::OwnerKeyMismatch);
        }

        if self.output_note.commitment() != public.new_commitment {
            return Err(Error::CommitmentMismatch);
        }

        let commitment = self.input_note.commitment();
        let witness = &self.merkle_witness;
        if witness.leaf != commitment
            || witness.root != public.root
            || !witness.verify(commitment, public.root)
        {
            return Err(Error::MerkleWitnessInvalid);
        }

        if self.output_note.amount != self.input_note.amount {
            return Err(Error::ConservationViolated);
        }

        Ok(ValidatedSpend { inner: self })
    }

    fn check_fields(&self) -> Result<()> {
        self.input_note.validate_fields()?;
        self.output_note.validate_fields()?;

        let public = &self.public_inputs;
        check_canonical("root", public.root)?;
        check_canonical("nullifier", public.nullifier)?;
        check_canonical("token", public.token)?;
        check_canonical("denomination_bucket", public.denomination_bucket)?;
        check_canonical("new_commitment", public.new_commitment)?;

        for element in &self.merkle_witness.path_elements {
            check_canonical("path_elements", *element)?;
        }

        if self.input_note.token != public.token || self.output_note.token != public.token {
            return Err(Error::InputMalformed { field: "token" });
        }

        Ok(())
    }
}

impl<const D: usize> ValidatedSpend<D> {
    /// The witness for the spend circuit
    #[must_use]
    pub fn witness(&self) -> SpendWitness {
        let Spend {
            input_note,
            owner_secret,
            output_note,
            merkle_witness,
            public_inputs,
        } = &self.inner;

        SpendWitness {
            root: public_inputs.root,
            nullifier: public_inputs.nullifier,
            token: public_inputs.token,
            denomination_bucket: public_inputs.denomination_bucket,
            new_commitment: public_inputs.new_commitment,
            amount: input_note.amount,
            salt: input_note.salt,
            owner_secret: owner_secret.clone(),
            path_elements: merkle_witness.path_elements.to_vec(),
            path_directions: merkle_witness.path_directions.to_vec(),
            output_amount: output_note.amount,
            output_salt: output_note.salt,
            output_owner_public_key: output_note.owner_public_key,
        }
    }

    /// Prove the spend with `gateway`
    #[tracing::instrument(skip_all, fields(nullifier = ?self.inner.public_inputs.nullifier))]
    pub async fn prove<B: ProvingBackend>(self, gateway: &ProofGateway<B>) -> Result<ProvedSpend> {
        let proof = gateway.prove(self.witness().into()).await?;

        Ok(ProvedSpend {
            output_note: self.inner.output_note,
            public_inputs: self.inner.public_inputs,
            proof,
        })
    }
}

impl ProvedSpend {
    /// The record to submit to the ledger
    #[must_use]
    pub fn record(&self) -> SpendRecord {
        SpendRecord {
            root: self.public_inputs.root,
            nullifier: self.public_inputs.nullifier,
            token: self.public_inputs.token,
            denomination_bucket: self.public_inputs.denomination_bucket,
            new_commitment: self.public_inputs.new_commitment,
            proof: self.proof.clone(),
        }
    }

    /// The output note, to be handed to its owner
    #[must_use]
    pub fn output_note(&self) -> &Note {
        &self.output_note
    }

    /// The proof of this spend
    #[must_use]
    pub fn proof(&self) -> &Proof {
        &self.proof
    }
}
